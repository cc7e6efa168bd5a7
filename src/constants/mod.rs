//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;
/// Schwarzschild radius of the Sun in AU (2GM/c²)
pub const SUN_SCHWARZSCHILD_AU: f64 = 1.974_125_743_36e-8;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// B1950 epoch as Julian date
pub const B1950: f64 = 2_433_282.423_5;
/// Days in a Julian century
pub const JULIAN_CENTURY: f64 = 36_525.0;
/// Days in a Julian year
pub const JULIAN_YEAR: f64 = 365.25;
/// Days in a tropical (Besselian) year
pub const TROPICAL_YEAR: f64 = 365.242_198_781;
/// Modified Julian date offset
pub const MJD_OFFSET: f64 = 2_400_000.5;

// Angles
/// Arcseconds in a complete circle
pub const ASEC360: f64 = 1_296_000.0;
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Milliarcseconds to radians conversion factor
pub const MAS2RAD: f64 = ASEC2RAD / 1000.0;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Seconds of time to radians (86400 s of time = 2π)
pub const SEC2RAD: f64 = TAU / DAY_S;

// Earth constants (IAU 1976 ellipsoid, as used for diurnal parallax)
/// Earth's equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6_378.14;
/// Ratio of polar to equatorial radius (b/a)
pub const EARTH_AXIS_RATIO: f64 = 0.996_647_19;

// Aberration
/// Constant of aberration in arcseconds
pub const ABERRATION_KAPPA: f64 = 20.495_52;

// Galactic reference directions, FK5 J2000 (degrees)
/// Right ascension of the north galactic pole
pub const NGP_RA_J2000: f64 = 192.859_48;
/// Declination of the north galactic pole
pub const NGP_DEC_J2000: f64 = 27.128_25;
/// Right ascension of the galactic center
pub const GC_RA_J2000: f64 = 266.405_10;
/// Declination of the galactic center
pub const GC_DEC_J2000: f64 = -28.936_175;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i32 = 2_299_161;

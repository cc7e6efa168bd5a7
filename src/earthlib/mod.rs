//! Earth rotation and the observer on the Earth's surface
//!
//! - [`SiderealTime`]: mean and apparent local sidereal time
//! - [`observer::ObservingCondition`]: where and when an observation is made
//! - [`heliocentric::EarthHeliocentric`]: the Earth's place around the Sun
//! - [`parallax::DiurnalParallax`]: geocentric ↔ topocentric displacement
//! - [`refraction::AtmosphericRefraction`]: true ↔ apparent altitude

pub mod heliocentric;
pub mod observer;
pub mod parallax;
pub mod refraction;

pub use heliocentric::EarthHeliocentric;
pub use observer::ObservingCondition;
pub use parallax::{DiurnalParallax, ParallaxDirection, ParallaxFrame};
pub use refraction::AtmosphericRefraction;

use crate::constants::{ASEC2RAD, DAY_S, J2000, JULIAN_CENTURY, MAS2RAD};
use crate::errors::{check_finite, Result};
use crate::nutationlib::{Nutation, NutationModel};
use crate::precessionlib::{Precession, PrecessionModel};
use crate::time::Epoch;

/// Seconds of time per arcsecond of rotation
const SEC_PER_ASEC: f64 = DAY_S / 1_296_000.0;

/// Earth Rotation Angle as a fraction of a turn in [0, 1)
///
/// IAU 2000 Resolution B1.8.
pub fn earth_rotation_angle(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000;
    let th = 0.7790572732640 + 0.00273781191135448 * du;
    (th.rem_euclid(1.0) + du.rem_euclid(1.0)).rem_euclid(1.0)
}

/// Greenwich mean sidereal time in seconds of time, not reduced to one day
fn greenwich_mean(jd: f64, model: PrecessionModel) -> f64 {
    let t = (jd - J2000) / JULIAN_CENTURY;
    match model {
        PrecessionModel::Iau2006 => {
            // Capitaine et al. (2003) precession in right ascension, arcseconds
            let st = 0.014506
                + ((((-0.0000000368 * t - 0.000029956) * t - 0.00000044) * t + 1.3915817) * t
                    + 4612.156534)
                    * t;
            earth_rotation_angle(jd) * DAY_S + st * SEC_PER_ASEC
        }
        PrecessionModel::Iau2000 => {
            let st = 0.014506
                + (((0.00001882 * t - 0.00009344) * t + 1.39667721) * t + 4612.15739966) * t;
            earth_rotation_angle(jd) * DAY_S + st * SEC_PER_ASEC
        }
        PrecessionModel::Iau1976 => {
            // IAU 1982 expression, degrees
            let d = jd - J2000;
            let deg = 280.46061837 + 360.98564736629 * d + (0.000387933 - t / 38_710_000.0) * t * t;
            deg * 240.0
        }
    }
}

/// Local sidereal time at one epoch and geographic longitude
#[derive(Debug, Clone, PartialEq)]
pub struct SiderealTime {
    epoch: Epoch,
    longitude: f64,
    precession_model: PrecessionModel,
    nutation_model: NutationModel,
    gmst: f64,
    equation_of_equinoxes: f64,
}

impl SiderealTime {
    /// `longitude` is the east-positive geographic longitude in degrees
    pub fn new(
        epoch: Epoch,
        longitude: f64,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
    ) -> Result<Self> {
        check_finite("geo_longitude", longitude)?;
        let precession = Precession::new(epoch, precession_model);
        let nutation = Nutation::new(epoch, nutation_model);
        let true_obliquity = precession.epsilon() * ASEC2RAD + nutation.obliquity() * MAS2RAD;
        // Δψ·cos ε in seconds of time
        let equation_of_equinoxes =
            nutation.longitude() / 1000.0 * true_obliquity.cos() * SEC_PER_ASEC;
        let gmst = greenwich_mean(epoch.jd(), precession_model);
        log::trace!(
            "sidereal time at {}: gmst={:.6}s eqeq={:.6}s",
            epoch,
            gmst.rem_euclid(DAY_S),
            equation_of_equinoxes
        );
        Ok(Self {
            epoch,
            longitude,
            precession_model,
            nutation_model,
            gmst,
            equation_of_equinoxes,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession_model
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation_model
    }

    /// Greenwich mean sidereal time, seconds of time in [0, 86400)
    pub fn greenwich_mean(&self) -> f64 {
        self.gmst.rem_euclid(DAY_S)
    }

    /// Greenwich apparent sidereal time, seconds of time in [0, 86400)
    pub fn greenwich_true(&self) -> f64 {
        (self.gmst + self.equation_of_equinoxes).rem_euclid(DAY_S)
    }

    /// Equation of the equinoxes in seconds of time
    pub fn equation_of_equinoxes(&self) -> f64 {
        self.equation_of_equinoxes
    }

    /// Local mean sidereal time, seconds of time in [0, 86400)
    pub fn mean(&self) -> f64 {
        (self.gmst + self.longitude * 240.0).rem_euclid(DAY_S)
    }

    /// Local apparent sidereal time, seconds of time in [0, 86400)
    pub fn true_time(&self) -> f64 {
        (self.gmst + self.equation_of_equinoxes + self.longitude * 240.0).rem_euclid(DAY_S)
    }
}

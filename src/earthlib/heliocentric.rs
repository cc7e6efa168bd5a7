//! Heliocentric position and velocity of the Earth
//!
//! Low precision solar theory (Meeus, Astronomical Algorithms, chapter 25),
//! referred to the mean ecliptic and equinox of date. Good to about 0.01°.

use crate::constants::{ABERRATION_KAPPA, ASEC2RAD, DEG2RAD};
use crate::coordinates::SpatialPosition;
use crate::time::Epoch;
use nalgebra::Vector3;

/// The Earth's place around the Sun at one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EarthHeliocentric {
    epoch: Epoch,
    /// Geometric longitude of the Sun, degrees
    sun_longitude: f64,
    eccentricity: f64,
    /// Longitude of the Earth's perihelion, degrees
    perihelion: f64,
    /// Sun-Earth distance, AU
    radius: f64,
}

impl EarthHeliocentric {
    pub fn new(epoch: Epoch) -> Self {
        let t = epoch.julian_centuries();

        let mean_longitude = 280.46646 + (36000.76983 + 0.0003032 * t) * t;
        let mean_anomaly = 357.52911 + (35999.05029 - 0.0001537 * t) * t;
        let m = mean_anomaly * DEG2RAD;
        let center = (1.914602 - (0.004817 + 0.000014 * t) * t) * m.sin()
            + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
            + 0.000289 * (3.0 * m).sin();

        let eccentricity = 0.016708634 - (0.000042037 + 0.0000001267 * t) * t;
        let perihelion = 102.93735 + (1.71946 + 0.00046 * t) * t;
        let true_anomaly = (mean_anomaly + center) * DEG2RAD;
        let radius = 1.000001018 * (1.0 - eccentricity * eccentricity)
            / (1.0 + eccentricity * true_anomaly.cos());

        Self {
            epoch,
            sun_longitude: (mean_longitude + center).rem_euclid(360.0),
            eccentricity,
            perihelion,
            radius,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Geometric ecliptic longitude of the Sun seen from the Earth, degrees
    pub fn sun_longitude(&self) -> f64 {
        self.sun_longitude
    }

    /// Ecliptic longitude of the Earth seen from the Sun, degrees
    pub fn longitude(&self) -> f64 {
        (self.sun_longitude + 180.0).rem_euclid(360.0)
    }

    /// Sun-Earth distance in AU
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Heliocentric position of the Earth, ecliptic of date, AU
    pub fn position(&self) -> SpatialPosition {
        let v = self.vector();
        SpatialPosition::from_vector(&v)
    }

    /// Heliocentric position vector of the Earth, ecliptic of date, AU
    pub fn vector(&self) -> Vector3<f64> {
        let lon = self.longitude() * DEG2RAD;
        Vector3::new(self.radius * lon.cos(), self.radius * lon.sin(), 0.0)
    }

    /// Orbital velocity of the Earth over the speed of light, ecliptic of date
    ///
    /// Includes the eccentricity term, so the annual aberration built from it
    /// is the full (not only circular-orbit) effect.
    pub fn velocity(&self) -> Vector3<f64> {
        let kappa = ABERRATION_KAPPA * ASEC2RAD;
        let sun = self.sun_longitude * DEG2RAD;
        let pi = self.perihelion * DEG2RAD;
        let e = self.eccentricity;
        Vector3::new(
            kappa * (sun.sin() - e * pi.sin()),
            -kappa * (sun.cos() - e * pi.cos()),
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn meeus_25a() -> Epoch {
        // 1992 October 13.0 TD
        Epoch::from_jd(2448908.5).unwrap()
    }

    #[test]
    fn test_solar_coordinates() {
        let earth = EarthHeliocentric::new(meeus_25a());
        assert_relative_eq!(earth.sun_longitude(), 199.90988, epsilon = 1e-4);
        assert_relative_eq!(earth.radius(), 0.99766, epsilon = 1e-5);
        assert_relative_eq!(earth.eccentricity(), 0.016711668, epsilon = 1e-9);
        assert_relative_eq!(earth.longitude(), 19.90988, epsilon = 1e-4);
    }

    #[test]
    fn test_position_is_opposite_the_sun() {
        let earth = EarthHeliocentric::new(meeus_25a());
        let p = earth.position().normalized();
        assert_relative_eq!(p.longitude(), earth.longitude(), epsilon = 1e-9);
        assert_relative_eq!(p.latitude(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.r(), earth.radius(), epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_is_perpendicular_to_sun_direction() {
        let earth = EarthHeliocentric::new(Epoch::J2000);
        let v = earth.velocity();
        assert_relative_eq!(v.norm(), ABERRATION_KAPPA * ASEC2RAD, max_relative = 0.02);
        // Nearly circular orbit: velocity is close to perpendicular to the radius vector
        let cos = v.normalize().dot(&earth.vector().normalize());
        assert!(cos.abs() < 0.02);
    }
}

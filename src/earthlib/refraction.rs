//! Atmospheric refraction
//!
//! Bennett's formula gives the refraction for an apparent altitude; the
//! opposite direction is solved by fixed-point iteration so that applying and
//! removing refraction are exact inverses. Bodies at or below the horizon are
//! left untouched.

use crate::constants::DEG2RAD;
use crate::errors::{check_closed, check_finite, Result};

use super::observer::{DEFAULT_PRESSURE, DEFAULT_TEMPERATURE};

const MAX_ITERATIONS: usize = 100;
const TOLERANCE_DEG: f64 = 1e-12;

/// Refraction in degrees for an apparent altitude in degrees
///
/// Bennett (1982) with the zenith offset removed, scaled for pressure (mbar)
/// and temperature (°C).
pub fn bennett(apparent_altitude: f64, pressure: f64, temperature: f64) -> f64 {
    let h = apparent_altitude;
    let arcmin = 1.0 / ((h + 7.31 / (h + 4.4)) * DEG2RAD).tan() + 0.0013515;
    let scale = (pressure / DEFAULT_PRESSURE) * (283.0 / (273.0 + temperature));
    (arcmin * scale / 60.0).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefractionDirection {
    TrueToApparent,
    ApparentToTrue,
}

/// An altitude carried across the atmosphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericRefraction {
    altitude: f64,
    refraction: f64,
}

impl AtmosphericRefraction {
    /// Default weather: 1010 mbar, 10 °C
    pub fn new(altitude: f64, direction: RefractionDirection) -> Result<Self> {
        Self::with_weather(altitude, direction, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE)
    }

    pub fn with_weather(
        altitude: f64,
        direction: RefractionDirection,
        pressure: f64,
        temperature: f64,
    ) -> Result<Self> {
        check_closed("altitude", altitude, -90.0, 90.0, "[-90, 90]")?;
        check_finite("pressure", pressure)?;
        check_finite("temperature", temperature)?;

        if altitude <= 0.0 {
            return Ok(Self {
                altitude,
                refraction: 0.0,
            });
        }

        let refraction = match direction {
            RefractionDirection::ApparentToTrue => bennett(altitude, pressure, temperature),
            RefractionDirection::TrueToApparent => {
                let mut apparent = altitude;
                for _ in 0..MAX_ITERATIONS {
                    let next = altitude + bennett(apparent, pressure, temperature);
                    let done = (next - apparent).abs() < TOLERANCE_DEG;
                    apparent = next;
                    if done {
                        break;
                    }
                }
                apparent - altitude
            }
        };
        let altitude = match direction {
            RefractionDirection::ApparentToTrue => altitude - refraction,
            RefractionDirection::TrueToApparent => altitude + refraction,
        };
        Ok(Self {
            altitude,
            refraction,
        })
    }

    /// The complementary altitude in degrees
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Size of the correction in degrees
    pub fn refraction(&self) -> f64 {
        self.refraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_bennett_at_horizon() {
        // About 29′ at the apparent horizon, nothing at the zenith
        let r = bennett(0.5, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE) * 60.0;
        assert_relative_eq!(r, 28.754, epsilon = 0.05);
        assert_relative_eq!(bennett(90.0, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_weather_scaling() {
        let standard = bennett(10.0, 1010.0, 10.0);
        let thin = bennett(10.0, 505.0, 10.0);
        assert_relative_eq!(thin, standard / 2.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.5)]
    #[case(5.0)]
    #[case(15.1249)]
    #[case(45.0)]
    #[case(89.9)]
    fn test_exact_inverse(#[case] true_altitude: f64) {
        let apparent = AtmosphericRefraction::new(true_altitude, RefractionDirection::TrueToApparent).unwrap();
        assert!(apparent.altitude() >= true_altitude);
        let back = AtmosphericRefraction::new(apparent.altitude(), RefractionDirection::ApparentToTrue).unwrap();
        assert_relative_eq!(back.altitude(), true_altitude, epsilon = 1e-11);
    }

    #[test]
    fn test_below_horizon_is_noop() {
        for direction in [RefractionDirection::TrueToApparent, RefractionDirection::ApparentToTrue] {
            let r = AtmosphericRefraction::new(-3.0, direction).unwrap();
            assert_eq!(r.altitude(), -3.0);
            assert_eq!(r.refraction(), 0.0);
            assert_eq!(AtmosphericRefraction::new(0.0, direction).unwrap().altitude(), 0.0);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(AtmosphericRefraction::new(90.5, RefractionDirection::TrueToApparent).is_err());
    }
}

//! Observing conditions: time, site and weather

use crate::errors::{check_closed, Result};
use crate::nutationlib::NutationModel;
use crate::precessionlib::PrecessionModel;
use crate::time::Epoch;
use serde::{Deserialize, Serialize};

use super::SiderealTime;

/// Standard pressure used for refraction, millibars
pub const DEFAULT_PRESSURE: f64 = 1010.0;
/// Standard temperature used for refraction, degrees Celsius
pub const DEFAULT_TEMPERATURE: f64 = 10.0;

/// When and where an observation is made
///
/// Longitude is east-positive in [-180, 180] degrees, latitude is geodetic in
/// [-90, 90] degrees and elevation is metres above the ellipsoid in
/// [-12000, 3e7].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservingCondition {
    time: Epoch,
    geo_longitude: f64,
    geo_latitude: f64,
    elevation: f64,
    pressure: f64,
    temperature: f64,
}

impl ObservingCondition {
    pub fn new(time: Epoch, geo_longitude: f64, geo_latitude: f64, elevation: f64) -> Result<Self> {
        check_closed("geo_longitude", geo_longitude, -180.0, 180.0, "[-180, 180]")?;
        check_closed("geo_latitude", geo_latitude, -90.0, 90.0, "[-90, 90]")?;
        check_closed("elevation", elevation, -12_000.0, 3e7, "[-12000, 3e7]")?;
        Ok(Self {
            time,
            geo_longitude,
            geo_latitude,
            elevation,
            pressure: DEFAULT_PRESSURE,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Replace the observing time
    pub fn with_time(mut self, time: Epoch) -> Self {
        self.time = time;
        self
    }

    /// Replace the site, validating like [`ObservingCondition::new`]
    pub fn with_site(self, geo_longitude: f64, geo_latitude: f64, elevation: f64) -> Result<Self> {
        let mut next = Self::new(self.time, geo_longitude, geo_latitude, elevation)?;
        next.pressure = self.pressure;
        next.temperature = self.temperature;
        Ok(next)
    }

    /// Air pressure (millibars) and temperature (°C) used for refraction
    pub fn with_weather(mut self, pressure: f64, temperature: f64) -> Result<Self> {
        self.pressure = check_closed("pressure", pressure, 0.0, 2000.0, "[0, 2000]")?;
        self.temperature = check_closed("temperature", temperature, -100.0, 100.0, "[-100, 100]")?;
        Ok(self)
    }

    pub fn time(&self) -> Epoch {
        self.time
    }

    pub fn geo_longitude(&self) -> f64 {
        self.geo_longitude
    }

    pub fn geo_latitude(&self) -> f64 {
        self.geo_latitude
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Local sidereal time at this site and time
    pub fn sidereal_time(
        &self,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
    ) -> Result<SiderealTime> {
        SiderealTime::new(self.time, self.geo_longitude, precession_model, nutation_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FrameError;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let oc = ObservingCondition::new(Epoch::J2000, -77.0, 38.9, 0.0).unwrap();
        assert_eq!(oc.pressure(), DEFAULT_PRESSURE);
        assert_eq!(oc.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(oc.time(), Epoch::J2000);
    }

    #[rstest]
    #[case(180.5, 0.0, 0.0, "geo_longitude")]
    #[case(0.0, -90.1, 0.0, "geo_latitude")]
    #[case(0.0, 0.0, -12_001.0, "elevation")]
    #[case(0.0, 0.0, 3.1e7, "elevation")]
    fn test_range_validation(
        #[case] lon: f64,
        #[case] lat: f64,
        #[case] elevation: f64,
        #[case] field: &str,
    ) {
        match ObservingCondition::new(Epoch::J2000, lon, lat, elevation) {
            Err(FrameError::RangeValidation { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected range error on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(ObservingCondition::new(Epoch::J2000, -180.0, 90.0, 3e7).is_ok());
        assert!(ObservingCondition::new(Epoch::J2000, 180.0, -90.0, -12_000.0).is_ok());
    }

    #[test]
    fn test_builders() {
        let oc = ObservingCondition::new(Epoch::J2000, 10.0, 20.0, 100.0)
            .unwrap()
            .with_weather(900.0, -5.0)
            .unwrap();
        let moved = oc.with_site(11.0, 20.0, 100.0).unwrap();
        assert_eq!(moved.geo_longitude(), 11.0);
        assert_eq!(moved.pressure(), 900.0);
        let later = oc.with_time(Epoch::B1950);
        assert_eq!(later.geo_longitude(), oc.geo_longitude());
        assert_eq!(later.time(), Epoch::B1950);
        assert!(oc.with_weather(-1.0, 0.0).is_err());
    }
}

//! Horizontal frame: azimuth and altitude of one observer
//!
//! Azimuth is measured from the south, increasing westward; the polar angle is
//! the zenith distance. On top of the geocentric place two corrections can be
//! layered, innermost first: diurnal parallax (topocentric centre) and
//! atmospheric refraction.

use super::common::{checked_position, BoundsPolicy, CommonFrame};
use super::equinoctial::{Corrections, EquinoctialFrame};
use super::hour_angle::{hour_angle_to_equinoctial, reobserve_equinoctial, HourAngleFrame};
use super::{CelestialFrame, FrameCode, ObservingRetarget};
use crate::constants::DEG2RAD;
use crate::coordinates::SpatialPosition;
use crate::earthlib::refraction::RefractionDirection;
use crate::earthlib::{AtmosphericRefraction, DiurnalParallax, ObservingCondition, ParallaxDirection, ParallaxFrame};
use crate::errors::{FrameError, Result};
use crate::nutationlib::NutationModel;
use crate::precessionlib::PrecessionModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hour angle → horizontal for a geodetic latitude in degrees
pub(crate) fn hour_angle_to_horizontal(p: &mut SpatialPosition, geo_latitude: f64) {
    p.rotate_y((90.0 - geo_latitude) * DEG2RAD);
}

/// Inverse of [`hour_angle_to_horizontal`]
pub(crate) fn horizontal_to_hour_angle(p: &mut SpatialPosition, geo_latitude: f64) {
    p.rotate_y(-(90.0 - geo_latitude) * DEG2RAD);
}

/// Origin of a horizontal position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalCenter {
    #[default]
    Geocentric,
    Topocentric,
}

impl HorizontalCenter {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalCenter::Geocentric => "geocentric",
            HorizontalCenter::Topocentric => "topocentric",
        }
    }
}

impl fmt::Display for HorizontalCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HorizontalCenter {
    type Err = FrameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geocentric" => Ok(HorizontalCenter::Geocentric),
            "topocentric" => Ok(HorizontalCenter::Topocentric),
            _ => Err(FrameError::UnknownEnum {
                kind: "horizontal center",
                value: s.to_string(),
            }),
        }
    }
}

/// Construction options for [`HorizontalFrame`]
///
/// `center` and `with_ar` declare what the supplied position already contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorizontalOptions {
    pub position: Option<SpatialPosition>,
    pub azimuth: Option<f64>,
    pub altitude: Option<f64>,
    pub radius: Option<f64>,
    pub observing: Option<ObservingCondition>,
    pub center: HorizontalCenter,
    pub with_ar: bool,
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub continuous: bool,
}

impl HorizontalOptions {
    pub fn with_position(mut self, position: SpatialPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_azimuth_altitude(mut self, azimuth: f64, altitude: f64) -> Self {
        self.azimuth = Some(azimuth);
        self.altitude = Some(altitude);
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_observing(mut self, observing: ObservingCondition) -> Self {
        self.observing = Some(observing);
        self
    }

    pub fn with_center(mut self, center: HorizontalCenter) -> Self {
        self.center = center;
        self
    }

    pub fn with_ar(mut self, with_ar: bool) -> Self {
        self.with_ar = with_ar;
        self
    }

    pub fn with_precession_model(mut self, model: PrecessionModel) -> Self {
        self.precession_model = model;
        self
    }

    pub fn with_nutation_model(mut self, model: NutationModel) -> Self {
        self.nutation_model = model;
        self
    }

    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalFrame {
    common: CommonFrame,
    observing: ObservingCondition,
    precession_model: PrecessionModel,
    nutation_model: NutationModel,
    sidereal_time: f64,
    center: HorizontalCenter,
    with_ar: bool,
}

impl HorizontalFrame {
    pub fn new(options: HorizontalOptions) -> Result<Self> {
        let observing = options
            .observing
            .ok_or(FrameError::MissingRequiredField("observing condition"))?;
        let position = match (options.position, options.azimuth, options.altitude) {
            (Some(position), _, _) => position,
            (None, Some(azimuth), Some(altitude)) => checked_position(
                BoundsPolicy::Strict,
                ["azimuth", "altitude"],
                azimuth,
                altitude,
                options.radius.unwrap_or(1.0),
            )?,
            _ => return Err(FrameError::MissingRequiredField("position or azimuth/altitude")),
        };
        let sidereal_time = observing
            .sidereal_time(options.precession_model, options.nutation_model)?
            .true_time();

        let mut common = CommonFrame::new(position, BoundsPolicy::Strict);
        common.set_continuous(options.continuous);
        Ok(Self::from_parts(
            common,
            observing,
            options.precession_model,
            options.nutation_model,
            sidereal_time,
            options.center,
            options.with_ar,
        ))
    }

    pub(crate) fn from_parts(
        common: CommonFrame,
        observing: ObservingCondition,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
        sidereal_time: f64,
        center: HorizontalCenter,
        with_ar: bool,
    ) -> Self {
        Self {
            common,
            observing,
            precession_model,
            nutation_model,
            sidereal_time,
            center,
            with_ar,
        }
    }

    /// Azimuth in degrees from the south, westward
    pub fn azimuth(&self) -> f64 {
        self.common.longitude()
    }

    /// Altitude above the horizon in degrees
    pub fn altitude(&self) -> f64 {
        self.common.latitude()
    }

    /// Zenith distance in degrees
    pub fn zenith_distance(&self) -> f64 {
        90.0 - self.altitude()
    }

    pub fn radius(&self) -> f64 {
        self.common.radius()
    }

    pub fn observing(&self) -> ObservingCondition {
        self.observing
    }

    /// Local apparent sidereal time in seconds of time
    pub fn sidereal_time(&self) -> f64 {
        self.sidereal_time
    }

    pub fn center(&self) -> HorizontalCenter {
        self.center
    }

    /// True when atmospheric refraction is applied
    pub fn with_ar(&self) -> bool {
        self.with_ar
    }

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession_model
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation_model
    }

    pub fn common_mut(&mut self) -> &mut CommonFrame {
        &mut self.common
    }

    /// Move the origin to the observer
    pub fn to_topocentric(&mut self) -> Result<()> {
        self.set_center(HorizontalCenter::Topocentric)
    }

    /// Move the origin to the centre of the Earth
    pub fn to_geocentric(&mut self) -> Result<()> {
        self.set_center(HorizontalCenter::Geocentric)
    }

    /// Lift the true altitude to the apparent one; no-op below the horizon
    pub fn apply_refraction(&mut self) -> Result<()> {
        if self.with_ar {
            return Ok(());
        }
        let mut p = self.common.raw_position();
        refract(&mut p, &self.observing, RefractionDirection::TrueToApparent)?;
        self.common.track(p);
        self.with_ar = true;
        log::debug!("horizontal frame: refraction applied");
        Ok(())
    }

    /// Lower the apparent altitude to the true one; no-op below the horizon
    pub fn remove_refraction(&mut self) -> Result<()> {
        if !self.with_ar {
            return Ok(());
        }
        let mut p = self.common.raw_position();
        refract(&mut p, &self.observing, RefractionDirection::ApparentToTrue)?;
        self.common.track(p);
        self.with_ar = false;
        log::debug!("horizontal frame: refraction removed");
        Ok(())
    }

    /// Move to a new observing time and/or site, keeping centre and refraction
    pub fn retarget(&mut self, options: &ObservingRetarget) -> Result<()> {
        let next = options.applied_to(&self.observing)?;
        self.reobserve(next)
    }

    /// A retargeted copy; `self` is left as it is
    pub fn snapshot(&self, options: &ObservingRetarget) -> Result<Self> {
        let mut copy = self.clone();
        copy.retarget(options)?;
        Ok(copy)
    }

    fn set_center(&mut self, center: HorizontalCenter) -> Result<()> {
        if self.center == center {
            return Ok(());
        }
        let direction = match center {
            HorizontalCenter::Topocentric => ParallaxDirection::GeocentricToTopocentric,
            HorizontalCenter::Geocentric => ParallaxDirection::TopocentricToGeocentric,
        };
        let mut p = self.common.raw_position();
        if self.with_ar {
            refract(&mut p, &self.observing, RefractionDirection::ApparentToTrue)?;
        }
        parallax(&mut p, &self.observing, self.sidereal_time, direction)?;
        if self.with_ar {
            refract(&mut p, &self.observing, RefractionDirection::TrueToApparent)?;
        }
        self.common.track(p);
        self.center = center;
        log::debug!("horizontal frame: center -> {}", center);
        Ok(())
    }

    /// Copy of the position with refraction and parallax taken out
    fn geocentric_position(&self) -> Result<SpatialPosition> {
        let mut p = self.common.raw_position();
        if self.with_ar {
            refract(&mut p, &self.observing, RefractionDirection::ApparentToTrue)?;
        }
        if self.center == HorizontalCenter::Topocentric {
            parallax(&mut p, &self.observing, self.sidereal_time, ParallaxDirection::TopocentricToGeocentric)?;
        }
        Ok(p)
    }

    pub(crate) fn reobserve(&mut self, next: ObservingCondition) -> Result<()> {
        if next == self.observing {
            return Ok(());
        }
        let sidereal_time = next
            .sidereal_time(self.precession_model, self.nutation_model)?
            .true_time();

        let mut p = self.geocentric_position()?;
        horizontal_to_hour_angle(&mut p, self.observing.geo_latitude());
        reobserve_equinoctial(
            &mut p,
            (&self.observing, self.sidereal_time),
            (&next, sidereal_time),
            self.precession_model,
            self.nutation_model,
        );
        hour_angle_to_horizontal(&mut p, next.geo_latitude());
        if self.center == HorizontalCenter::Topocentric {
            parallax(&mut p, &next, sidereal_time, ParallaxDirection::GeocentricToTopocentric)?;
        }
        if self.with_ar {
            refract(&mut p, &next, RefractionDirection::TrueToApparent)?;
        }
        log::debug!("horizontal frame: observing time {} -> {}", self.observing.time(), next.time());

        self.common.track(p);
        self.observing = next;
        self.sidereal_time = sidereal_time;
        Ok(())
    }

    fn observed_by(&self, observing: Option<&ObservingCondition>) -> Result<Self> {
        let mut copy = self.clone();
        if let Some(observing) = observing {
            copy.reobserve(*observing)?;
        }
        Ok(copy)
    }
}

fn parallax(
    p: &mut SpatialPosition,
    observing: &ObservingCondition,
    sidereal_time: f64,
    direction: ParallaxDirection,
) -> Result<()> {
    let moved = DiurnalParallax::new(
        p,
        sidereal_time,
        observing.geo_latitude(),
        observing.elevation(),
        ParallaxFrame::Horizontal,
        direction,
    )?;
    *p = moved.position();
    Ok(())
}

fn refract(p: &mut SpatialPosition, observing: &ObservingCondition, direction: RefractionDirection) -> Result<()> {
    let canonical = p.normalized();
    let refraction = AtmosphericRefraction::with_weather(
        canonical.latitude().clamp(-90.0, 90.0),
        direction,
        observing.pressure(),
        observing.temperature(),
    )?;
    if refraction.refraction() == 0.0 {
        return Ok(());
    }
    let moved = SpatialPosition::from_lon_lat(canonical.longitude(), refraction.altitude(), canonical.r())?;
    p.follow(moved);
    Ok(())
}

impl CelestialFrame for HorizontalFrame {
    fn code(&self) -> FrameCode {
        FrameCode::Horizontal
    }

    fn common(&self) -> &CommonFrame {
        &self.common
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        let mut p = self.geocentric_position()?;
        horizontal_to_hour_angle(&mut p, self.observing.geo_latitude());
        hour_angle_to_equinoctial(&mut p, self.sidereal_time);
        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        Ok(EquinoctialFrame::from_parts(
            common,
            self.observing.time(),
            self.precession_model,
            self.nutation_model,
            Corrections::all(),
        ))
    }

    fn to_hour_angle(&self, observing: Option<&ObservingCondition>) -> Result<HourAngleFrame> {
        let mut p = self.geocentric_position()?;
        horizontal_to_hour_angle(&mut p, self.observing.geo_latitude());
        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        let frame = HourAngleFrame::from_parts(
            common,
            self.observing,
            self.precession_model,
            self.nutation_model,
            self.sidereal_time,
        );
        frame.to_hour_angle(observing)
    }

    fn to_horizontal(&self, observing: Option<&ObservingCondition>) -> Result<HorizontalFrame> {
        self.observed_by(observing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AU_KM, EARTH_RADIUS_KM};
    use crate::time::Epoch;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn observer() -> ObservingCondition {
        let time = Epoch::from_calendar(2024, 3, 20, 3, 0, 0.0).unwrap();
        ObservingCondition::new(time, 10.0, 45.0, 400.0).unwrap()
    }

    fn frame(azimuth: f64, altitude: f64, radius: f64) -> HorizontalFrame {
        HorizontalFrame::new(
            HorizontalOptions::default()
                .with_azimuth_altitude(azimuth, altitude)
                .with_radius(radius)
                .with_observing(observer()),
        )
        .unwrap()
    }

    #[test]
    fn test_center_parse() {
        assert_eq!("Topocentric".parse::<HorizontalCenter>().unwrap(), HorizontalCenter::Topocentric);
        assert!(matches!(
            "barycentric".parse::<HorizontalCenter>(),
            Err(FrameError::UnknownEnum { kind: "horizontal center", .. })
        ));
    }

    #[rstest]
    #[case(360.0, 10.0, "azimuth")]
    #[case(10.0, -90.5, "altitude")]
    fn test_range_validation(#[case] azimuth: f64, #[case] altitude: f64, #[case] field: &str) {
        let options = HorizontalOptions::default()
            .with_azimuth_altitude(azimuth, altitude)
            .with_observing(observer());
        match HorizontalFrame::new(options) {
            Err(FrameError::RangeValidation { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected range error on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_moon_parallax() {
        // At 60 Earth radii the Moon sinks by about 57′ near the horizon
        let mut moon = frame(100.0, 1.0, 60.0 * EARTH_RADIUS_KM / AU_KM);
        moon.to_topocentric().unwrap();
        assert_eq!(moon.center(), HorizontalCenter::Topocentric);
        let dip = (1.0 - moon.altitude()) * 60.0;
        assert!(dip > 55.0 && dip < 58.0, "dip {dip}′");
        // Only the small geocentric-latitude tilt of the observer moves the azimuth
        assert_relative_eq!(moon.azimuth(), 100.0, epsilon = 0.01);
    }

    #[test]
    fn test_refraction_lifts_altitude() {
        let mut star = frame(200.0, 10.0, 1.0);
        star.apply_refraction().unwrap();
        assert!(star.with_ar());
        assert_relative_eq!((star.altitude() - 10.0) * 60.0, 5.3, epsilon = 0.1);
        assert_relative_eq!(star.azimuth(), 200.0, epsilon = 1e-9);
        star.remove_refraction().unwrap();
        assert_relative_eq!(star.altitude(), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_refraction_below_horizon() {
        let mut star = frame(200.0, -5.0, 1.0);
        star.apply_refraction().unwrap();
        assert!(star.with_ar());
        assert_relative_eq!(star.altitude(), -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_center_switch_under_refraction() {
        let original = {
            let mut f = frame(30.0, 20.0, 0.0026);
            f.apply_refraction().unwrap();
            f
        };
        let mut moved = original.clone();
        moved.to_topocentric().unwrap();
        assert!(moved.with_ar());
        assert!(moved.altitude() < original.altitude());
        moved.to_geocentric().unwrap();
        assert!(moved.common().raw_position().angle_between(&original.common().raw_position()) < 1e-12);
        assert_relative_eq!(moved.radius(), original.radius(), max_relative = 1e-12);
    }

    #[test]
    fn test_retarget_site_round_trip() {
        let original = frame(120.0, 35.0, 1.0);
        let elsewhere = original
            .snapshot(&ObservingRetarget::default().with_geo_longitude(-100.0).with_geo_latitude(-30.0))
            .unwrap();
        assert!((elsewhere.altitude() - original.altitude()).abs() > 1.0);
        let back = elsewhere
            .snapshot(&ObservingRetarget::default().with_geo_longitude(10.0).with_geo_latitude(45.0))
            .unwrap();
        assert_relative_eq!(back.azimuth(), 120.0, epsilon = 1e-9);
        assert_relative_eq!(back.altitude(), 35.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sidereal_rotation() {
        // One sidereal day later a fixed star is back where it was, to within precession and aberration
        let star = frame(120.0, 35.0, 1.0);
        let later = star
            .snapshot(&ObservingRetarget::default().with_time(observer().time().add_days(0.99726957).unwrap()))
            .unwrap();
        assert!(later.common().raw_position().angle_between(&star.common().raw_position()) < 1e-4);
    }
}

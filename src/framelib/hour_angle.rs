//! Hour-angle frame: hour angle and declination of one observer
//!
//! Hour angle is measured westward from the local meridian. The frame does
//! not depend on the observer's latitude.

use super::common::{checked_position, BoundsPolicy, CommonFrame};
use super::equinoctial::{Corrections, EquinoctialFrame};
use super::horizontal::{self, HorizontalCenter, HorizontalFrame};
use super::{CelestialFrame, FrameCode, ObservingRetarget};
use crate::constants::SEC2RAD;
use crate::coordinates::SpatialPosition;
use crate::earthlib::ObservingCondition;
use crate::errors::{FrameError, Result};
use crate::nutationlib::NutationModel;
use crate::precessionlib::PrecessionModel;

/// Equinoctial → hour angle for local apparent sidereal time in seconds
pub(crate) fn equinoctial_to_hour_angle(p: &mut SpatialPosition, sidereal_time: f64) {
    p.rotate_z(sidereal_time * SEC2RAD);
    p.invert_azimuth();
}

/// Inverse of [`equinoctial_to_hour_angle`]
pub(crate) fn hour_angle_to_equinoctial(p: &mut SpatialPosition, sidereal_time: f64) {
    p.invert_azimuth();
    p.rotate_z(-sidereal_time * SEC2RAD);
}

/// Carry an observer-frame position from one observing condition to another
///
/// The position is turned back into an apparent equinoctial place with the old
/// sidereal time and, when the time changes, precessed to the new time before
/// being rotated with the new sidereal time.
pub(crate) fn reobserve_equinoctial(
    p: &mut SpatialPosition,
    from: (&ObservingCondition, f64),
    to: (&ObservingCondition, f64),
    precession_model: PrecessionModel,
    nutation_model: NutationModel,
) {
    hour_angle_to_equinoctial(p, from.1);
    if from.0.time() != to.0.time() {
        let mut apparent = EquinoctialFrame::from_parts(
            CommonFrame::new(*p, BoundsPolicy::Strict),
            from.0.time(),
            precession_model,
            nutation_model,
            Corrections::all(),
        );
        apparent.retarget_epoch(to.0.time());
        *p = apparent.common().raw_position();
    }
    equinoctial_to_hour_angle(p, to.1);
}

/// Construction options for [`HourAngleFrame`]
///
/// `observing` is required, as is either `position` or both `hour_angle` and
/// `dec` (degrees).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourAngleOptions {
    pub position: Option<SpatialPosition>,
    pub hour_angle: Option<f64>,
    pub dec: Option<f64>,
    pub radius: Option<f64>,
    pub observing: Option<ObservingCondition>,
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub continuous: bool,
}

impl HourAngleOptions {
    pub fn with_position(mut self, position: SpatialPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_hour_angle_dec(mut self, hour_angle: f64, dec: f64) -> Self {
        self.hour_angle = Some(hour_angle);
        self.dec = Some(dec);
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
pub struct HourAngleFrame {
    common: CommonFrame,
    observing: ObservingCondition,
    precession_model: PrecessionModel,
    nutation_model: NutationModel,
    /// Local apparent sidereal time of `observing`, seconds
    sidereal_time: f64,
}

impl HourAngleFrame {
    pub fn new(options: HourAngleOptions) -> Result<Self> {
        let observing = options
            .observing
            .ok_or(FrameError::MissingRequiredField("observing condition"))?;
        let position = match (options.position, options.hour_angle, options.dec) {
            (Some(position), _, _) => position,
            (None, Some(hour_angle), Some(dec)) => checked_position(
                BoundsPolicy::Strict,
                ["hour_angle", "dec"],
                hour_angle,
                dec,
                options.radius.unwrap_or(1.0),
            )?,
            _ => return Err(FrameError::MissingRequiredField("position or hour_angle/dec")),
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
        ))
    }

    pub(crate) fn from_parts(
        common: CommonFrame,
        observing: ObservingCondition,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
        sidereal_time: f64,
    ) -> Self {
        Self {
            common,
            observing,
            precession_model,
            nutation_model,
            sidereal_time,
        }
    }

    /// Hour angle in degrees, westward from the meridian
    pub fn hour_angle(&self) -> f64 {
        self.common.longitude()
    }

    /// Declination in degrees
    pub fn dec(&self) -> f64 {
        self.common.latitude()
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

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession_model
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation_model
    }

    pub fn common_mut(&mut self) -> &mut CommonFrame {
        &mut self.common
    }

    /// Move to a new observing time and/or site
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

    pub(crate) fn reobserve(&mut self, next: ObservingCondition) -> Result<()> {
        if next == self.observing {
            return Ok(());
        }
        let sidereal_time = next
            .sidereal_time(self.precession_model, self.nutation_model)?
            .true_time();
        let mut p = self.common.raw_position();
        reobserve_equinoctial(
            &mut p,
            (&self.observing, self.sidereal_time),
            (&next, sidereal_time),
            self.precession_model,
            self.nutation_model,
        );
        log::debug!("hour-angle frame: observing time {} -> {}", self.observing.time(), next.time());

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

impl CelestialFrame for HourAngleFrame {
    fn code(&self) -> FrameCode {
        FrameCode::HourAngle
    }

    fn common(&self) -> &CommonFrame {
        &self.common
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        let mut p = self.common.raw_position();
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
        self.observed_by(observing)
    }

    fn to_horizontal(&self, observing: Option<&ObservingCondition>) -> Result<HorizontalFrame> {
        let frame = self.observed_by(observing)?;
        let mut p = frame.common.raw_position();
        horizontal::hour_angle_to_horizontal(&mut p, frame.observing.geo_latitude());
        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(frame.common.is_continuous());
        Ok(HorizontalFrame::from_parts(
            common,
            frame.observing,
            frame.precession_model,
            frame.nutation_model,
            frame.sidereal_time,
            HorizontalCenter::Geocentric,
            false,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framelib::EquinoctialOptions;
    use crate::time::Epoch;
    use approx::assert_relative_eq;

    fn washington() -> ObservingCondition {
        // Meeus example 13.b
        let time = Epoch::from_calendar(1987, 4, 10, 19, 21, 0.0).unwrap();
        ObservingCondition::new(time, -77.065556, 38.921389, 0.0).unwrap()
    }

    #[test]
    fn test_requires_observer() {
        let err = HourAngleFrame::new(HourAngleOptions::default().with_hour_angle_dec(10.0, 5.0)).unwrap_err();
        assert_eq!(err, FrameError::MissingRequiredField("observing condition"));
        let err = HourAngleFrame::new(HourAngleOptions::default().with_observing(washington())).unwrap_err();
        assert_eq!(err, FrameError::MissingRequiredField("position or hour_angle/dec"));
    }

    #[test]
    fn test_hour_angle_of_venus() {
        // Meeus 13.b gives H = 64.352133° for α = 347.3193375° (apparent); his
        // apparent sidereal time is about 0.4″ away from ours
        let venus = EquinoctialFrame::new(
            EquinoctialOptions::default()
                .with_ra_dec(347.3193375, -6.719891667)
                .with_epoch(washington().time())
                .with_corrections(Corrections::all()),
        )
        .unwrap();
        let frame = venus.to_hour_angle(Some(&washington())).unwrap();
        assert_relative_eq!(frame.hour_angle(), 64.3520, epsilon = 1e-4);
        assert_relative_eq!(frame.dec(), -6.719891667, epsilon = 1e-10);
    }

    #[test]
    fn test_site_change_keeps_declination() {
        let mut frame = HourAngleFrame::new(
            HourAngleOptions::default()
                .with_hour_angle_dec(30.0, 12.0)
                .with_observing(washington()),
        )
        .unwrap();
        // Moving 15° east adds one hour of hour angle; latitude is irrelevant
        frame
            .retarget(&ObservingRetarget::default().with_geo_longitude(-62.065556).with_geo_latitude(-20.0))
            .unwrap();
        assert_relative_eq!(frame.hour_angle(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(frame.dec(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_time_round_trip() {
        let original = HourAngleFrame::new(
            HourAngleOptions::default()
                .with_hour_angle_dec(300.0, -40.0)
                .with_observing(washington()),
        )
        .unwrap();
        let later = washington().time().add_days(40.25).unwrap();
        let moved = original
            .snapshot(&ObservingRetarget::default().with_time(later))
            .unwrap();
        assert!((moved.hour_angle() - original.hour_angle()).abs() > 1.0);
        let back = moved
            .snapshot(&ObservingRetarget::default().with_time(washington().time()))
            .unwrap();
        assert_relative_eq!(back.hour_angle(), original.hour_angle(), epsilon = 1e-9);
        assert_relative_eq!(back.dec(), original.dec(), epsilon = 1e-9);
        assert_eq!(back.observing(), washington());
    }
}

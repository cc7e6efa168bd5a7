//! Equinoctial (right ascension / declination) frame
//!
//! Every other frame converts through this one. The stored position is the
//! mean place of the frame's epoch with up to four corrections layered on top,
//! innermost first:
//!
//! 1. FK5 frame bias
//! 2. gravitational deflection by the Sun
//! 3. annual aberration
//! 4. nutation
//!
//! Toggling a layer peels the applied layers above it, toggles, and puts them
//! back, so every apply/remove pair is an exact involution.

use super::common::{checked_position, BoundsPolicy, CommonFrame};
use super::ecliptic::{EclipticCenter, EclipticFrame};
use super::galactic::GalacticFrame;
use super::horizontal::HorizontalFrame;
use super::hour_angle::{self, HourAngleFrame};
use super::{CelestialFrame, FrameCode};
use crate::constants::{ASEC2RAD, MAS2RAD};
use crate::coordinates::SpatialPosition;
use crate::earthlib::{EarthHeliocentric, ObservingCondition};
use crate::errors::{FrameError, Result};
use crate::nutationlib::{Nutation, NutationModel};
use crate::precessionlib::{frame_bias_matrix, Precession, PrecessionModel};
use crate::relativity::{add_aberration, add_deflection, earth_state, remove_aberration, remove_deflection};
use crate::time::Epoch;
use serde::{Deserialize, Serialize};

/// Which corrections are baked into an equinoctial position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Corrections {
    pub nutation: bool,
    pub fk5: bool,
    pub annual_aberration: bool,
    pub gravitational_deflection: bool,
}

impl Corrections {
    /// The apparent place: every correction applied
    pub fn all() -> Self {
        Self {
            nutation: true,
            fk5: true,
            annual_aberration: true,
            gravitational_deflection: true,
        }
    }

    fn get(&self, layer: Layer) -> bool {
        match layer {
            Layer::Fk5 => self.fk5,
            Layer::Deflection => self.gravitational_deflection,
            Layer::Aberration => self.annual_aberration,
            Layer::Nutation => self.nutation,
        }
    }

    fn set(&mut self, layer: Layer, on: bool) {
        match layer {
            Layer::Fk5 => self.fk5 = on,
            Layer::Deflection => self.gravitational_deflection = on,
            Layer::Aberration => self.annual_aberration = on,
            Layer::Nutation => self.nutation = on,
        }
    }

    fn applied(&self) -> Vec<Layer> {
        LAYERS.iter().copied().filter(|layer| self.get(*layer)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Fk5,
    Deflection,
    Aberration,
    Nutation,
}

/// Inner to outer
const LAYERS: [Layer; 4] = [Layer::Fk5, Layer::Deflection, Layer::Aberration, Layer::Nutation];

/// Construction options for [`EquinoctialFrame`]
///
/// Either `position` or both `ra` and `dec` (degrees) must be given. The
/// correction flags declare what the supplied position already contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquinoctialOptions {
    pub position: Option<SpatialPosition>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// Defaults to 1
    pub radius: Option<f64>,
    pub epoch: Epoch,
    pub corrections: Corrections,
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub continuous: bool,
}

impl EquinoctialOptions {
    pub fn with_position(mut self, position: SpatialPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_ra_dec(mut self, ra: f64, dec: f64) -> Self {
        self.ra = Some(ra);
        self.dec = Some(dec);
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_corrections(mut self, corrections: Corrections) -> Self {
        self.corrections = corrections;
        self
    }

    pub fn with_nutation(mut self, on: bool) -> Self {
        self.corrections.nutation = on;
        self
    }

    pub fn with_fk5(mut self, on: bool) -> Self {
        self.corrections.fk5 = on;
        self
    }

    pub fn with_annual_aberration(mut self, on: bool) -> Self {
        self.corrections.annual_aberration = on;
        self
    }

    pub fn with_gravitational_deflection(mut self, on: bool) -> Self {
        self.corrections.gravitational_deflection = on;
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

/// Changes for [`EquinoctialFrame::retarget`]; `None` leaves a setting alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EquinoctialRetarget {
    pub epoch: Option<Epoch>,
    pub nutation: Option<bool>,
    pub fk5: Option<bool>,
    pub annual_aberration: Option<bool>,
    pub gravitational_deflection: Option<bool>,
}

impl EquinoctialRetarget {
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_nutation(mut self, on: bool) -> Self {
        self.nutation = Some(on);
        self
    }

    pub fn with_fk5(mut self, on: bool) -> Self {
        self.fk5 = Some(on);
        self
    }

    pub fn with_annual_aberration(mut self, on: bool) -> Self {
        self.annual_aberration = Some(on);
        self
    }

    pub fn with_gravitational_deflection(mut self, on: bool) -> Self {
        self.gravitational_deflection = Some(on);
        self
    }
}

/// Right ascension and declination referred to the equator and equinox of an epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EquinoctialFrame {
    common: CommonFrame,
    precession: Precession,
    nutation: Nutation,
    corrections: Corrections,
}

impl EquinoctialFrame {
    pub fn new(options: EquinoctialOptions) -> Result<Self> {
        let position = match (options.position, options.ra, options.dec) {
            (Some(position), _, _) => position,
            (None, Some(ra), Some(dec)) => {
                checked_position(BoundsPolicy::Strict, ["ra", "dec"], ra, dec, options.radius.unwrap_or(1.0))?
            }
            _ => return Err(FrameError::MissingRequiredField("position or ra/dec")),
        };
        let mut common = CommonFrame::new(position, BoundsPolicy::Strict);
        common.set_continuous(options.continuous);
        Ok(Self::from_parts(
            common,
            options.epoch,
            options.precession_model,
            options.nutation_model,
            options.corrections,
        ))
    }

    /// Mean place at `epoch`, default models, unit radius
    pub fn from_ra_dec(ra: f64, dec: f64, epoch: Epoch) -> Result<Self> {
        Self::new(EquinoctialOptions::default().with_ra_dec(ra, dec).with_epoch(epoch))
    }

    pub(crate) fn from_parts(
        common: CommonFrame,
        epoch: Epoch,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
        corrections: Corrections,
    ) -> Self {
        Self {
            common,
            precession: Precession::new(epoch, precession_model),
            nutation: Nutation::new(epoch, nutation_model),
            corrections,
        }
    }

    /// Right ascension in degrees
    pub fn ra(&self) -> f64 {
        self.common.longitude()
    }

    /// Declination in degrees
    pub fn dec(&self) -> f64 {
        self.common.latitude()
    }

    pub fn radius(&self) -> f64 {
        self.common.radius()
    }

    pub fn epoch(&self) -> Epoch {
        self.precession.epoch()
    }

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession.model()
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation.model()
    }

    pub fn corrections(&self) -> Corrections {
        self.corrections
    }

    pub fn common_mut(&mut self) -> &mut CommonFrame {
        &mut self.common
    }

    /// Obliquity of the ecliptic matching the stored equator, radians
    pub(crate) fn obliquity(&self) -> f64 {
        let mean = self.precession.epsilon() * ASEC2RAD;
        if self.corrections.nutation {
            mean + self.nutation.obliquity() * MAS2RAD
        } else {
            mean
        }
    }

    /// Apply every change in `options`: epoch first, then the correction flags
    pub fn retarget(&mut self, options: &EquinoctialRetarget) {
        if let Some(epoch) = options.epoch {
            self.retarget_epoch(epoch);
        }
        let toggles = [
            (Layer::Fk5, options.fk5),
            (Layer::Deflection, options.gravitational_deflection),
            (Layer::Aberration, options.annual_aberration),
            (Layer::Nutation, options.nutation),
        ];
        for (layer, on) in toggles {
            if let Some(on) = on {
                self.toggle(layer, on);
            }
        }
    }

    /// Precess to `epoch`, keeping the same corrections applied
    pub fn retarget_epoch(&mut self, epoch: Epoch) {
        if epoch == self.epoch() {
            return;
        }
        let applied = self.corrections.applied();
        let mut p = self.common.raw_position();
        for layer in applied.iter().rev() {
            self.transform(&mut p, *layer, false);
        }
        if !self.epoch().is_j2000() {
            p.rotate(&self.precession.matrix().transpose());
        }

        log::debug!("equinoctial frame: epoch {} -> {}", self.epoch(), epoch);
        self.precession.retarget(epoch);
        self.nutation.retarget(epoch);

        if !epoch.is_j2000() {
            p.rotate(&self.precession.matrix());
        }
        for layer in &applied {
            self.transform(&mut p, *layer, true);
        }
        self.common.track(p);
    }

    pub fn apply_nutation(&mut self) {
        self.toggle(Layer::Nutation, true);
    }

    pub fn remove_nutation(&mut self) {
        self.toggle(Layer::Nutation, false);
    }

    pub fn apply_annual_aberration(&mut self) {
        self.toggle(Layer::Aberration, true);
    }

    pub fn remove_annual_aberration(&mut self) {
        self.toggle(Layer::Aberration, false);
    }

    pub fn apply_gravitational_deflection(&mut self) {
        self.toggle(Layer::Deflection, true);
    }

    pub fn remove_gravitational_deflection(&mut self) {
        self.toggle(Layer::Deflection, false);
    }

    pub fn apply_fk5(&mut self) {
        self.toggle(Layer::Fk5, true);
    }

    pub fn remove_fk5(&mut self) {
        self.toggle(Layer::Fk5, false);
    }

    /// A retargeted copy; `self` is left as it is
    pub fn snapshot(&self, options: &EquinoctialRetarget) -> Result<Self> {
        let mut copy = self.clone();
        copy.retarget(options);
        Ok(copy)
    }

    /// Copy retargeted to `time` with every correction applied
    pub(crate) fn apparent_at(&self, time: Epoch) -> Self {
        let mut copy = self.clone();
        copy.retarget_epoch(time);
        for layer in LAYERS {
            copy.toggle(layer, true);
        }
        copy
    }

    fn toggle(&mut self, layer: Layer, on: bool) {
        if self.corrections.get(layer) == on {
            return;
        }
        let outer: Vec<Layer> = self
            .corrections
            .applied()
            .into_iter()
            .filter(|other| *other > layer)
            .collect();

        let mut p = self.common.raw_position();
        for other in outer.iter().rev() {
            self.transform(&mut p, *other, false);
        }
        self.transform(&mut p, layer, on);
        for other in &outer {
            self.transform(&mut p, *other, true);
        }
        self.common.track(p);
        self.corrections.set(layer, on);
        log::debug!("equinoctial frame: {:?} {}", layer, if on { "applied" } else { "removed" });
    }

    /// Apply (`forward`) or remove one correction on `p` at the current epoch
    fn transform(&self, p: &mut SpatialPosition, layer: Layer, forward: bool) {
        match layer {
            Layer::Fk5 => {
                // The bias is defined at J2000; carry it to the equator of the epoch
                let precession = self.precession.matrix();
                let bias = precession * frame_bias_matrix() * precession.transpose();
                p.rotate(&if forward { bias } else { bias.transpose() });
            }
            Layer::Nutation => {
                let nutation = self.nutation.matrix(self.precession.epsilon());
                p.rotate(&if forward { nutation } else { nutation.transpose() });
            }
            Layer::Aberration | Layer::Deflection => {
                let earth = EarthHeliocentric::new(self.epoch());
                let (earth_position, earth_velocity) = earth_state(&earth, self.precession.epsilon() * ASEC2RAD);
                let mut u = p.direction();
                match (layer, forward) {
                    (Layer::Aberration, true) => add_aberration(&mut u, &earth_velocity),
                    (Layer::Aberration, false) => remove_aberration(&mut u, &earth_velocity),
                    (_, true) => add_deflection(&mut u, &earth_position),
                    (_, false) => remove_deflection(&mut u, &earth_position),
                }
                p.set_vector(&(u * p.r()));
            }
        }
    }
}

impl CelestialFrame for EquinoctialFrame {
    fn code(&self) -> FrameCode {
        FrameCode::Equinoctial
    }

    fn common(&self) -> &CommonFrame {
        &self.common
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        Ok(self.clone())
    }

    fn to_ecliptic(&self) -> Result<EclipticFrame> {
        let mut p = self.common.raw_position();
        p.rotate_x(self.obliquity());
        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        Ok(EclipticFrame::from_parts(
            common,
            self.epoch(),
            self.precession_model(),
            self.nutation_model(),
            self.corrections.nutation,
            EclipticCenter::Geocentric,
        ))
    }

    fn to_galactic(&self) -> Result<GalacticFrame> {
        let mut mean = self.clone();
        mean.remove_nutation();
        Ok(GalacticFrame::from_equinoctial(&mean))
    }

    fn to_hour_angle(&self, observing: Option<&ObservingCondition>) -> Result<HourAngleFrame> {
        let observing = observing.ok_or(FrameError::MissingRequiredField("observing condition"))?;
        let apparent = self.apparent_at(observing.time());
        let mut p = apparent.common.raw_position();
        let sidereal_time = observing
            .sidereal_time(self.precession_model(), self.nutation_model())?
            .true_time();
        log::trace!("equinoctial frame: local sidereal time {sidereal_time:.6} s");
        hour_angle::equinoctial_to_hour_angle(&mut p, sidereal_time);

        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        Ok(HourAngleFrame::from_parts(
            common,
            *observing,
            self.precession_model(),
            self.nutation_model(),
            sidereal_time,
        ))
    }

    fn to_horizontal(&self, observing: Option<&ObservingCondition>) -> Result<HorizontalFrame> {
        self.to_hour_angle(observing)?.to_horizontal(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::angle::{parse_dms, parse_hms};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn theta_persei() -> EquinoctialFrame {
        // Meeus example 21.b, mean place J2000.0
        EquinoctialFrame::from_ra_dec(41.054063, 49.227750, Epoch::J2000).unwrap()
    }

    #[test]
    fn test_requires_position_or_angles() {
        let err = EquinoctialFrame::new(EquinoctialOptions::default()).unwrap_err();
        assert_eq!(err, FrameError::MissingRequiredField("position or ra/dec"));
        let err = EquinoctialFrame::new(EquinoctialOptions { ra: Some(10.0), ..Default::default() }).unwrap_err();
        assert_eq!(err, FrameError::MissingRequiredField("position or ra/dec"));
    }

    #[rstest]
    #[case(360.0, 0.0, 1.0, "ra")]
    #[case(-0.1, 0.0, 1.0, "ra")]
    #[case(10.0, 90.01, 1.0, "dec")]
    #[case(10.0, 0.0, 1e-8, "radius")]
    fn test_range_validation(#[case] ra: f64, #[case] dec: f64, #[case] radius: f64, #[case] field: &str) {
        let options = EquinoctialOptions::default().with_ra_dec(ra, dec).with_radius(radius);
        match EquinoctialFrame::new(options) {
            Err(FrameError::RangeValidation { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected range error on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_precession_theta_persei() {
        // Meeus example 21.b: to 2028 Nov 13.19 TD with the IAU 1976 angles
        let mut frame = EquinoctialFrame::new(
            EquinoctialOptions::default()
                .with_ra_dec(41.054063, 49.227750)
                .with_precession_model(PrecessionModel::Iau1976),
        )
        .unwrap();
        frame.retarget_epoch(Epoch::from_jd(2462088.69).unwrap());
        assert_relative_eq!(frame.ra(), 41.547214, epsilon = 1e-6);
        assert_relative_eq!(frame.dec(), 49.348483, epsilon = 1e-6);
    }

    #[test]
    fn test_epoch_round_trip() {
        let original = theta_persei();
        let mut frame = original.clone();
        frame.retarget(&EquinoctialRetarget::default().with_epoch(Epoch::B1950).with_nutation(true).with_fk5(true));
        assert!(frame.ra() != original.ra());
        frame.retarget(&EquinoctialRetarget::default().with_epoch(Epoch::J2000).with_nutation(false).with_fk5(false));
        assert_relative_eq!(frame.ra(), original.ra(), epsilon = 1e-10);
        assert_relative_eq!(frame.dec(), original.dec(), epsilon = 1e-10);
    }

    #[test]
    fn test_nutation_size() {
        // Meeus example 23.a: Δα₁ = +15.843″, Δδ₁ = +6.218″ at 2028 Nov 13.19
        let epoch = Epoch::from_jd(2462088.69).unwrap();
        let mut frame = EquinoctialFrame::new(
            EquinoctialOptions::default().with_ra_dec(41.5599646, 49.3520685).with_epoch(epoch),
        )
        .unwrap();
        let (ra, dec) = (frame.ra(), frame.dec());
        frame.apply_nutation();
        assert_relative_eq!((frame.ra() - ra) * 3600.0, 15.843, epsilon = 0.05);
        assert_relative_eq!((frame.dec() - dec) * 3600.0, 6.218, epsilon = 0.05);
    }

    #[test]
    fn test_layers_are_involutions() {
        let epoch = Epoch::from_jd(2455197.5).unwrap();
        let original = EquinoctialFrame::new(
            EquinoctialOptions::default()
                .with_ra_dec(250.0, -33.0)
                .with_epoch(epoch)
                .with_nutation(true)
                .with_annual_aberration(true),
        )
        .unwrap();

        let mut frame = original.clone();
        frame.apply_fk5();
        frame.apply_gravitational_deflection();
        assert!(frame.corrections().fk5);
        // Applying twice is a no-op
        let once = frame.clone();
        frame.apply_fk5();
        assert_eq!(frame, once);

        frame.remove_annual_aberration();
        frame.remove_nutation();
        frame.remove_fk5();
        frame.remove_gravitational_deflection();
        assert_eq!(frame.corrections(), Corrections::default());
        frame.apply_nutation();
        frame.apply_annual_aberration();

        assert_eq!(frame.corrections(), original.corrections());
        assert!(frame.common().raw_position().angle_between(&original.common().raw_position()) < 1e-14);
    }

    #[test]
    fn test_layer_order_is_fixed() {
        let epoch = Epoch::from_jd(2455197.5).unwrap();
        let base = EquinoctialFrame::new(EquinoctialOptions::default().with_ra_dec(10.0, 10.0).with_epoch(epoch)).unwrap();
        let mut a = base.clone();
        a.apply_nutation();
        a.apply_annual_aberration();
        let mut b = base.clone();
        b.apply_annual_aberration();
        b.apply_nutation();
        assert!(a.common().raw_position().angle_between(&b.common().raw_position()) < 1e-14);
    }

    #[test]
    fn test_snapshot_is_pure() {
        let frame = theta_persei();
        let before = frame.clone();
        let later = frame
            .snapshot(&EquinoctialRetarget::default().with_epoch(Epoch::julian_epoch(2050.0).unwrap()).with_nutation(true))
            .unwrap();
        assert_eq!(frame, before);
        assert!(later.corrections().nutation);
        assert!(later.ra() > frame.ra());
    }

    #[test]
    fn test_scenario_c_galactic() {
        let ra = parse_hms("17h48m59.74s").unwrap();
        let dec = parse_dms("-14d43m08.2s").unwrap();
        let frame = EquinoctialFrame::from_ra_dec(ra, dec, Epoch::B1950).unwrap();
        let galactic = frame.to_galactic().unwrap();
        assert_relative_eq!(galactic.lon(), 12.9593, epsilon = 2e-4);
        assert_relative_eq!(galactic.lat(), 6.0463, epsilon = 2e-4);
    }

    #[test]
    fn test_conversions_need_observer() {
        let frame = theta_persei();
        assert_eq!(
            frame.to_horizontal(None).unwrap_err(),
            FrameError::MissingRequiredField("observing condition")
        );
    }

    #[test]
    fn test_options_reject_invalid_position() {
        let options = EquinoctialOptions::default()
            .with_position(SpatialPosition::new(2.0, 1.0, 0.5).unwrap());
        let mut value = serde_json::to_value(&options).unwrap();
        let back: EquinoctialOptions = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, options);

        value["position"]["r"] = serde_json::json!(0.0);
        assert!(serde_json::from_value::<EquinoctialOptions>(value).is_err());
    }
}

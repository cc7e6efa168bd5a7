//! Galactic longitude and latitude
//!
//! The galactic plane is defined by the J2000 equinoctial directions of the
//! north galactic pole and of the galactic centre. For any other epoch both
//! directions are first precessed through an [`EquinoctialFrame`]; the frame
//! rotation is then
//!
//! ```text
//! R3(−θ₀) · R1(90° − δ_NGP) · R3(α_NGP + 90°)
//! ```
//!
//! with the node angle θ₀ = arccos(cos a₀ · cos δ_GC), a₀ = 90° − (α_GC − α_NGP).
//!
//! Galactic positions are referred to the mean equator: they never carry nutation.

use super::common::{checked_position, BoundsPolicy, CommonFrame};
use super::equinoctial::{Corrections, EquinoctialFrame};
use super::{CelestialFrame, FrameCode};
use crate::constants::{DEG2RAD, GC_DEC_J2000, GC_RA_J2000, NGP_DEC_J2000, NGP_RA_J2000, RAD2DEG};
use crate::coordinates::SpatialPosition;
use crate::errors::{FrameError, Result};
use crate::nutationlib::NutationModel;
use crate::precessionlib::PrecessionModel;
use crate::time::Epoch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Orientation of the galactic plane at one epoch
#[derive(Debug, Clone, Copy, PartialEq)]
struct GalacticNode {
    /// Right ascension and declination of the north galactic pole, degrees
    pole: (f64, f64),
    /// Right ascension and declination of the galactic centre, degrees
    center: (f64, f64),
    /// θ₀ in radians
    angle: f64,
}

impl GalacticNode {
    fn at(epoch: Epoch, precession_model: PrecessionModel, nutation_model: NutationModel) -> Self {
        let precess = |ra: f64, dec: f64| {
            let (ra, dec) = (ra * DEG2RAD, dec * DEG2RAD);
            let unit = Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin());
            let mut frame = EquinoctialFrame::from_parts(
                CommonFrame::new(SpatialPosition::from_vector(&unit), BoundsPolicy::Strict),
                Epoch::J2000,
                precession_model,
                nutation_model,
                Corrections::default(),
            );
            frame.retarget_epoch(epoch);
            (frame.ra(), frame.dec())
        };
        let pole = precess(NGP_RA_J2000, NGP_DEC_J2000);
        let center = precess(GC_RA_J2000, GC_DEC_J2000);

        let a0 = (90.0 - (center.0 - pole.0)) * DEG2RAD;
        let angle = (a0.cos() * (center.1 * DEG2RAD).cos()).clamp(-1.0, 1.0).acos();
        log::trace!(
            "galactic node at {}: pole=({:.6}, {:.6}) center=({:.6}, {:.6}) theta0={:.9}",
            epoch,
            pole.0,
            pole.1,
            center.0,
            center.1,
            angle * RAD2DEG
        );
        Self { pole, center, angle }
    }

    fn rotate_from_equinoctial(&self, p: &mut SpatialPosition) {
        p.rotate_z((self.pole.0 + 90.0) * DEG2RAD);
        p.rotate_x((90.0 - self.pole.1) * DEG2RAD);
        p.rotate_z(-self.angle);
    }

    fn rotate_to_equinoctial(&self, p: &mut SpatialPosition) {
        p.rotate_z(self.angle);
        p.rotate_x(-(90.0 - self.pole.1) * DEG2RAD);
        p.rotate_z(-(self.pole.0 + 90.0) * DEG2RAD);
    }
}

/// Construction options for [`GalacticFrame`]
///
/// Longitude and latitude are not range checked unless `bounds` is
/// [`BoundsPolicy::Strict`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalacticOptions {
    pub position: Option<SpatialPosition>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub radius: Option<f64>,
    pub epoch: Epoch,
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub bounds: BoundsPolicy,
    pub continuous: bool,
}

impl Default for GalacticOptions {
    fn default() -> Self {
        Self {
            position: None,
            lon: None,
            lat: None,
            radius: None,
            epoch: Epoch::J2000,
            precession_model: PrecessionModel::default(),
            nutation_model: NutationModel::default(),
            bounds: BoundsPolicy::Permissive,
            continuous: false,
        }
    }
}

impl GalacticOptions {
    pub fn with_position(mut self, position: SpatialPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_lon_lat(mut self, lon: f64, lat: f64) -> Self {
        self.lon = Some(lon);
        self.lat = Some(lat);
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

    pub fn with_precession_model(mut self, model: PrecessionModel) -> Self {
        self.precession_model = model;
        self
    }

    pub fn with_nutation_model(mut self, model: NutationModel) -> Self {
        self.nutation_model = model;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }
}

/// Changes for [`GalacticFrame::retarget`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GalacticRetarget {
    pub epoch: Option<Epoch>,
}

impl GalacticRetarget {
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = Some(epoch);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalacticFrame {
    common: CommonFrame,
    epoch: Epoch,
    precession_model: PrecessionModel,
    nutation_model: NutationModel,
    node: GalacticNode,
}

impl GalacticFrame {
    pub fn new(options: GalacticOptions) -> Result<Self> {
        let position = match (options.position, options.lon, options.lat) {
            (Some(position), _, _) => position,
            (None, Some(lon), Some(lat)) => {
                checked_position(options.bounds, ["lon", "lat"], lon, lat, options.radius.unwrap_or(1.0))?
            }
            _ => return Err(FrameError::MissingRequiredField("position or lon/lat")),
        };
        let mut common = CommonFrame::new(position, options.bounds);
        common.set_continuous(options.continuous);
        Ok(Self {
            common,
            epoch: options.epoch,
            precession_model: options.precession_model,
            nutation_model: options.nutation_model,
            node: GalacticNode::at(options.epoch, options.precession_model, options.nutation_model),
        })
    }

    /// Unit-radius position at `epoch` with default models
    pub fn from_lon_lat(lon: f64, lat: f64, epoch: Epoch) -> Result<Self> {
        Self::new(GalacticOptions::default().with_lon_lat(lon, lat).with_epoch(epoch))
    }

    /// Rotate a mean equinoctial place into galactic coordinates of the same epoch
    pub(crate) fn from_equinoctial(frame: &EquinoctialFrame) -> Self {
        let node = GalacticNode::at(frame.epoch(), frame.precession_model(), frame.nutation_model());
        let mut p = frame.common().raw_position();
        node.rotate_from_equinoctial(&mut p);
        let mut common = CommonFrame::new(p, BoundsPolicy::Permissive);
        common.set_continuous(frame.common().is_continuous());
        Self {
            common,
            epoch: frame.epoch(),
            precession_model: frame.precession_model(),
            nutation_model: frame.nutation_model(),
            node,
        }
    }

    /// Galactic longitude in degrees
    pub fn lon(&self) -> f64 {
        self.common.longitude()
    }

    /// Galactic latitude in degrees
    pub fn lat(&self) -> f64 {
        self.common.latitude()
    }

    pub fn radius(&self) -> f64 {
        self.common.radius()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession_model
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation_model
    }

    /// Right ascension and declination of the north galactic pole at the epoch, degrees
    pub fn north_pole(&self) -> (f64, f64) {
        self.node.pole
    }

    /// Right ascension and declination of the galactic centre at the epoch, degrees
    pub fn center_direction(&self) -> (f64, f64) {
        self.node.center
    }

    /// θ₀ in degrees
    pub fn node_angle(&self) -> f64 {
        self.node.angle * RAD2DEG
    }

    pub fn common_mut(&mut self) -> &mut CommonFrame {
        &mut self.common
    }

    pub(crate) fn set_bounds(&mut self, bounds: BoundsPolicy) {
        self.common.set_bounds(bounds);
    }

    pub fn retarget(&mut self, options: &GalacticRetarget) {
        if let Some(epoch) = options.epoch {
            self.retarget_epoch(epoch);
        }
    }

    /// Re-express the position against the galactic plane as seen from `epoch`
    pub fn retarget_epoch(&mut self, epoch: Epoch) {
        if epoch == self.epoch {
            return;
        }
        let mut p = self.common.raw_position();
        self.node.rotate_to_equinoctial(&mut p);
        let mut mean = EquinoctialFrame::from_parts(
            CommonFrame::new(p, BoundsPolicy::Strict),
            self.epoch,
            self.precession_model,
            self.nutation_model,
            Corrections::default(),
        );
        mean.retarget_epoch(epoch);

        let node = GalacticNode::at(epoch, self.precession_model, self.nutation_model);
        let mut p = mean.common().raw_position();
        node.rotate_from_equinoctial(&mut p);

        log::debug!("galactic frame: epoch {} -> {}", self.epoch, epoch);
        self.common.track(p);
        self.epoch = epoch;
        self.node = node;
    }

    /// A retargeted copy; `self` is left as it is
    pub fn snapshot(&self, options: &GalacticRetarget) -> Result<Self> {
        let mut copy = self.clone();
        copy.retarget(options);
        Ok(copy)
    }
}

impl CelestialFrame for GalacticFrame {
    fn code(&self) -> FrameCode {
        FrameCode::Galactic
    }

    fn common(&self) -> &CommonFrame {
        &self.common
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        let mut p = self.common.raw_position();
        self.node.rotate_to_equinoctial(&mut p);
        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        Ok(EquinoctialFrame::from_parts(
            common,
            self.epoch,
            self.precession_model,
            self.nutation_model,
            Corrections::default(),
        ))
    }

    fn to_galactic(&self) -> Result<GalacticFrame> {
        Ok(self.clone())
    }
}

//! Ecliptic longitude and latitude
//!
//! The frame is the ecliptic and equinox of its epoch. With nutation applied
//! the longitude is counted from the true equinox (λ + Δψ). Independently the
//! origin can be moved from the Earth to the Sun; distances are in AU.

use super::common::{checked_position, BoundsPolicy, CommonFrame};
use super::equinoctial::{Corrections, EquinoctialFrame};
use super::{CelestialFrame, FrameCode};
use crate::constants::{ASEC2RAD, MAS2RAD};
use crate::coordinates::{rotation_z, SpatialPosition, MIN_RADIUS};
use crate::earthlib::EarthHeliocentric;
use crate::errors::{FrameError, Result};
use crate::nutationlib::{Nutation, NutationModel};
use crate::precessionlib::{Precession, PrecessionModel};
use crate::time::Epoch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin of an ecliptic position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipticCenter {
    #[default]
    Geocentric,
    Heliocentric,
}

impl EclipticCenter {
    pub fn as_str(&self) -> &'static str {
        match self {
            EclipticCenter::Geocentric => "geocentric",
            EclipticCenter::Heliocentric => "heliocentric",
        }
    }
}

impl fmt::Display for EclipticCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EclipticCenter {
    type Err = FrameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geocentric" => Ok(EclipticCenter::Geocentric),
            "heliocentric" => Ok(EclipticCenter::Heliocentric),
            _ => Err(FrameError::UnknownEnum {
                kind: "ecliptic center",
                value: s.to_string(),
            }),
        }
    }
}

/// Construction options for [`EclipticFrame`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EclipticOptions {
    pub position: Option<SpatialPosition>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub radius: Option<f64>,
    pub epoch: Epoch,
    pub with_nutation: bool,
    pub center: EclipticCenter,
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub continuous: bool,
}

impl EclipticOptions {
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

    pub fn with_nutation(mut self, on: bool) -> Self {
        self.with_nutation = on;
        self
    }

    pub fn with_center(mut self, center: EclipticCenter) -> Self {
        self.center = center;
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

/// Changes for [`EclipticFrame::retarget`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EclipticRetarget {
    pub epoch: Option<Epoch>,
    pub with_nutation: Option<bool>,
    pub center: Option<EclipticCenter>,
}

impl EclipticRetarget {
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_nutation(mut self, on: bool) -> Self {
        self.with_nutation = Some(on);
        self
    }

    pub fn with_center(mut self, center: EclipticCenter) -> Self {
        self.center = Some(center);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EclipticFrame {
    common: CommonFrame,
    precession: Precession,
    nutation: Nutation,
    with_nutation: bool,
    center: EclipticCenter,
}

impl EclipticFrame {
    pub fn new(options: EclipticOptions) -> Result<Self> {
        let position = match (options.position, options.lon, options.lat) {
            (Some(position), _, _) => position,
            (None, Some(lon), Some(lat)) => {
                checked_position(BoundsPolicy::Strict, ["lon", "lat"], lon, lat, options.radius.unwrap_or(1.0))?
            }
            _ => return Err(FrameError::MissingRequiredField("position or lon/lat")),
        };
        let mut common = CommonFrame::new(position, BoundsPolicy::Strict);
        common.set_continuous(options.continuous);
        Ok(Self::from_parts(
            common,
            options.epoch,
            options.precession_model,
            options.nutation_model,
            options.with_nutation,
            options.center,
        ))
    }

    /// Geocentric mean place at `epoch`, default models, unit radius
    pub fn from_lon_lat(lon: f64, lat: f64, epoch: Epoch) -> Result<Self> {
        Self::new(EclipticOptions::default().with_lon_lat(lon, lat).with_epoch(epoch))
    }

    pub(crate) fn from_parts(
        common: CommonFrame,
        epoch: Epoch,
        precession_model: PrecessionModel,
        nutation_model: NutationModel,
        with_nutation: bool,
        center: EclipticCenter,
    ) -> Self {
        Self {
            common,
            precession: Precession::new(epoch, precession_model),
            nutation: Nutation::new(epoch, nutation_model),
            with_nutation,
            center,
        }
    }

    /// Ecliptic longitude in degrees
    pub fn lon(&self) -> f64 {
        self.common.longitude()
    }

    /// Ecliptic latitude in degrees
    pub fn lat(&self) -> f64 {
        self.common.latitude()
    }

    pub fn radius(&self) -> f64 {
        self.common.radius()
    }

    pub fn epoch(&self) -> Epoch {
        self.precession.epoch()
    }

    pub fn center(&self) -> EclipticCenter {
        self.center
    }

    pub fn with_nutation(&self) -> bool {
        self.with_nutation
    }

    pub fn precession_model(&self) -> PrecessionModel {
        self.precession.model()
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation.model()
    }

    pub fn common_mut(&mut self) -> &mut CommonFrame {
        &mut self.common
    }

    /// Apply every change in `options`: epoch, then nutation, then centre
    pub fn retarget(&mut self, options: &EclipticRetarget) -> Result<()> {
        let mut next = self.clone();
        if let Some(epoch) = options.epoch {
            next.retarget_epoch(epoch)?;
        }
        match options.with_nutation {
            Some(true) => next.apply_nutation(),
            Some(false) => next.remove_nutation(),
            None => {}
        }
        match options.center {
            Some(EclipticCenter::Heliocentric) => next.to_heliocentric()?,
            Some(EclipticCenter::Geocentric) => next.to_geocentric()?,
            None => {}
        }
        *self = next;
        Ok(())
    }

    /// Precess to `epoch`, keeping nutation and centre as they are
    pub fn retarget_epoch(&mut self, epoch: Epoch) -> Result<()> {
        if epoch == self.epoch() {
            return Ok(());
        }
        let mut p = self.geocentric_mean_position()?;
        p.rotate_x(-self.precession.epsilon() * ASEC2RAD);
        if !self.epoch().is_j2000() {
            p.rotate(&self.precession.matrix().transpose());
        }

        let mut precession = self.precession.clone();
        let mut nutation = self.nutation.clone();
        precession.retarget(epoch);
        nutation.retarget(epoch);

        if !epoch.is_j2000() {
            p.rotate(&precession.matrix());
        }
        p.rotate_x(precession.epsilon() * ASEC2RAD);
        if self.with_nutation {
            p.rotate_z(-nutation.longitude() * MAS2RAD);
        }
        if self.center == EclipticCenter::Heliocentric {
            translate(&mut p, &earth_vector(&nutation, self.with_nutation))?;
        }

        log::debug!("ecliptic frame: epoch {} -> {}", self.epoch(), epoch);
        self.common.track(p);
        self.precession = precession;
        self.nutation = nutation;
        Ok(())
    }

    /// Count longitude from the true equinox of date
    pub fn apply_nutation(&mut self) {
        self.set_nutation(true);
    }

    /// Count longitude from the mean equinox of date
    pub fn remove_nutation(&mut self) {
        self.set_nutation(false);
    }

    /// Move the origin to the Sun
    pub fn to_heliocentric(&mut self) -> Result<()> {
        if self.center == EclipticCenter::Heliocentric {
            return Ok(());
        }
        let mut p = self.common.raw_position();
        translate(&mut p, &self.earth())?;
        self.common.track(p);
        self.center = EclipticCenter::Heliocentric;
        log::debug!("ecliptic frame: center -> heliocentric");
        Ok(())
    }

    /// Move the origin to the Earth
    pub fn to_geocentric(&mut self) -> Result<()> {
        if self.center == EclipticCenter::Geocentric {
            return Ok(());
        }
        let mut p = self.common.raw_position();
        translate(&mut p, &-self.earth())?;
        self.common.track(p);
        self.center = EclipticCenter::Geocentric;
        log::debug!("ecliptic frame: center -> geocentric");
        Ok(())
    }

    /// A retargeted copy; `self` is left as it is
    pub fn snapshot(&self, options: &EclipticRetarget) -> Result<Self> {
        let mut copy = self.clone();
        copy.retarget(options)?;
        Ok(copy)
    }

    fn set_nutation(&mut self, on: bool) {
        if self.with_nutation == on {
            return;
        }
        // A rotation about the ecliptic pole commutes with the heliocentric shift
        let dpsi = self.nutation.longitude() * MAS2RAD;
        let mut p = self.common.raw_position();
        p.rotate_z(if on { -dpsi } else { dpsi });
        self.common.track(p);
        self.with_nutation = on;
        log::debug!("ecliptic frame: nutation {}", if on { "applied" } else { "removed" });
    }

    /// Heliocentric position of the Earth in the frame's current axes, AU
    fn earth(&self) -> Vector3<f64> {
        earth_vector(&self.nutation, self.with_nutation)
    }

    /// Geocentric position referred to the mean ecliptic of the epoch
    fn geocentric_mean_position(&self) -> Result<SpatialPosition> {
        let mut p = self.common.raw_position();
        if self.center == EclipticCenter::Heliocentric {
            translate(&mut p, &-self.earth())?;
        }
        if self.with_nutation {
            p.rotate_z(self.nutation.longitude() * MAS2RAD);
        }
        Ok(p)
    }
}

fn earth_vector(nutation: &Nutation, with_nutation: bool) -> Vector3<f64> {
    let v = EarthHeliocentric::new(nutation.epoch()).vector();
    if with_nutation {
        rotation_z(-nutation.longitude() * MAS2RAD) * v
    } else {
        v
    }
}

fn translate(p: &mut SpatialPosition, offset: &Vector3<f64>) -> Result<()> {
    let mut moved = *p;
    moved.translate(offset);
    if moved.r() < MIN_RADIUS {
        return Err(FrameError::RangeValidation {
            field: "radius",
            value: moved.r(),
            range: "[1e-7, inf) after change of centre",
        });
    }
    *p = moved;
    Ok(())
}

impl CelestialFrame for EclipticFrame {
    fn code(&self) -> FrameCode {
        FrameCode::Ecliptic
    }

    fn common(&self) -> &CommonFrame {
        &self.common
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        let mut p = self.common.raw_position();
        if self.center == EclipticCenter::Heliocentric {
            translate(&mut p, &-self.earth())?;
        }
        let mut obliquity = self.precession.epsilon() * ASEC2RAD;
        if self.with_nutation {
            obliquity += self.nutation.obliquity() * MAS2RAD;
        }
        p.rotate_x(-obliquity);

        let mut common = CommonFrame::new(p, BoundsPolicy::Strict);
        common.set_continuous(self.common.is_continuous());
        Ok(EquinoctialFrame::from_parts(
            common,
            self.epoch(),
            self.precession_model(),
            self.nutation_model(),
            Corrections {
                nutation: self.with_nutation,
                ..Corrections::default()
            },
        ))
    }
}

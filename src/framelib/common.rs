//! Validated storage of a frame's spherical position

use crate::coordinates::SpatialPosition;
use crate::errors::{check_closed, check_finite, check_half_open, Result};
use serde::{Deserialize, Serialize};

/// How strictly longitude and latitude inputs are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Longitude in [0, 360), latitude in [-90, 90]
    #[default]
    Strict,
    /// Any finite longitude and latitude
    Permissive,
}

/// Position storage shared by every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonFrame {
    position: SpatialPosition,
    continuous: bool,
    bounds: BoundsPolicy,
}

impl CommonFrame {
    pub fn new(position: SpatialPosition, bounds: BoundsPolicy) -> Self {
        Self {
            position,
            continuous: false,
            bounds,
        }
    }

    /// Build from longitude and latitude in degrees, checked against `bounds`
    pub fn from_coordinates(longitude: f64, latitude: f64, radius: f64, bounds: BoundsPolicy) -> Result<Self> {
        let position = checked_position(bounds, LON_LAT, longitude, latitude, radius)?;
        Ok(Self::new(position, bounds))
    }

    /// Replace the position
    pub fn set_position(&mut self, position: SpatialPosition) {
        self.position = position;
    }

    /// Replace the position from degrees, validated before anything changes
    pub fn set_coordinates(&mut self, longitude: f64, latitude: f64, radius: f64) -> Result<()> {
        self.position = checked_position(self.bounds, LON_LAT, longitude, latitude, radius)?;
        Ok(())
    }

    /// The position, folded into canonical ranges unless the frame is continuous
    pub fn position(&self) -> SpatialPosition {
        if self.continuous {
            self.position
        } else {
            self.position.normalized()
        }
    }

    /// The position exactly as tracked
    pub fn raw_position(&self) -> SpatialPosition {
        self.position
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.position().longitude()
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.position().latitude()
    }

    pub fn radius(&self) -> f64 {
        self.position.r()
    }

    pub fn set_longitude(&mut self, longitude: f64) -> Result<()> {
        let current = self.position();
        self.set_coordinates(longitude, current.latitude(), current.r())
    }

    pub fn set_latitude(&mut self, latitude: f64) -> Result<()> {
        let current = self.position();
        self.set_coordinates(current.longitude(), latitude, current.r())
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        // Tracked angles are kept as they are
        self.position = SpatialPosition::new(radius, self.position.theta(), self.position.phi())?;
        Ok(())
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn bounds(&self) -> BoundsPolicy {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: BoundsPolicy) {
        self.bounds = bounds;
    }

    /// Adopt `next` as the new value, keeping the tracked representation continuous
    pub(crate) fn track(&mut self, next: SpatialPosition) {
        self.position.follow(next);
    }
}

const LON_LAT: [&str; 2] = ["longitude", "latitude"];

/// Check a longitude/latitude pair in degrees against a bounds policy
///
/// `names` labels the pair in errors, e.g. `["ra", "dec"]`.
pub(crate) fn checked_position(
    bounds: BoundsPolicy,
    names: [&'static str; 2],
    longitude: f64,
    latitude: f64,
    radius: f64,
) -> Result<SpatialPosition> {
    match bounds {
        BoundsPolicy::Strict => {
            check_half_open(names[0], longitude, 0.0, 360.0, "[0, 360)")?;
            check_closed(names[1], latitude, -90.0, 90.0, "[-90, 90]")?;
        }
        BoundsPolicy::Permissive => {
            check_finite(names[0], longitude)?;
            check_finite(names[1], latitude)?;
        }
    }
    SpatialPosition::from_lon_lat(longitude, latitude, radius)
}

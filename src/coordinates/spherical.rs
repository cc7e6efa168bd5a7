//! # Spherical Position
//!
//! [`SpatialPosition`] is the value type every frame stores: a radius, a polar
//! angle θ measured from the +Z pole and an azimuth φ measured from +X toward +Y.
//!
//! ## Axes
//!
//! - **X**: longitude 0, latitude 0 of whatever frame owns the position
//! - **Y**: longitude 90°, latitude 0
//! - **Z**: the frame's pole (latitude +90°)
//!
//! Longitude is φ and latitude is 90° − θ.
//!
//! ## Rotations
//!
//! All rotation helpers use the frame-rotation convention: `rotate_z(ψ)` turns
//! the *axes* by ψ, so the azimuth of a fixed point decreases by ψ. Composing
//! `rotate_x(ε)` on an equatorial vector yields ecliptic coordinates, which is
//! the usual R1(ε) of the astronomical literature.
//!
//! ## Continuity
//!
//! Every mutating operation picks the representation (θ, φ) nearest to the
//! previous one, so θ may leave [0, π] and φ may leave [0, 2π) while a body
//! is followed across a pole. [`SpatialPosition::normalized`] folds it back.

use crate::constants::{DEG2RAD, RAD2DEG, TAU};
use crate::errors::{check_finite, FrameError, Result};
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Smallest radius a position may carry
pub const MIN_RADIUS: f64 = 1e-7;

/// Matrix of a frame rotation by `angle` radians about the X axis
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), -angle).into_inner()
}

/// Matrix of a frame rotation by `angle` radians about the Y axis
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), -angle).into_inner()
}

/// Matrix of a frame rotation by `angle` radians about the Z axis
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -angle).into_inner()
}

/// A point on (or off) the celestial sphere
///
/// Deserialisation validates like [`SpatialPosition::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct SpatialPosition {
    r: f64,
    theta: f64,
    phi: f64,
}

#[derive(Deserialize)]
struct RawPosition {
    r: f64,
    theta: f64,
    phi: f64,
}

impl TryFrom<RawPosition> for SpatialPosition {
    type Error = FrameError;

    fn try_from(raw: RawPosition) -> Result<Self> {
        Self::new(raw.r, raw.theta, raw.phi)
    }
}

impl SpatialPosition {
    /// Build from radius and angles in radians
    ///
    /// Fails when any component is not finite or the radius is below [`MIN_RADIUS`].
    pub fn new(r: f64, theta: f64, phi: f64) -> Result<Self> {
        check_finite("radius", r)?;
        check_finite("theta", theta)?;
        check_finite("phi", phi)?;
        if r < MIN_RADIUS {
            return Err(FrameError::RangeValidation {
                field: "radius",
                value: r,
                range: "[1e-7, inf)",
            });
        }
        Ok(Self { r, theta, phi })
    }

    /// Build from longitude and latitude in degrees
    pub fn from_lon_lat(lon_deg: f64, lat_deg: f64, r: f64) -> Result<Self> {
        check_finite("longitude", lon_deg)?;
        check_finite("latitude", lat_deg)?;
        Self::new(r, (90.0 - lat_deg) * DEG2RAD, lon_deg * DEG2RAD)
    }

    /// Build from a cartesian vector; the azimuth of a vector on the Z axis is 0
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let r = v.norm();
        if r == 0.0 {
            return Self {
                r: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        let theta = (v.z / r).clamp(-1.0, 1.0).acos();
        let phi = if v.x == 0.0 && v.y == 0.0 {
            0.0
        } else {
            v.y.atan2(v.x)
        };
        Self { r, theta, phi }
    }

    /// Cartesian vector of this position
    pub fn to_vector(&self) -> Vector3<f64> {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        Vector3::new(self.r * sin_t * cos_p, self.r * sin_t * sin_p, self.r * cos_t)
    }

    /// Unit direction of this position
    pub fn direction(&self) -> Vector3<f64> {
        Self {
            r: 1.0,
            theta: self.theta,
            phi: self.phi,
        }
        .to_vector()
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    /// Polar angle in radians, as tracked
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Azimuth in radians, as tracked
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Longitude (φ) in degrees, as tracked
    pub fn longitude(&self) -> f64 {
        self.phi * RAD2DEG
    }

    /// Latitude (90° − θ) in degrees, as tracked
    pub fn latitude(&self) -> f64 {
        90.0 - self.theta * RAD2DEG
    }

    /// Fold into θ ∈ [0, π], φ ∈ [0, 2π)
    pub fn normalized(&self) -> Self {
        let mut theta = self.theta.rem_euclid(TAU);
        let mut phi = self.phi;
        if theta > PI {
            theta = TAU - theta;
            phi += PI;
        }
        let mut phi = phi.rem_euclid(TAU);
        if phi >= TAU {
            phi = 0.0;
        }
        Self {
            r: self.r,
            theta,
            phi,
        }
    }

    /// Replace the direction with the one of `v`, keeping the representation continuous
    pub fn set_vector(&mut self, v: &Vector3<f64>) {
        let next = Self::from_vector(v);
        self.follow(next);
    }

    /// Adopt `next` as the new value, choosing the equivalent (θ, φ) nearest to the current one
    pub fn follow(&mut self, next: Self) {
        // A point on the pole has no azimuth of its own
        let at_pole = next.theta.sin().abs() < 1e-15;
        let mut best = (f64::INFINITY, next.theta, next.phi);
        for (theta, phi) in [(next.theta, next.phi), (-next.theta, next.phi + PI)] {
            let theta = theta + ((self.theta - theta) / TAU).round() * TAU;
            let phi = if at_pole {
                self.phi
            } else {
                phi + ((self.phi - phi) / TAU).round() * TAU
            };
            let cost = (theta - self.theta).abs() + (phi - self.phi).abs();
            if cost < best.0 {
                best = (cost, theta, phi);
            }
        }
        self.r = next.r;
        self.theta = best.1;
        self.phi = best.2;
    }

    /// Apply a rotation matrix to the position vector
    pub fn rotate(&mut self, m: &Matrix3<f64>) {
        let v = m * self.to_vector();
        self.set_vector(&v);
    }

    /// Frame rotation about X by `angle` radians
    pub fn rotate_x(&mut self, angle: f64) {
        self.rotate(&rotation_x(angle));
    }

    /// Frame rotation about Y by `angle` radians
    pub fn rotate_y(&mut self, angle: f64) {
        self.rotate(&rotation_y(angle));
    }

    /// Frame rotation about Z by `angle` radians
    pub fn rotate_z(&mut self, angle: f64) {
        self.phi -= angle;
    }

    /// Mirror across the XZ plane, flipping handedness (φ → −φ)
    pub fn invert_azimuth(&mut self) {
        self.phi = -self.phi;
    }

    /// Shift the origin: the new vector is `self + offset`
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        let v = self.to_vector() + offset;
        self.set_vector(&v);
    }

    /// Angular separation in radians
    pub fn angle_between(&self, other: &Self) -> f64 {
        let a = self.direction();
        let b = other.direction();
        // atan2 form stays accurate for tiny and near-antipodal separations
        a.cross(&b).norm().atan2(a.dot(&b))
    }
}

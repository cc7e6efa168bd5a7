//! Precession angles and the FK5 frame bias
//!
//! The equatorial precession angles ζ, θ, z carry a position from the mean
//! equator and equinox of J2000.0 to those of another epoch. Three models are
//! provided:
//!
//! - IAU 2006 (Capitaine et al. 2003, P03 polynomials)
//! - IAU 2000 (Lieske angles with the IAU 2000 precession-rate corrections, IERS Conventions 2003)
//! - IAU 1976 (Lieske et al. 1977)
//!
//! Every angle is exposed in arcseconds.

use crate::constants::ASEC2RAD;
use crate::coordinates::{rotation_x, rotation_y, rotation_z};
use crate::errors::FrameError;
use crate::time::Epoch;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frame bias: offset of the J2000 mean equinox from the ICRS origin, in arcseconds
const BIAS_DALPHA0: f64 = -0.0146;
/// Frame bias: celestial pole offset ξ₀ in arcseconds
const BIAS_XI0: f64 = -0.016617;
/// Frame bias: celestial pole offset η₀ in arcseconds
const BIAS_ETA0: f64 = -0.0068192;

/// Precession theory used for ζ, θ, z and the mean obliquity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecessionModel {
    #[default]
    Iau2006,
    Iau2000,
    Iau1976,
}

impl PrecessionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecessionModel::Iau2006 => "iau2006",
            PrecessionModel::Iau2000 => "iau2000",
            PrecessionModel::Iau1976 => "iau1976",
        }
    }

    /// Mean obliquity of the ecliptic at J2000.0 in arcseconds
    pub fn epsilon0(&self) -> f64 {
        match self {
            PrecessionModel::Iau2006 => 84381.406,
            PrecessionModel::Iau2000 | PrecessionModel::Iau1976 => 84381.448,
        }
    }

    /// (ζ, θ, z) in arcseconds at `t` Julian centuries from J2000.0
    fn angles(&self, t: f64) -> (f64, f64, f64) {
        match self {
            PrecessionModel::Iau2006 => {
                let zeta = 2.650545
                    + (2306.083227
                        + (0.2988499 + (0.01801828 + (-0.000005971 - 0.0000003173 * t) * t) * t) * t)
                        * t;
                let theta = (2004.191903
                    + (-0.4294934 + (-0.04182264 + (-0.000007089 - 0.0000001274 * t) * t) * t) * t)
                    * t;
                let z = -2.650545
                    + (2306.077181
                        + (1.0927348 + (0.01826837 + (-0.000028596 - 0.0000002904 * t) * t) * t) * t)
                        * t;
                (zeta, theta, z)
            }
            PrecessionModel::Iau2000 => {
                let zeta = 2.5976176
                    + (2306.0809506
                        + (0.3019015 + (0.0179663 + (-0.0000327 - 0.0000002 * t) * t) * t) * t)
                        * t;
                let theta = (2004.1917476
                    + (-0.4269353 + (-0.0418251 + (-0.0000601 - 0.0000001 * t) * t) * t) * t)
                    * t;
                let z = -2.5976176
                    + (2306.0803226
                        + (1.0947790 + (0.0182273 + (0.0000470 - 0.0000003 * t) * t) * t) * t)
                        * t;
                (zeta, theta, z)
            }
            PrecessionModel::Iau1976 => {
                let zeta = (2306.2181 + (0.30188 + 0.017998 * t) * t) * t;
                let theta = (2004.3109 + (-0.42665 - 0.041833 * t) * t) * t;
                let z = (2306.2181 + (1.09468 + 0.018203 * t) * t) * t;
                (zeta, theta, z)
            }
        }
    }

    /// Mean obliquity of the ecliptic in arcseconds at `t` Julian centuries from J2000.0
    fn obliquity(&self, t: f64) -> f64 {
        match self {
            PrecessionModel::Iau2006 => {
                84381.406
                    + (-46.836769
                        + (-0.0001831 + (0.00200340 + (-0.000000576 - 0.0000000434 * t) * t) * t) * t)
                        * t
            }
            PrecessionModel::Iau2000 => {
                84381.448 + (-46.84024 + (-0.00059 + 0.001813 * t) * t) * t
            }
            PrecessionModel::Iau1976 => 84381.448 + (-46.8150 + (-0.00059 + 0.001813 * t) * t) * t,
        }
    }
}

impl fmt::Display for PrecessionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrecessionModel {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iau2006" => Ok(PrecessionModel::Iau2006),
            "iau2000" => Ok(PrecessionModel::Iau2000),
            "iau1976" => Ok(PrecessionModel::Iau1976),
            _ => Err(FrameError::UnknownEnum {
                kind: "precession model",
                value: s.to_string(),
            }),
        }
    }
}

/// Precession angles of one model at one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Precession {
    epoch: Epoch,
    model: PrecessionModel,
    zeta: f64,
    theta: f64,
    z: f64,
    epsilon: f64,
}

impl Precession {
    pub fn new(epoch: Epoch, model: PrecessionModel) -> Self {
        let mut precession = Self {
            epoch,
            model,
            zeta: 0.0,
            theta: 0.0,
            z: 0.0,
            epsilon: model.epsilon0(),
        };
        precession.compute();
        precession
    }

    /// Recompute every angle for a new epoch
    pub fn retarget(&mut self, epoch: Epoch) {
        if epoch != self.epoch {
            self.epoch = epoch;
            self.compute();
        }
    }

    fn compute(&mut self) {
        let t = self.epoch.julian_centuries();
        let (zeta, theta, z) = self.model.angles(t);
        self.zeta = zeta;
        self.theta = theta;
        self.z = z;
        self.epsilon = self.model.obliquity(t);
        log::trace!(
            "precession {} at T={:.9}: zeta={:.6}\" theta={:.6}\" z={:.6}\" eps={:.6}\"",
            self.model,
            t,
            zeta,
            theta,
            z,
            self.epsilon
        );
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn model(&self) -> PrecessionModel {
        self.model
    }

    /// ζ in arcseconds
    pub fn zeta(&self) -> f64 {
        self.zeta
    }

    /// θ in arcseconds
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// z in arcseconds
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Mean obliquity of the ecliptic of date in arcseconds
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Mean obliquity of the ecliptic at J2000.0 in arcseconds
    pub fn epsilon0(&self) -> f64 {
        self.model.epsilon0()
    }

    /// Rotation from the mean equator and equinox of J2000.0 to those of the epoch
    ///
    /// R3(−z)·R2(θ)·R3(−ζ); the transpose is the reverse direction.
    pub fn matrix(&self) -> Matrix3<f64> {
        rotation_z(-self.z * ASEC2RAD)
            * rotation_y(self.theta * ASEC2RAD)
            * rotation_z(-self.zeta * ASEC2RAD)
    }
}

/// Rotation taking an ICRS-aligned (catalogue) direction onto the dynamical mean equator and equinox of J2000.0
///
/// R1(−η₀)·R2(ξ₀)·R3(dα₀), IAU 2000 bias parameters.
pub fn frame_bias_matrix() -> Matrix3<f64> {
    rotation_x(-BIAS_ETA0 * ASEC2RAD) * rotation_y(BIAS_XI0 * ASEC2RAD) * rotation_z(BIAS_DALPHA0 * ASEC2RAD)
}

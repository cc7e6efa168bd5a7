//! Nutation in longitude and obliquity
//!
//! Two series are available:
//!
//! - `iau2000b`: the principal lunisolar terms of IAU 2000B with its fixed
//!   offsets standing in for the planetary terms
//! - `lp`: the four-term low precision series (about 0.5″)
//!
//! Angles are exposed in milliarcseconds.

use crate::constants::{ASEC2RAD, ASEC360, DEG2RAD, MAS2RAD};
use crate::coordinates::{rotation_x, rotation_z};
use crate::errors::FrameError;
use crate::time::Epoch;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion factor from 0.1 microarcsecond to milliarcseconds
const TENTH_USEC_2_MAS: f64 = 1e-4;

/// IAU 2000B offsets standing in for the planetary terms, milliarcseconds
const DPPLAN: f64 = -0.135;
const DEPLAN: f64 = 0.388;

/// Lunisolar series, largest terms first.
///
/// Multipliers of (l, l', F, D, Ω) and coefficients
/// (sin ψ, sin ψ·t, cos ψ, cos ε, cos ε·t, sin ε) in 0.1 μas.
#[rustfmt::skip]
const LUNISOLAR: [([i8; 5], [f64; 6]); 63] = [
    ([0, 0, 0, 0, 1], [-172064161.0, -174666.0, 33386.0, 92052331.0, 9086.0, 15377.0]),
    ([0, 0, 2, -2, 2], [-13170906.0, -1675.0, -13696.0, 5730336.0, -3015.0, -4587.0]),
    ([0, 0, 2, 0, 2], [-2276413.0, -234.0, 2796.0, 978459.0, -485.0, 1374.0]),
    ([0, 0, 0, 0, 2], [2074554.0, 207.0, -698.0, -897492.0, 470.0, -291.0]),
    ([0, 1, 0, 0, 0], [1475877.0, -3633.0, 11817.0, 73871.0, -184.0, -1924.0]),
    ([0, 1, 2, -2, 2], [-516821.0, 1226.0, -524.0, 224386.0, -677.0, -174.0]),
    ([1, 0, 0, 0, 0], [711159.0, 73.0, -872.0, -6750.0, 0.0, 358.0]),
    ([0, 0, 2, 0, 1], [-387298.0, -367.0, 380.0, 200728.0, 18.0, 318.0]),
    ([1, 0, 2, 0, 2], [-301461.0, -36.0, 816.0, 129025.0, -63.0, 367.0]),
    ([0, -1, 2, -2, 2], [215829.0, -494.0, 111.0, -95929.0, 299.0, 132.0]),
    ([1, 0, 0, -2, 0], [-158000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, 0, 2, -2, 1], [129000.0, 100.0, 0.0, -70000.0, 0.0, 0.0]),
    ([-1, 0, 2, 0, 2], [123000.0, 0.0, 0.0, -53000.0, 0.0, 0.0]),
    ([0, 0, 0, 2, 0], [63000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 0, 0, 0, 1], [63000.0, 100.0, 0.0, -33000.0, 0.0, 0.0]),
    ([-1, 0, 2, 2, 2], [-59000.0, 0.0, 0.0, 26000.0, 0.0, 0.0]),
    ([-1, 0, 0, 0, 1], [-58000.0, -100.0, 0.0, 32000.0, 0.0, 0.0]),
    ([1, 0, 2, 0, 1], [-51000.0, 0.0, 0.0, 27000.0, 0.0, 0.0]),
    ([2, 0, 0, -2, 0], [48000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([-2, 0, 2, 0, 1], [46000.0, 0.0, 0.0, -24000.0, 0.0, 0.0]),
    ([0, 0, 2, 2, 2], [-38000.0, 0.0, 0.0, 16000.0, 0.0, 0.0]),
    ([2, 0, 2, 0, 2], [-31000.0, 0.0, 0.0, 13000.0, 0.0, 0.0]),
    ([2, 0, 0, 0, 0], [29000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 0, 2, -2, 2], [29000.0, 0.0, 0.0, -12000.0, 0.0, 0.0]),
    ([0, 0, 2, 0, 0], [26000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, 0, 2, -2, 0], [-22000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([-1, 0, 2, 0, 1], [21000.0, 0.0, 0.0, -10000.0, 0.0, 0.0]),
    ([0, 2, 0, 0, 0], [17000.0, -100.0, 0.0, 0.0, 0.0, 0.0]),
    ([-1, 0, 0, 2, 1], [16000.0, 0.0, 0.0, -8000.0, 0.0, 0.0]),
    ([0, 2, 2, -2, 2], [-16000.0, 100.0, 0.0, 7000.0, 0.0, 0.0]),
    ([0, 1, 0, 0, 1], [-15000.0, 0.0, 0.0, 9000.0, 0.0, 0.0]),
    ([1, 0, 0, -2, 1], [-13000.0, 0.0, 0.0, 7000.0, 0.0, 0.0]),
    ([0, -1, 0, 0, 1], [-12000.0, 0.0, 0.0, 6000.0, 0.0, 0.0]),
    ([2, 0, -2, 0, 0], [11000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([-1, 0, 2, 2, 1], [-10000.0, 0.0, 0.0, 5000.0, 0.0, 0.0]),
    ([1, 0, 2, 2, 2], [-8000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([0, 1, 2, 0, 2], [7000.0, 0.0, 0.0, -3000.0, 0.0, 0.0]),
    ([1, 1, 0, -2, 0], [-7000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, -1, 2, 0, 2], [-7000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([0, 0, 2, 2, 1], [-7000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([1, 0, 0, 2, 0], [6000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([2, 0, 2, -2, 2], [6000.0, 0.0, 0.0, -3000.0, 0.0, 0.0]),
    ([1, 0, 2, -2, 1], [6000.0, 0.0, 0.0, -3000.0, 0.0, 0.0]),
    ([-2, 0, 0, 2, 1], [-6000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([0, 0, 0, 2, 1], [-6000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([1, -1, 0, 0, 0], [5000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, -1, 2, -2, 1], [-5000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([0, 0, 0, -2, 1], [-5000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([2, 0, 2, 0, 1], [-5000.0, 0.0, 0.0, 3000.0, 0.0, 0.0]),
    ([2, 0, 0, -2, 1], [4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, 1, 2, -2, 1], [4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 0, -2, 0, 0], [4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 0, 0, -1, 0], [-4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, 1, 0, -2, 0], [-4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, 0, 0, 1, 0], [-4000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 0, 2, 0, 0], [3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([-2, 0, 2, 0, 2], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, -1, 0, -1, 0], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, 1, 0, 0, 0], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([1, -1, 2, 0, 2], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([-1, -1, 2, 2, 2], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([3, 0, 2, 0, 2], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ([0, -1, 2, 2, 2], [-3000.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
];

/// Delaunay arguments (l, l', F, D, Ω) in radians, linear part of IERS 2003
fn fundamental_arguments(t: f64) -> [f64; 5] {
    [
        (485868.249036 + 1717915923.2178 * t) % ASEC360 * ASEC2RAD,
        (1287104.79305 + 129596581.0481 * t) % ASEC360 * ASEC2RAD,
        (335779.526232 + 1739527262.8478 * t) % ASEC360 * ASEC2RAD,
        (1072260.70369 + 1602961601.2090 * t) % ASEC360 * ASEC2RAD,
        (450160.398036 - 6962890.5431 * t) % ASEC360 * ASEC2RAD,
    ]
}

/// (Δψ, Δε) in milliarcseconds from the truncated IAU 2000B series
fn iau2000b(t: f64) -> (f64, f64) {
    let fa = fundamental_arguments(t);
    let mut dpsi = 0.0;
    let mut deps = 0.0;

    // Smallest terms first
    for (mult, c) in LUNISOLAR.iter().rev() {
        let arg: f64 = mult.iter().zip(fa.iter()).map(|(&n, &a)| n as f64 * a).sum();
        let (sin_arg, cos_arg) = arg.sin_cos();
        dpsi += (c[0] + c[1] * t) * sin_arg + c[2] * cos_arg;
        deps += (c[3] + c[4] * t) * cos_arg + c[5] * sin_arg;
    }

    (
        dpsi * TENTH_USEC_2_MAS + DPPLAN,
        deps * TENTH_USEC_2_MAS + DEPLAN,
    )
}

/// (Δψ, Δε) in milliarcseconds from the four-term series
fn low_precision(t: f64) -> (f64, f64) {
    let omega = (125.04452 - 1934.136261 * t) * DEG2RAD;
    let sun = (280.4665 + 36000.7698 * t) * DEG2RAD;
    let moon = (218.3165 + 481267.8813 * t) * DEG2RAD;

    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * sun).sin() - 0.23 * (2.0 * moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * sun).cos() + 0.10 * (2.0 * moon).cos()
        - 0.09 * (2.0 * omega).cos();

    (dpsi * 1000.0, deps * 1000.0)
}

/// Nutation series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutationModel {
    #[default]
    Iau2000b,
    Lp,
}

impl NutationModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutationModel::Iau2000b => "iau2000b",
            NutationModel::Lp => "lp",
        }
    }
}

impl fmt::Display for NutationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutationModel {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iau2000b" => Ok(NutationModel::Iau2000b),
            "lp" => Ok(NutationModel::Lp),
            _ => Err(FrameError::UnknownEnum {
                kind: "nutation model",
                value: s.to_string(),
            }),
        }
    }
}

/// Nutation angles of one model at one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Nutation {
    epoch: Epoch,
    model: NutationModel,
    dpsi: f64,
    deps: f64,
}

impl Nutation {
    pub fn new(epoch: Epoch, model: NutationModel) -> Self {
        let mut nutation = Self {
            epoch,
            model,
            dpsi: 0.0,
            deps: 0.0,
        };
        nutation.compute();
        nutation
    }

    pub fn retarget(&mut self, epoch: Epoch) {
        if epoch != self.epoch {
            self.epoch = epoch;
            self.compute();
        }
    }

    fn compute(&mut self) {
        let t = self.epoch.julian_centuries();
        let (dpsi, deps) = match self.model {
            NutationModel::Iau2000b => iau2000b(t),
            NutationModel::Lp => low_precision(t),
        };
        self.dpsi = dpsi;
        self.deps = deps;
        log::trace!("nutation {} at T={:.9}: dpsi={:.3}mas deps={:.3}mas", self.model, t, dpsi, deps);
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn model(&self) -> NutationModel {
        self.model
    }

    /// Nutation in longitude Δψ, milliarcseconds
    pub fn longitude(&self) -> f64 {
        self.dpsi
    }

    /// Nutation in obliquity Δε, milliarcseconds
    pub fn obliquity(&self) -> f64 {
        self.deps
    }

    /// Rotation from the mean to the true equator and equinox of date
    ///
    /// `mean_obliquity` is ε_A in arcseconds.
    pub fn matrix(&self, mean_obliquity: f64) -> Matrix3<f64> {
        nutation_matrix(
            mean_obliquity * ASEC2RAD,
            self.dpsi * MAS2RAD,
            self.deps * MAS2RAD,
        )
    }
}

/// R1(−ε_A − Δε)·R3(−Δψ)·R1(ε_A), all angles in radians
pub fn nutation_matrix(mean_obliquity: f64, dpsi: f64, deps: f64) -> Matrix3<f64> {
    rotation_x(-mean_obliquity - deps) * rotation_z(-dpsi) * rotation_x(mean_obliquity)
}

//! Annual aberration and solar light deflection
//!
//! Both corrections act on unit direction vectors referred to the mean equator
//! and equinox of date. Each has an exact inverse:
//!
//! - [`add_aberration`] / [`remove_aberration`]: closed form
//! - [`add_deflection`] / [`remove_deflection`]: fixed-point iteration

use crate::constants::SUN_SCHWARZSCHILD_AU;
use crate::coordinates::rotation_x;
use crate::earthlib::EarthHeliocentric;
use nalgebra::Vector3;

const DEFLECTION_MAX_ITERATIONS: usize = 20;

/// Heliocentric position (AU) and velocity over c of the Earth, mean equator of date
///
/// `mean_obliquity` is in radians.
pub fn earth_state(earth: &EarthHeliocentric, mean_obliquity: f64) -> (Vector3<f64>, Vector3<f64>) {
    let to_equator = rotation_x(-mean_obliquity);
    (to_equator * earth.vector(), to_equator * earth.velocity())
}

/// Shift a unit direction by the observer's velocity `velocity` (in units of c)
pub fn add_aberration(direction: &mut Vector3<f64>, velocity: &Vector3<f64>) {
    let shifted = *direction + velocity;
    *direction = shifted / shifted.norm();
}

/// Undo [`add_aberration`]
///
/// Solves `u + V = s·u′` with `|u| = 1` for the positive root `s`.
pub fn remove_aberration(direction: &mut Vector3<f64>, velocity: &Vector3<f64>) {
    let dot = direction.dot(velocity);
    let s = dot + (dot * dot - velocity.norm_squared() + 1.0).sqrt();
    *direction = *direction * s - velocity;
}

/// Deflection of a unit direction by the Sun's gravity
///
/// `earth` is the heliocentric position of the observer in AU. The source is
/// taken to be at infinity (SOFA `iauLd` with q = p).
fn deflection(direction: &Vector3<f64>, earth: &Vector3<f64>) -> Vector3<f64> {
    let em = earth.norm();
    let e = earth / em;
    // Keep the factor finite for a source directly behind the Sun
    let limit = 1e-6 / (em * em).max(1.0);
    let w = SUN_SCHWARZSCHILD_AU / em / (1.0 + direction.dot(&e)).max(limit);
    w * direction.cross(&e.cross(direction))
}

/// Bend a unit direction away from the Sun
pub fn add_deflection(direction: &mut Vector3<f64>, earth: &Vector3<f64>) {
    *direction += deflection(direction, earth);
}

/// Undo [`add_deflection`]
pub fn remove_deflection(direction: &mut Vector3<f64>, earth: &Vector3<f64>) {
    let observed = *direction;
    let mut source = observed;
    for _ in 0..DEFLECTION_MAX_ITERATIONS {
        let next = observed - deflection(&source, earth);
        let change = (next - source).norm();
        source = next;
        if change < 1e-17 {
            break;
        }
    }
    *direction = source;
}

//! Diurnal parallax
//!
//! Moves a position between the centre of the Earth and an observer on its
//! surface. Radii are taken to be in AU; the observer's offset uses the
//! IAU 1976 ellipsoid.

use crate::constants::{AU_KM, DEG2RAD, EARTH_AXIS_RATIO, EARTH_RADIUS_KM, SEC2RAD};
use crate::coordinates::{SpatialPosition, MIN_RADIUS};
use crate::errors::{check_closed, check_finite, FrameError, Result};
use nalgebra::Vector3;

/// Frame in which the position handed to [`DiurnalParallax`] is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallaxFrame {
    Equinoctial,
    HourAngle,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallaxDirection {
    GeocentricToTopocentric,
    TopocentricToGeocentric,
}

/// (ρ·sin φ′, ρ·cos φ′) in Earth equatorial radii
///
/// Meeus, Astronomical Algorithms, chapter 11.
pub fn geocentric_observer(geo_latitude: f64, elevation: f64) -> (f64, f64) {
    let phi = geo_latitude * DEG2RAD;
    let u = (EARTH_AXIS_RATIO * phi.tan()).atan();
    let h = elevation / (EARTH_RADIUS_KM * 1000.0);
    (
        EARTH_AXIS_RATIO * u.sin() + h * phi.sin(),
        u.cos() + h * phi.cos(),
    )
}

/// A position moved between geocentre and observer
#[derive(Debug, Clone, PartialEq)]
pub struct DiurnalParallax {
    observer: Vector3<f64>,
    position: SpatialPosition,
}

impl DiurnalParallax {
    /// `sidereal_time` is local apparent sidereal time in seconds of time;
    /// only the equinoctial frame depends on it.
    pub fn new(
        position: &SpatialPosition,
        sidereal_time: f64,
        geo_latitude: f64,
        elevation: f64,
        frame: ParallaxFrame,
        direction: ParallaxDirection,
    ) -> Result<Self> {
        check_finite("sidereal_time", sidereal_time)?;
        check_closed("geo_latitude", geo_latitude, -90.0, 90.0, "[-90, 90]")?;
        check_finite("elevation", elevation)?;

        let (rho_sin, rho_cos) = geocentric_observer(geo_latitude, elevation);
        let scale = EARTH_RADIUS_KM / AU_KM;
        let observer = match frame {
            ParallaxFrame::Equinoctial => {
                let lst = sidereal_time * SEC2RAD;
                Vector3::new(rho_cos * lst.cos(), rho_cos * lst.sin(), rho_sin)
            }
            ParallaxFrame::HourAngle => Vector3::new(rho_cos, 0.0, rho_sin),
            ParallaxFrame::Horizontal => {
                // Geocentric zenith lies toward the equator from the geodetic one
                let rho = rho_sin.hypot(rho_cos);
                let tilt = geo_latitude * DEG2RAD - rho_sin.atan2(rho_cos);
                Vector3::new(rho * tilt.sin(), 0.0, rho * tilt.cos())
            }
        } * scale;

        let offset = match direction {
            ParallaxDirection::GeocentricToTopocentric => -observer,
            ParallaxDirection::TopocentricToGeocentric => observer,
        };
        let mut moved = *position;
        moved.translate(&offset);
        if moved.r() < MIN_RADIUS {
            return Err(FrameError::RangeValidation {
                field: "radius",
                value: moved.r(),
                range: "[1e-7, inf) after parallax",
            });
        }
        Ok(Self {
            observer,
            position: moved,
        })
    }

    /// Geocentric vector of the observer in the chosen frame, AU
    pub fn observer(&self) -> Vector3<f64> {
        self.observer
    }

    /// The position seen from the other origin
    pub fn position(&self) -> SpatialPosition {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RAD2DEG;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_palomar_observer() {
        // Meeus example 11.a: Palomar, φ = 33°21′22″, H = 1706 m
        let (rho_sin, rho_cos) = geocentric_observer(33.356111, 1706.0);
        assert_relative_eq!(rho_sin, 0.546861, epsilon = 1e-6);
        assert_relative_eq!(rho_cos, 0.836339, epsilon = 1e-6);
    }

    #[rstest]
    #[case(ParallaxFrame::Equinoctial)]
    #[case(ParallaxFrame::HourAngle)]
    #[case(ParallaxFrame::Horizontal)]
    fn test_round_trip(#[case] frame: ParallaxFrame) {
        // The Moon at about 60 Earth radii
        let geo = SpatialPosition::from_lon_lat(30.0, 20.0, 0.00257).unwrap();
        let topo = DiurnalParallax::new(&geo, 12_345.0, 38.9, 120.0, frame, ParallaxDirection::GeocentricToTopocentric)
            .unwrap()
            .position();
        assert!(topo.angle_between(&geo) > 1e-4);
        let back = DiurnalParallax::new(&topo, 12_345.0, 38.9, 120.0, frame, ParallaxDirection::TopocentricToGeocentric)
            .unwrap()
            .position();
        assert_relative_eq!((back.to_vector() - geo.to_vector()).norm(), 0.0, epsilon = 1e-16);
    }

    #[test]
    fn test_horizontal_lowers_altitude() {
        // A body on the horizon of a geocentric observer sinks by about one Earth radius over its distance
        let geo = SpatialPosition::from_lon_lat(90.0, 0.0, 0.00257).unwrap();
        let topo = DiurnalParallax::new(&geo, 0.0, 0.0, 0.0, ParallaxFrame::Horizontal, ParallaxDirection::GeocentricToTopocentric)
            .unwrap()
            .position();
        let expected = -(EARTH_RADIUS_KM / AU_KM / 0.00257).atan() * RAD2DEG;
        assert_relative_eq!(topo.latitude(), expected, epsilon = 1e-9);
    }
}

//! Coordinate primitives shared by every frame
//!
//! - [`angle`]: stateless degree/hour/sexagesimal helpers
//! - [`spherical`]: the [`SpatialPosition`] value type and frame-rotation matrices

pub mod angle;
pub mod spherical;

pub use spherical::{rotation_x, rotation_y, rotation_z, SpatialPosition, MIN_RADIUS};

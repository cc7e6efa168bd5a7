//! Starframes: celestial coordinate frames and the conversions between them
//!
//! A point on the celestial sphere can be expressed in five frames:
//! horizontal, hour-angle, equinoctial, ecliptic and galactic. Each frame
//! owns the epoch or observing condition it is referred to and can re-express
//! itself at another one, modelling precession, nutation, annual aberration,
//! solar light deflection, FK5 frame bias, diurnal parallax and atmospheric
//! refraction along the way.
//!
//! ```
//! use starframes::{CelestialFrame, EquinoctialFrame, Epoch};
//!
//! // Mean place of Polaris at J2000, referred to the equator of 2050
//! let mut polaris = EquinoctialFrame::from_ra_dec(37.95456, 89.26411, Epoch::J2000).unwrap();
//! polaris.retarget_epoch(Epoch::julian_epoch(2050.0).unwrap());
//! assert!(polaris.dec() > 89.26411);
//!
//! let galactic = polaris.to_galactic().unwrap();
//! assert!((galactic.lat() - 26.46).abs() < 0.1);
//! ```

pub mod constants;
pub mod coordinates;
pub mod earthlib;
pub mod errors;
pub mod framelib;
pub mod nutationlib;
pub mod precessionlib;
pub mod relativity;
pub mod time;

// Re-export commonly used types
pub use coordinates::SpatialPosition;
pub use earthlib::{ObservingCondition, SiderealTime};
pub use errors::{FrameError, Result};
pub use framelib::{
    BoundsPolicy, CelestialFrame, CommonFrame, ConvertOptions, Corrections, EclipticCenter,
    EclipticFrame, EclipticOptions, EclipticRetarget, EquinoctialFrame, EquinoctialOptions,
    EquinoctialRetarget, Frame, FrameCode, FrameSwitcher, GalacticFrame, GalacticOptions,
    GalacticRetarget, HorizontalCenter, HorizontalFrame, HorizontalOptions, HourAngleFrame,
    HourAngleOptions, ObservingRetarget,
};
pub use nutationlib::NutationModel;
pub use precessionlib::PrecessionModel;
pub use time::Epoch;

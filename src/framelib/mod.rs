//! Celestial reference frames
//!
//! Five frames share one capability set ([`CelestialFrame`]):
//!
//! | Frame | Longitude | Latitude | Depends on |
//! |-------|-----------|----------|------------|
//! | [`EquinoctialFrame`] | right ascension | declination | epoch |
//! | [`EclipticFrame`] | ecliptic longitude | ecliptic latitude | epoch |
//! | [`GalacticFrame`] | galactic longitude | galactic latitude | epoch |
//! | [`HourAngleFrame`] | hour angle | declination | observing condition |
//! | [`HorizontalFrame`] | azimuth | altitude | observing condition |
//!
//! The equinoctial frame is the hub: every conversion passes through it.
//! [`Frame`] is the closed set of the five, and [`FrameSwitcher`] converts
//! between any two of them.

pub mod common;
pub mod ecliptic;
pub mod equinoctial;
pub mod galactic;
pub mod horizontal;
pub mod hour_angle;
pub mod switcher;

pub use common::{BoundsPolicy, CommonFrame};
pub use ecliptic::{EclipticCenter, EclipticFrame, EclipticOptions, EclipticRetarget};
pub use equinoctial::{Corrections, EquinoctialFrame, EquinoctialOptions, EquinoctialRetarget};
pub use galactic::{GalacticFrame, GalacticOptions, GalacticRetarget};
pub use horizontal::{HorizontalCenter, HorizontalFrame, HorizontalOptions};
pub use hour_angle::{HourAngleFrame, HourAngleOptions};
pub use switcher::{ConvertOptions, FrameSwitcher};

use crate::coordinates::SpatialPosition;
use crate::earthlib::ObservingCondition;
use crate::errors::{FrameError, Result};
use crate::time::Epoch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the five frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameCode {
    Horizontal,
    HourAngle,
    Equinoctial,
    Ecliptic,
    Galactic,
}

impl FrameCode {
    pub const ALL: [FrameCode; 5] = [
        FrameCode::Horizontal,
        FrameCode::HourAngle,
        FrameCode::Equinoctial,
        FrameCode::Ecliptic,
        FrameCode::Galactic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameCode::Horizontal => "horizontal",
            FrameCode::HourAngle => "hourangle",
            FrameCode::Equinoctial => "equinoctial",
            FrameCode::Ecliptic => "ecliptic",
            FrameCode::Galactic => "galactic",
        }
    }
}

impl fmt::Display for FrameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameCode {
    type Err = FrameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(FrameCode::Horizontal),
            "hourangle" | "hour_angle" | "hour-angle" => Ok(FrameCode::HourAngle),
            "equinoctial" | "equatorial" => Ok(FrameCode::Equinoctial),
            "ecliptic" => Ok(FrameCode::Ecliptic),
            "galactic" => Ok(FrameCode::Galactic),
            _ => Err(FrameError::UnknownEnum {
                kind: "frame code",
                value: s.to_string(),
            }),
        }
    }
}

/// Conversions every frame supports
///
/// Conversions never modify `self`. The observer frames need an
/// [`ObservingCondition`]: converting into one from an inertial frame fails
/// with [`FrameError::MissingRequiredField`] when `observing` is `None`, while
/// an observer frame falls back to its own.
pub trait CelestialFrame {
    fn code(&self) -> FrameCode;

    fn common(&self) -> &CommonFrame;

    /// The position, normalised unless the frame is continuous
    fn position(&self) -> SpatialPosition {
        self.common().position()
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame>;

    fn to_ecliptic(&self) -> Result<EclipticFrame> {
        self.to_equinoctial()?.to_ecliptic()
    }

    fn to_galactic(&self) -> Result<GalacticFrame> {
        self.to_equinoctial()?.to_galactic()
    }

    fn to_hour_angle(&self, observing: Option<&ObservingCondition>) -> Result<HourAngleFrame> {
        self.to_equinoctial()?.to_hour_angle(observing)
    }

    fn to_horizontal(&self, observing: Option<&ObservingCondition>) -> Result<HorizontalFrame> {
        self.to_equinoctial()?.to_horizontal(observing)
    }
}

/// Changes of observing time and site; `None` leaves a setting alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservingRetarget {
    pub time: Option<Epoch>,
    pub geo_longitude: Option<f64>,
    pub geo_latitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl ObservingRetarget {
    pub fn with_time(mut self, time: Epoch) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_geo_longitude(mut self, geo_longitude: f64) -> Self {
        self.geo_longitude = Some(geo_longitude);
        self
    }

    pub fn with_geo_latitude(mut self, geo_latitude: f64) -> Self {
        self.geo_latitude = Some(geo_latitude);
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// The observing condition after these changes, validated
    pub fn applied_to(&self, observing: &ObservingCondition) -> Result<ObservingCondition> {
        let next = observing.with_site(
            self.geo_longitude.unwrap_or(observing.geo_longitude()),
            self.geo_latitude.unwrap_or(observing.geo_latitude()),
            self.elevation.unwrap_or(observing.elevation()),
        )?;
        Ok(match self.time {
            Some(time) => next.with_time(time),
            None => next,
        })
    }
}

/// Any one of the five frames
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Horizontal(HorizontalFrame),
    HourAngle(HourAngleFrame),
    Equinoctial(EquinoctialFrame),
    Ecliptic(EclipticFrame),
    Galactic(GalacticFrame),
}

impl Frame {
    fn inner(&self) -> &dyn CelestialFrame {
        match self {
            Frame::Horizontal(frame) => frame,
            Frame::HourAngle(frame) => frame,
            Frame::Equinoctial(frame) => frame,
            Frame::Ecliptic(frame) => frame,
            Frame::Galactic(frame) => frame,
        }
    }

    /// The observing condition of an observer frame
    pub fn observing(&self) -> Option<ObservingCondition> {
        match self {
            Frame::Horizontal(frame) => Some(frame.observing()),
            Frame::HourAngle(frame) => Some(frame.observing()),
            _ => None,
        }
    }

    pub fn as_horizontal(&self) -> Option<&HorizontalFrame> {
        match self {
            Frame::Horizontal(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_hour_angle(&self) -> Option<&HourAngleFrame> {
        match self {
            Frame::HourAngle(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_equinoctial(&self) -> Option<&EquinoctialFrame> {
        match self {
            Frame::Equinoctial(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_ecliptic(&self) -> Option<&EclipticFrame> {
        match self {
            Frame::Ecliptic(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_galactic(&self) -> Option<&GalacticFrame> {
        match self {
            Frame::Galactic(frame) => Some(frame),
            _ => None,
        }
    }

    /// Convert into the frame named by `code`
    pub fn convert(&self, code: FrameCode, observing: Option<&ObservingCondition>) -> Result<Frame> {
        Ok(match code {
            FrameCode::Horizontal => Frame::Horizontal(self.to_horizontal(observing)?),
            FrameCode::HourAngle => Frame::HourAngle(self.to_hour_angle(observing)?),
            FrameCode::Equinoctial => Frame::Equinoctial(self.to_equinoctial()?),
            FrameCode::Ecliptic => Frame::Ecliptic(self.to_ecliptic()?),
            FrameCode::Galactic => Frame::Galactic(self.to_galactic()?),
        })
    }
}

impl CelestialFrame for Frame {
    fn code(&self) -> FrameCode {
        self.inner().code()
    }

    fn common(&self) -> &CommonFrame {
        self.inner().common()
    }

    fn to_equinoctial(&self) -> Result<EquinoctialFrame> {
        self.inner().to_equinoctial()
    }

    fn to_ecliptic(&self) -> Result<EclipticFrame> {
        self.inner().to_ecliptic()
    }

    fn to_galactic(&self) -> Result<GalacticFrame> {
        self.inner().to_galactic()
    }

    fn to_hour_angle(&self, observing: Option<&ObservingCondition>) -> Result<HourAngleFrame> {
        self.inner().to_hour_angle(observing)
    }

    fn to_horizontal(&self, observing: Option<&ObservingCondition>) -> Result<HorizontalFrame> {
        self.inner().to_horizontal(observing)
    }
}

macro_rules! impl_from_frame {
    ($variant:ident, $frame:ty) => {
        impl From<$frame> for Frame {
            fn from(frame: $frame) -> Self {
                Frame::$variant(frame)
            }
        }
    };
}

impl_from_frame!(Horizontal, HorizontalFrame);
impl_from_frame!(HourAngle, HourAngleFrame);
impl_from_frame!(Equinoctial, EquinoctialFrame);
impl_from_frame!(Ecliptic, EclipticFrame);
impl_from_frame!(Galactic, GalacticFrame);

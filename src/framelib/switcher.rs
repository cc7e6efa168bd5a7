//! Conversion between any two frames through the equinoctial hub

use super::ecliptic::{EclipticCenter, EclipticRetarget};
use super::equinoctial::{EquinoctialFrame, EquinoctialRetarget};
use super::horizontal::HorizontalCenter;
use super::{CelestialFrame, Frame, FrameCode};
use crate::earthlib::ObservingCondition;
use crate::errors::{FrameError, Result};
use crate::time::Epoch;

/// Target settings for [`FrameSwitcher::convert_to`]
///
/// Every field is optional. Absent settings fall back to the source frame
/// where it has a matching one (its observer, centre, refraction or
/// nutation flag) and to the target frame's defaults otherwise. `epoch`
/// applies to the inertial targets; the observer frames take their time from
/// the observing condition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    pub epoch: Option<Epoch>,
    pub observing: Option<ObservingCondition>,
    pub with_nutation: Option<bool>,
    pub ecliptic_center: Option<EclipticCenter>,
    pub horizontal_center: Option<HorizontalCenter>,
    pub with_ar: Option<bool>,
}

impl ConvertOptions {
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_observing(mut self, observing: ObservingCondition) -> Self {
        self.observing = Some(observing);
        self
    }

    pub fn with_nutation(mut self, on: bool) -> Self {
        self.with_nutation = Some(on);
        self
    }

    pub fn with_ecliptic_center(mut self, center: EclipticCenter) -> Self {
        self.ecliptic_center = Some(center);
        self
    }

    pub fn with_horizontal_center(mut self, center: HorizontalCenter) -> Self {
        self.horizontal_center = Some(center);
        self
    }

    pub fn with_ar(mut self, on: bool) -> Self {
        self.with_ar = Some(on);
        self
    }
}

/// A source frame together with its equinoctial (hub) representation
///
/// ```
/// use starframes::{CelestialFrame, ConvertOptions, Epoch, EquinoctialFrame, FrameCode, FrameSwitcher};
///
/// let vega = EquinoctialFrame::from_ra_dec(279.2347, 38.7837, Epoch::J2000).unwrap();
/// let switcher = FrameSwitcher::adopt(vega).unwrap();
/// let galactic = switcher.convert_to(FrameCode::Galactic, &ConvertOptions::default()).unwrap();
/// assert_eq!(galactic.code(), FrameCode::Galactic);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSwitcher {
    hub: EquinoctialFrame,
    source: Frame,
}

impl FrameSwitcher {
    /// Take a frame and derive its hub representation
    pub fn adopt(frame: impl Into<Frame>) -> Result<Self> {
        let source = frame.into();
        let hub = source.to_equinoctial()?;
        log::debug!("switcher: adopted {} frame", source.code());
        Ok(Self { hub, source })
    }

    pub fn hub(&self) -> &EquinoctialFrame {
        &self.hub
    }

    pub fn source(&self) -> &Frame {
        &self.source
    }

    /// Parse `code` and convert; unknown names fail with
    /// [`FrameError::UnknownEnum`]
    pub fn convert_to_str(&self, code: &str, options: &ConvertOptions) -> Result<Frame> {
        self.convert_to(code.parse()?, options)
    }

    pub fn convert_to(&self, code: FrameCode, options: &ConvertOptions) -> Result<Frame> {
        log::debug!("switcher: {} -> {}", self.source.code(), code);
        match code {
            FrameCode::Equinoctial => {
                let mut hub = self.hub_at(options.epoch);
                if let Some(on) = options.with_nutation {
                    hub.retarget(&EquinoctialRetarget::default().with_nutation(on));
                }
                Ok(Frame::Equinoctial(hub))
            }
            FrameCode::Ecliptic => {
                let mut frame = self.hub_at(options.epoch).to_ecliptic()?;
                let source = self.source.as_ecliptic();
                let retarget = EclipticRetarget {
                    epoch: None,
                    with_nutation: options.with_nutation,
                    center: Some(
                        options
                            .ecliptic_center
                            .or(source.map(|f| f.center()))
                            .unwrap_or_default(),
                    ),
                };
                frame.retarget(&retarget)?;
                Ok(Frame::Ecliptic(frame))
            }
            FrameCode::Galactic => {
                let mut frame = self.hub_at(options.epoch).to_galactic()?;
                if let Some(source) = self.source.as_galactic() {
                    frame.set_bounds(source.common().bounds());
                }
                Ok(Frame::Galactic(frame))
            }
            FrameCode::HourAngle => {
                let observing = self.observing(options)?;
                Ok(Frame::HourAngle(self.hub.to_hour_angle(Some(&observing))?))
            }
            FrameCode::Horizontal => {
                let observing = self.observing(options)?;
                let mut frame = self.hub.to_horizontal(Some(&observing))?;
                let source = self.source.as_horizontal();
                let center = options
                    .horizontal_center
                    .or(source.map(|f| f.center()))
                    .unwrap_or_default();
                let with_ar = options
                    .with_ar
                    .or(source.map(|f| f.with_ar()))
                    .unwrap_or(false);
                if center == HorizontalCenter::Topocentric {
                    frame.to_topocentric()?;
                }
                if with_ar {
                    frame.apply_refraction()?;
                }
                Ok(Frame::Horizontal(frame))
            }
        }
    }

    fn hub_at(&self, epoch: Option<Epoch>) -> EquinoctialFrame {
        let mut hub = self.hub.clone();
        if let Some(epoch) = epoch {
            hub.retarget_epoch(epoch);
        }
        hub
    }

    fn observing(&self, options: &ConvertOptions) -> Result<ObservingCondition> {
        options
            .observing
            .or(self.source.observing())
            .ok_or(FrameError::MissingRequiredField("observing condition"))
    }
}

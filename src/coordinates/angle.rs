//! # Angle Conversion Helpers
//!
//! Stateless conversions between degrees, hours and sexagesimal notation.
//!
//! Every function takes and returns plain numbers; nothing here carries state
//! between calls, so there is no shared converter instance to thread around.
//!
//! ## Examples
//!
//! ```rust
//! use starframes::coordinates::angle::{parse_dms, parse_hms};
//!
//! let ra = parse_hms("23h09m16.641s").unwrap();
//! assert!((ra - 347.3193375).abs() < 1e-9);
//!
//! let dec = parse_dms("-6°43'11.61\"").unwrap();
//! assert!((dec + 6.719891666666667).abs() < 1e-12);
//! ```

use crate::errors::{check_finite, FrameError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HMS_RE: Regex = Regex::new(
        r"^\s*([+-]?)\s*(\d+(?:\.\d+)?)\s*[hH:]\s*(?:(\d+(?:\.\d+)?)\s*[mM:]?\s*)?(?:(\d+(?:\.\d+)?)\s*[sS]?)?\s*$"
    )
    .unwrap();
    static ref DMS_RE: Regex = Regex::new(
        r#"^\s*([+-]?)\s*(\d+(?:\.\d+)?)\s*(?:°|[dD:])\s*(?:(\d+(?:\.\d+)?)\s*(?:'|′|[mM:])?\s*)?(?:(\d+(?:\.\d+)?)\s*(?:"|″|[sS])?)?\s*$"#
    )
    .unwrap();
}

/// Convert hours, minutes and seconds of time to degrees
///
/// The sign of the result follows `hours`; use a negative `hours` (or
/// [`parse_hms`] with a leading `-`) for negative values.
pub fn hms_to_degrees(hours: f64, minutes: f64, seconds: f64) -> f64 {
    let sign = if hours.is_sign_negative() { -1.0 } else { 1.0 };
    sign * (hours.abs() + minutes / 60.0 + seconds / 3600.0) * 15.0
}

/// Convert signed degrees, arcminutes and arcseconds to degrees
///
/// `negative` carries the sign separately so that `-0° 30'` can be expressed.
pub fn dms_to_degrees(negative: bool, degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    if negative {
        -value
    } else {
        value
    }
}

/// Split degrees into (hours, minutes, seconds) of time
pub fn degrees_to_hms(degrees: f64) -> (i32, i32, f64) {
    let hours = normalize_degrees(degrees) / 15.0;
    let h = hours.trunc();
    let minutes = (hours - h) * 60.0;
    let m = minutes.trunc();
    let s = (minutes - m) * 60.0;
    (h as i32, m as i32, s)
}

/// Split degrees into (negative, degrees, arcminutes, arcseconds)
pub fn degrees_to_dms(degrees: f64) -> (bool, i32, i32, f64) {
    let negative = degrees < 0.0;
    let value = degrees.abs();
    let d = value.trunc();
    let minutes = (value - d) * 60.0;
    let m = minutes.trunc();
    let s = (minutes - m) * 60.0;
    (negative, d as i32, m as i32, s)
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Parse an hours-minutes-seconds string such as `23h09m16.641s` or `23:09:16.641` into degrees
pub fn parse_hms(text: &str) -> Result<f64> {
    let caps = HMS_RE.captures(text).ok_or_else(|| FrameError::TypeValidation {
        field: "hms",
        message: format!("cannot parse `{text}` as hours/minutes/seconds"),
    })?;
    let (negative, h, m, s) = sexagesimal_fields(&caps)?;
    let degrees = (h + m / 60.0 + s / 3600.0) * 15.0;
    check_finite("hms", if negative { -degrees } else { degrees })
}

/// Parse a degrees-arcminutes-arcseconds string such as `-6°43′11.61″` or `-6:43:11.61` into degrees
pub fn parse_dms(text: &str) -> Result<f64> {
    let caps = DMS_RE.captures(text).ok_or_else(|| FrameError::TypeValidation {
        field: "dms",
        message: format!("cannot parse `{text}` as degrees/arcminutes/arcseconds"),
    })?;
    let (negative, d, m, s) = sexagesimal_fields(&caps)?;
    check_finite("dms", dms_to_degrees(negative, d, m, s))
}

fn sexagesimal_fields(caps: &regex::Captures<'_>) -> Result<(bool, f64, f64, f64)> {
    let negative = caps.get(1).map(|m| m.as_str() == "-").unwrap_or(false);
    let field = |i: usize| -> Result<f64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<f64>().map_err(|e| FrameError::TypeValidation {
                field: "sexagesimal",
                message: e.to_string(),
            }),
            None => Ok(0.0),
        }
    };
    let whole = field(2)?;
    let minutes = field(3)?;
    let seconds = field(4)?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(FrameError::RangeValidation {
            field: "sexagesimal",
            value: minutes.max(seconds),
            range: "[0, 60)",
        });
    }
    Ok((negative, whole, minutes, seconds))
}

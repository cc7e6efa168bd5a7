//! Error types for frame construction and conversion
//!
//! All validation happens synchronously, before any state is mutated, and every
//! failure is terminal at the call site.

use thiserror::Error;

/// Main error type for the starframes library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// A value has the wrong kind for its field (non-finite number, unparsable string)
    #[error("Type validation error on `{field}`: {message}")]
    TypeValidation {
        /// Name of the offending field
        field: &'static str,
        /// Description of the expected kind
        message: String,
    },

    /// A value lies outside its documented domain
    #[error("Range validation error on `{field}`: {value} is outside {range}")]
    RangeValidation {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Human readable description of the accepted domain
        range: &'static str,
    },

    /// An unrecognised model name, frame code or center mode
    #[error("Unknown {kind}: `{value}`")]
    UnknownEnum {
        /// What was being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },

    /// A conditionally required field is absent
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// Result type for starframes operations
pub type Result<T> = std::result::Result<T, FrameError>;

/// Reject NaN and infinities
pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FrameError::TypeValidation {
            field,
            message: format!("expected a finite number, got {value}"),
        })
    }
}

/// Check `lo <= value < hi`
pub(crate) fn check_half_open(
    field: &'static str,
    value: f64,
    lo: f64,
    hi: f64,
    range: &'static str,
) -> Result<f64> {
    check_finite(field, value)?;
    if value >= lo && value < hi {
        Ok(value)
    } else {
        Err(FrameError::RangeValidation { field, value, range })
    }
}

/// Check `lo <= value <= hi`
pub(crate) fn check_closed(
    field: &'static str,
    value: f64,
    lo: f64,
    hi: f64,
    range: &'static str,
) -> Result<f64> {
    check_finite(field, value)?;
    if value >= lo && value <= hi {
        Ok(value)
    } else {
        Err(FrameError::RangeValidation { field, value, range })
    }
}

//! Error types for the IEC 60870-5 ASDU codec.
//!
//! Decode errors are always local to the frame being decoded. Encode errors
//! are contract violations by the caller. Neither is fatal to a link.

use std::fmt;

use thiserror::Error;

use crate::types::TimeWidth;

/// Result type alias for link-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing received bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not enough bytes for the declared field width
    #[error("Truncated {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Unknown ASDU type identifier
    #[error("Unsupported type ID: {0}")]
    UnsupportedType(u8),

    /// Field value that the standard marks as not permitted
    #[error("Invalid {field} value: {value:#04X}")]
    InvalidValue { field: &'static str, value: u8 },

    /// Bytes left over after the last information object
    #[error("Trailing data: {0} bytes after last information object")]
    TrailingData(usize),
}

impl DecodeError {
    /// Create a truncation error for `field`.
    #[inline]
    pub fn truncated(field: &'static str, needed: usize, available: usize) -> Self {
        Self::Truncated {
            field,
            needed,
            available,
        }
    }
}

/// Errors raised while serializing ASDUs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Value outside the range its wire field can carry
    #[error("Value out of range for {field}: {value}")]
    ValueOutOfRange { field: &'static str, value: String },

    /// No wire type matches the given value, time tag and quality combination
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Timestamp does not carry the fields the requested width needs
    #[error("Timestamp lacks fields required for {width} encoding")]
    TimePrecision { width: TimeWidth },

    /// More objects than the 7-bit count can express
    #[error("Too many information objects: {0} (max 127)")]
    TooManyObjects(usize),
}

impl EncodeError {
    /// Create a range error for `field`.
    pub fn out_of_range(field: &'static str, value: impl fmt::Display) -> Self {
        Self::ValueOutOfRange {
            field,
            value: value.to_string(),
        }
    }

    /// Create a shape error with a message.
    pub fn unsupported_shape(msg: impl Into<String>) -> Self {
        Self::UnsupportedShape(msg.into())
    }
}

/// Errors reported by a transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport is closed
    #[error("Transport closed")]
    Closed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame rejected by the transport (too long, not ready, ...)
    #[error("Frame rejected: {0}")]
    Rejected(String),
}

/// Crate-level error combining codec and transport failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Encode error
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    /// Check if this error came from the transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this error is a caller contract violation.
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Self::Encode(_))
    }
}

//! Unified error type for the blinklight-lib crate.
//!
//! [`BlinklightError`] wraps the device-layer error (`DeviceError`) and
//! domain-specific error kinds (`Config`, `Color`). `From` impls allow `?`
//! to propagate across module boundaries seamlessly.

use std::fmt;

use crate::device::DeviceError;

/// Unified error type for blinklight-lib operations.
#[derive(Debug)]
pub enum BlinklightError {
    /// Device communication error (discovery, open, color read/write).
    Device(DeviceError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
}

impl fmt::Display for BlinklightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlinklightError::Device(e) => write!(f, "{e}"),
            BlinklightError::Io(e) => write!(f, "I/O error: {e}"),
            BlinklightError::Config(e) => write!(f, "Config error: {e}"),
            BlinklightError::Color(e) => write!(f, "Color error: {e}"),
        }
    }
}

impl std::error::Error for BlinklightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlinklightError::Device(e) => Some(e),
            BlinklightError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for BlinklightError {
    fn from(e: DeviceError) -> Self {
        BlinklightError::Device(e)
    }
}

impl From<std::io::Error> for BlinklightError {
    fn from(e: std::io::Error) -> Self {
        BlinklightError::Io(e)
    }
}

/// Crate-level Result alias using [`BlinklightError`].
pub type Result<T> = std::result::Result<T, BlinklightError>;

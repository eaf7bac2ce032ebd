//! Common error types for driver operations

use core::fmt;

/// Driver operation errors.
///
/// Only configuration can fail. Once a channel is armed the interrupt path
/// has no error reporting at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Logical pin has no output register on this board
    InvalidPin(u8),
    /// Generator played before a pin was bound
    NotConfigured,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "pin {} has no output register", pin),
            Self::NotConfigured => write!(f, "generator not configured"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidPin(pin) => defmt::write!(fmt, "InvalidPin({})", pin),
            Self::NotConfigured => defmt::write!(fmt, "NotConfigured"),
        }
    }
}

/// Result type for driver operations
pub type HalResult<T> = Result<T, HalError>;

//! Error types for power state graph inference.
//!
//! Only malformed input is an error. A segment that matches no existing
//! vertex is the normal insertion path and is reported through
//! `Option`, never through this type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file or parameter errors.
    Config,
    /// Caller supplied a malformed range, signature or spike list.
    Precondition,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Precondition => write!(f, "precondition"),
        }
    }
}

/// Unified error type for graph construction.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(#[from] psg_config::ValidationError),

    // Precondition violations (20-29)
    #[error("empty sample range: begin={begin}, end={end}")]
    EmptyRange { begin: usize, end: usize },

    #[error("sample range end {end} exceeds sample count {len}")]
    RangeOutOfBounds { end: usize, len: usize },

    #[error("no spikes supplied for signature")]
    NoSpikes,

    #[error("signature contains no non-zero readings")]
    EmptySignature,

    #[error("sample period must be positive")]
    InvalidSamplePeriod,
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Precondition violations
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::EmptyRange { .. } => 20,
            Error::RangeOutOfBounds { .. } => 21,
            Error::NoSpikes => 22,
            Error::EmptySignature => 23,
            Error::InvalidSamplePeriod => 24,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,
            Error::EmptyRange { .. }
            | Error::RangeOutOfBounds { .. }
            | Error::NoSpikes
            | Error::EmptySignature
            | Error::InvalidSamplePeriod => ErrorCategory::Precondition,
        }
    }

    /// True when the input for a single call was rejected. A training run
    /// can log these and move on to the next signature.
    pub fn is_precondition(&self) -> bool {
        self.category() == ErrorCategory::Precondition
    }
}

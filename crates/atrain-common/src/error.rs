//! Error types for matchup derivation.
//!
//! Per-footprint numeric failures never surface here: they are carried as
//! sentinel values through the arrays. This type covers the conditions that
//! must stop a run before any computation starts.

use thiserror::Error;

/// Result type alias using MatchupError.
pub type MatchupResult<T> = Result<T, MatchupError>;

/// Primary error type for matchup derivation.
#[derive(Debug, Error)]
pub enum MatchupError {
    // === Configuration Errors ===
    #[error("unsupported resolution: {0} km (supported: 1, 5)")]
    UnsupportedResolution(u32),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported CloudSat product: {0}")]
    UnsupportedProduct(String),

    #[error("no implementation for {product} data at {resolution_km} km resolution")]
    UnimplementedCombination { product: String, resolution_km: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Input Errors ===
    #[error("array '{field}' has length {actual}, expected {expected}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl MatchupError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Whether this error stems from selecting an algorithm variant or
    /// identity that has no implementation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MatchupError::UnsupportedResolution(_)
                | MatchupError::UnsupportedPlatform(_)
                | MatchupError::UnsupportedProduct(_)
                | MatchupError::UnimplementedCombination { .. }
                | MatchupError::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for MatchupError {
    fn from(err: serde_json::Error) -> Self {
        MatchupError::InvalidInput(format!("JSON error: {}", err))
    }
}

//! Error types for the event study model.

use tailwatch_factors::SortError;
use tailwatch_math::MathError;

/// Errors that can occur in the event study model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Factor construction error.
    #[error("factor construction error: {0}")]
    Sort(#[from] SortError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Too few aligned observations to fit.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::Math(MathError::InsufficientData { .. } | MathError::LinearAlgebra(_))
        )
    }
}

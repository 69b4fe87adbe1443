//! Error types for data access.

use tailwatch_traits::{DataKind, ProviderError, StoreError};
use tailwatch_utils::UtilsError;

/// Errors that can occur while loading data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Cache or sink error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Provider error that could not be absorbed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Preparation of loaded data failed.
    #[error("preparation error: {0}")]
    Utils(#[from] UtilsError),

    /// A country-level series the whole country depends on is missing.
    #[error("no {kind} for {country}")]
    MissingBenchmark {
        /// Country code.
        country: String,
        /// Missing series.
        kind: DataKind,
    },

    /// Invalid loader configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DataError {
    /// Returns whether the run can continue past this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_recoverable(),
            Self::Provider(err) => err.is_transient(),
            _ => false,
        }
    }
}

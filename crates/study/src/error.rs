//! Error types for study orchestration.

use tailwatch_data::DataError;
use tailwatch_math::MathError;
use tailwatch_model::ModelError;
use tailwatch_traits::StoreError;
use tailwatch_utils::UtilsError;

/// Errors that can occur while building or running a study.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    /// Data loading error.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Model error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Result sink error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Selection or parameter error.
    #[error("utils error: {0}")]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Configuration could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StudyError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Data(err) => err.is_recoverable(),
            Self::Model(err) => err.is_recoverable(),
            Self::Store(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StudyError::InvalidConfig("no countries".to_string());
        assert_eq!(err.to_string(), "invalid configuration: no countries");
    }

    #[test]
    fn recoverability_follows_the_source() {
        let err = StudyError::from(ModelError::InsufficientData { required: 6, actual: 2 });
        assert!(err.is_recoverable());

        let err = StudyError::from(UtilsError::InvalidSelection("x".to_string()));
        assert!(!err.is_recoverable());
    }
}

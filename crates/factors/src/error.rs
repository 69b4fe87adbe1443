//! Error types for factor construction.

use tailwatch_traits::FactorError;

/// Errors that can occur while building long-short factors.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// Factor definition error.
    #[error("factor error: {0}")]
    Factor(#[from] FactorError),

    /// Math operation error.
    #[error("math error: {0}")]
    Math(#[from] tailwatch_math::MathError),
}

#[cfg(test)]
mod tests {
    use tailwatch_primitives::FactorKind;

    use super::*;

    #[test]
    fn error_display() {
        let err = SortError::from(FactorError::NotSortable(FactorKind::Market));
        assert!(err.to_string().contains("MP"));
    }
}

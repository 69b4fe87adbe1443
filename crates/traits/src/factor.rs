//! Factor sort trait definitions.

use tailwatch_primitives::{Categorizers, FactorKind};

/// Errors that can occur while sorting firms into factor legs.
#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    /// Breakpoints outside `[0, 1]` or not ordered.
    #[error("invalid sort breakpoints: lower {lower}, upper {upper}")]
    InvalidBreakpoints {
        /// Lower breakpoint.
        lower: f64,
        /// Upper breakpoint.
        upper: f64,
    },

    /// Sort requested for a factor that is not built by sorting.
    #[error("factor {0} is not built from a characteristic sort")]
    NotSortable(FactorKind),
}

/// How the sorted universe is split into a low and a high leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortRule {
    /// Low leg strictly below the median, high leg at or above it.
    Median,
    /// Low leg at or below the `lower` quantile, high leg at or above the
    /// `upper` quantile.
    Percentiles {
        /// Lower quantile.
        lower: f64,
        /// Upper quantile.
        upper: f64,
    },
}

impl SortRule {
    /// Check that percentile breakpoints are ordered probabilities.
    ///
    /// # Errors
    /// Returns `FactorError::InvalidBreakpoints` otherwise.
    pub fn validate(&self) -> Result<(), FactorError> {
        match *self {
            Self::Median => Ok(()),
            Self::Percentiles { lower, upper } => {
                if (0.0..=1.0).contains(&lower) && (0.0..=1.0).contains(&upper) && lower <= upper {
                    Ok(())
                } else {
                    Err(FactorError::InvalidBreakpoints { lower, upper })
                }
            }
        }
    }
}

impl std::fmt::Display for SortRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Percentiles { lower, upper } => write!(f, "p{lower}/p{upper}"),
        }
    }
}

/// A long-short factor built by sorting firms on one characteristic.
///
/// The factor return on a date is the mean return of the low leg minus the
/// mean return of the high leg.
pub trait FactorSort: Send + Sync {
    /// Returns the name of the factor.
    fn name(&self) -> &str;

    /// Returns which factor the sort builds.
    fn kind(&self) -> FactorKind;

    /// Returns the breakpoint rule.
    fn rule(&self) -> SortRule;

    /// Sorting characteristic of a firm, if known.
    fn categorizer(&self, categorizers: &Categorizers) -> Option<f64> {
        categorizers.get(self.kind())
    }
}

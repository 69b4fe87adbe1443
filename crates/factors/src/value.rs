//! Value factor (HMS) sort.

use tailwatch_primitives::FactorKind;
use tailwatch_traits::{FactorSort, SortRule};

use crate::BreakpointConfig;

/// Value sort.
///
/// Splits firms on mean book-to-market (book equity over market
/// capitalization); low ratios form the long leg.
#[derive(Debug, Clone, Copy)]
pub struct ValueSort {
    config: BreakpointConfig,
}

impl ValueSort {
    /// Create a new sort with the default 30/70 breakpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BreakpointConfig::default())
    }

    /// Create a new sort with custom breakpoints.
    #[must_use]
    pub const fn with_config(config: BreakpointConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &BreakpointConfig {
        &self.config
    }
}

impl Default for ValueSort {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorSort for ValueSort {
    fn name(&self) -> &str {
        "value"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Hms
    }

    fn rule(&self) -> SortRule {
        SortRule::Percentiles { lower: self.config.lower, upper: self.config.upper }
    }
}

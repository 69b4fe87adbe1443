//! Investment factor (CMA) sort.

use tailwatch_primitives::FactorKind;
use tailwatch_traits::{FactorSort, SortRule};

use crate::BreakpointConfig;

/// Investment sort.
///
/// Splits firms on mean annual growth of total assets.
#[derive(Debug, Clone, Copy)]
pub struct InvestmentSort {
    config: BreakpointConfig,
}

impl InvestmentSort {
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

impl Default for InvestmentSort {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorSort for InvestmentSort {
    fn name(&self) -> &str {
        "investment"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Cma
    }

    fn rule(&self) -> SortRule {
        SortRule::Percentiles { lower: self.config.lower, upper: self.config.upper }
    }
}

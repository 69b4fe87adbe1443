//! Profitability factor (RMW) sort.

use tailwatch_primitives::FactorKind;
use tailwatch_traits::{FactorSort, SortRule};

use crate::BreakpointConfig;

/// Operating profitability sort.
///
/// Splits firms on mean operating profitability, EBIT less interest expense
/// over book equity.
#[derive(Debug, Clone, Copy)]
pub struct ProfitabilitySort {
    config: BreakpointConfig,
}

impl ProfitabilitySort {
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

impl Default for ProfitabilitySort {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorSort for ProfitabilitySort {
    fn name(&self) -> &str {
        "profitability"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Rmw
    }

    fn rule(&self) -> SortRule {
        SortRule::Percentiles { lower: self.config.lower, upper: self.config.upper }
    }
}

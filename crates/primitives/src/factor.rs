//! Factor and return-model definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DateSeries;

/// Return adjustment applied before z-scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReturnModel {
    /// Raw daily total return.
    Raw,
    /// CAPM residual.
    Capm,
    /// Three-factor residual.
    ThreeFactor,
    /// Five-factor residual.
    FiveFactor,
}

impl ReturnModel {
    /// All models in reporting order.
    pub const ALL: [Self; 4] = [Self::Raw, Self::Capm, Self::ThreeFactor, Self::FiveFactor];

    /// Label used for table and sheet names.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Raw => "_ret_zscores",
            Self::Capm => "capm_zscores",
            Self::ThreeFactor => "f3_zscores",
            Self::FiveFactor => "f5_zscores",
        }
    }
}

impl fmt::Display for ReturnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explanatory factor of the factor regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    /// Market premium (market return minus risk-free).
    Market,
    /// Small minus big.
    Smb,
    /// High minus small book-to-market.
    Hms,
    /// Robust minus weak profitability.
    Rmw,
    /// Conservative minus aggressive investment.
    Cma,
}

impl FactorKind {
    /// Regressors of the three-factor model.
    pub const THREE: [Self; 3] = [Self::Market, Self::Smb, Self::Hms];

    /// Regressors of the five-factor model.
    pub const FIVE: [Self; 5] = [Self::Market, Self::Smb, Self::Hms, Self::Rmw, Self::Cma];

    /// Column name of the factor.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Market => "MP",
            Self::Smb => "SMB",
            Self::Hms => "HMS",
            Self::Rmw => "RMW",
            Self::Cma => "CMA",
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The four long-short factor series of one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorSet {
    /// Small minus big.
    pub smb: DateSeries,
    /// High minus small book-to-market.
    pub hms: DateSeries,
    /// Robust minus weak.
    pub rmw: DateSeries,
    /// Conservative minus aggressive.
    pub cma: DateSeries,
}

impl FactorSet {
    /// Series for a constructed factor. The market premium is firm-specific and
    /// therefore not part of the set.
    #[must_use]
    pub const fn get(&self, kind: FactorKind) -> Option<&DateSeries> {
        match kind {
            FactorKind::Market => None,
            FactorKind::Smb => Some(&self.smb),
            FactorKind::Hms => Some(&self.hms),
            FactorKind::Rmw => Some(&self.rmw),
            FactorKind::Cma => Some(&self.cma),
        }
    }

    /// Check whether every factor series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.smb.is_empty() && self.hms.is_empty() && self.rmw.is_empty() && self.cma.is_empty()
    }
}

/// Fitted factor exposures (betas) of a firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorExposures {
    /// Regression intercept (alpha).
    pub intercept: f64,
    /// Loading per regressor, in regression order.
    pub loadings: Vec<(FactorKind, f64)>,
}

impl FactorExposures {
    /// Create new factor exposures.
    #[must_use]
    pub const fn new(intercept: f64, loadings: Vec<(FactorKind, f64)>) -> Self {
        Self { intercept, loadings }
    }

    /// Loading on a specific factor.
    #[must_use]
    pub fn get(&self, kind: FactorKind) -> Option<f64> {
        self.loadings.iter().find(|(k, _)| *k == kind).map(|(_, b)| *b)
    }

    /// Returns the number of regressors, excluding the intercept.
    #[must_use]
    pub const fn n_exposures(&self) -> usize {
        self.loadings.len()
    }
}

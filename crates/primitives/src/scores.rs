//! Fundamentals, ESG records and the sort categorizers derived from them.

use serde::{Deserialize, Serialize};

use crate::{Date, FactorKind};

/// One annual fundamentals observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    /// Report date.
    pub date: Date,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Common book equity.
    pub book_equity: Option<f64>,
    /// Operating profit (EBIT).
    pub ebit: Option<f64>,
    /// Interest expense.
    pub interest_expense: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
}

impl FundamentalsRecord {
    /// Column names of the numeric fields, in declaration order.
    pub const COLUMNS: [&'static str; 5] =
        ["market_cap", "book_equity", "ebit", "interest_expense", "total_assets"];

    /// Numeric fields in [`Self::COLUMNS`] order.
    #[must_use]
    pub const fn values(&self) -> [Option<f64>; 5] {
        [self.market_cap, self.book_equity, self.ebit, self.interest_expense, self.total_assets]
    }

    /// Rebuild a record from a date and values in [`Self::COLUMNS`] order.
    #[must_use]
    pub const fn from_values(date: Date, values: [Option<f64>; 5]) -> Self {
        Self {
            date,
            market_cap: values[0],
            book_equity: values[1],
            ebit: values[2],
            interest_expense: values[3],
            total_assets: values[4],
        }
    }

    /// Whether every field is present and not NaN.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| v.is_some_and(|x| !x.is_nan()))
    }
}

/// One year-end ESG observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgRecord {
    /// Year-end date.
    pub date: Date,
    /// Combined ESG score.
    pub esg_score: Option<f64>,
    /// Environmental pillar score.
    pub environmental_pillar_score: Option<f64>,
    /// Social pillar score.
    pub social_pillar_score: Option<f64>,
    /// Governance pillar score.
    pub governance_pillar_score: Option<f64>,
}

impl EsgRecord {
    /// Column names of the score fields, in declaration order.
    pub const COLUMNS: [&'static str; 4] = [
        "esg_score",
        "environmental_pillar_score",
        "social_pillar_score",
        "governance_pillar_score",
    ];

    /// Score fields in [`Self::COLUMNS`] order.
    #[must_use]
    pub const fn values(&self) -> [Option<f64>; 4] {
        [
            self.esg_score,
            self.environmental_pillar_score,
            self.social_pillar_score,
            self.governance_pillar_score,
        ]
    }

    /// Rebuild a record from a date and scores in [`Self::COLUMNS`] order.
    #[must_use]
    pub const fn from_values(date: Date, values: [Option<f64>; 4]) -> Self {
        Self {
            date,
            esg_score: values[0],
            environmental_pillar_score: values[1],
            social_pillar_score: values[2],
            governance_pillar_score: values[3],
        }
    }
}

/// Scalar characteristics used to sort firms into factor portfolios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Categorizers {
    /// Mean market capitalization.
    pub size: Option<f64>,
    /// Mean book-to-market.
    pub value: Option<f64>,
    /// Mean operating profitability.
    pub profitability: Option<f64>,
    /// Mean total-asset growth.
    pub investment: Option<f64>,
}

impl Categorizers {
    /// Categorizer driving the sort of a constructed factor.
    #[must_use]
    pub const fn get(&self, kind: FactorKind) -> Option<f64> {
        match kind {
            FactorKind::Market => None,
            FactorKind::Smb => self.size,
            FactorKind::Hms => self.value,
            FactorKind::Rmw => self.profitability,
            FactorKind::Cma => self.investment,
        }
    }
}

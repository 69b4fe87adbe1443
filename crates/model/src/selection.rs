//! Groups of firms sharing one set of factors.

use std::{collections::BTreeMap, fmt};

use polars::prelude::DataFrame;
use tailwatch_factors::{FactorBuilder, SortMember};
use tailwatch_primitives::{Date, FactorSet, Ticker};
use tracing::info;

use crate::{EventTestReport, EventTester, Firm, ModelError, ThresholdBank, mean_esg};

/// Firm counts of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Firms in the selection.
    pub n_firms: usize,
    /// Firms with fundamentals and returns.
    pub n_fundamentals: usize,
    /// Firms with ESG data.
    pub n_esg: usize,
}

impl fmt::Display for SelectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} firms, {} with fundamentals, {} with ESG",
            self.n_firms, self.n_fundamentals, self.n_esg
        )
    }
}

/// A named group of firms: one country, one broad industry, or a union.
///
/// Factors are built from the firms with fundamentals and returns, and every
/// such firm is fitted against them, when the selection is constructed.
#[derive(Debug, Clone)]
pub struct Selection {
    name: String,
    firms: BTreeMap<Ticker, Firm>,
    factors: FactorSet,
}

impl Selection {
    /// Build a selection with the default factor breakpoints.
    ///
    /// # Errors
    /// Returns `ModelError` if factor construction fails.
    pub fn new(name: impl Into<String>, firms: impl IntoIterator<Item = Firm>) -> Result<Self, ModelError> {
        Self::with_builder(name, firms, &FactorBuilder::new())
    }

    /// Build a selection with a custom factor builder.
    ///
    /// # Errors
    /// Returns `ModelError` if factor construction fails.
    pub fn with_builder(
        name: impl Into<String>,
        firms: impl IntoIterator<Item = Firm>,
        builder: &FactorBuilder,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let mut firms: BTreeMap<Ticker, Firm> = firms.into_iter().map(|f| (f.ticker().clone(), f)).collect();

        let members: Vec<SortMember<'_>> = firms
            .values()
            .filter_map(|f| {
                Some(SortMember {
                    ticker: f.ticker(),
                    categorizers: f.categorizers()?,
                    returns: f.daily_returns()?,
                })
            })
            .collect();
        let factors = builder.build(&members)?;

        for firm in firms.values_mut() {
            firm.set_factors(&factors);
        }

        let selection = Self { name, firms, factors };
        info!(selection = %selection.name, summary = %selection.summary(), "built selection");
        Ok(selection)
    }

    /// Selection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All firms, keyed by ticker.
    #[must_use]
    pub const fn firms(&self) -> &BTreeMap<Ticker, Firm> {
        &self.firms
    }

    /// A single firm.
    #[must_use]
    pub fn firm(&self, ticker: &Ticker) -> Option<&Firm> {
        self.firms.get(ticker)
    }

    /// Number of firms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.firms.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.firms.is_empty()
    }

    /// The group's factor series.
    #[must_use]
    pub const fn factors(&self) -> &FactorSet {
        &self.factors
    }

    /// Firms with fundamentals and returns; these are the tested firms.
    pub fn fundamentals_firms(&self) -> impl Iterator<Item = &Firm> + '_ {
        self.firms.values().filter(|f| f.is_fittable())
    }

    /// Firms with ESG data.
    pub fn esg_firms(&self) -> impl Iterator<Item = &Firm> + '_ {
        self.firms.values().filter(|f| f.esg().is_some())
    }

    /// Firm counts.
    #[must_use]
    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            n_firms: self.firms.len(),
            n_fundamentals: self.fundamentals_firms().count(),
            n_esg: self.esg_firms().count(),
        }
    }

    /// Run the z-score event test on `dates`.
    #[must_use]
    pub fn test_returns(&self, dates: &[Date], thresholds: &ThresholdBank) -> EventTestReport {
        EventTester::new(thresholds.clone()).run(self.fundamentals_firms(), dates)
    }

    /// Mean ESG scores of the group on each requested year end.
    ///
    /// # Errors
    /// Returns `ModelError` if the aggregation fails.
    pub fn test_esg(&self, year_ends: &[Date]) -> Result<DataFrame, ModelError> {
        mean_esg(self.esg_firms(), year_ends)
    }

    /// Non-zero, non-NaN daily returns of every firm, pooled.
    #[must_use]
    pub fn pooled_returns(&self) -> Vec<f64> {
        self.firms
            .values()
            .filter_map(Firm::daily_returns)
            .flat_map(|r| r.iter().map(|(_, v)| v))
            .filter(|v| *v != 0.0 && !v.is_nan())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tailwatch_primitives::{DateSeries, EsgRecord, FirmData, FirmMeta, FundamentalsRecord, ReturnModel};

    use super::*;

    const DAYS: usize = 80;

    fn day(i: usize) -> Date {
        Date::from_ymd_opt(2022, 2, 1).unwrap().iter_days().nth(i).unwrap()
    }

    fn wave(i: usize, k: usize) -> f64 {
        let phase = (i * (k + 3) + k) % 7;
        0.004 * (phase as f64 - 3.0) + 0.001 * (k as f64 - 5.0) * if i % 2 == 0 { 1.0 } else { -1.0 }
    }

    fn firm(k: usize, with_fundamentals: bool, with_esg: bool) -> Firm {
        let returns: DateSeries = (0..DAYS).map(|i| (day(i), wave(i, k))).collect();
        let rf: DateSeries = (0..DAYS).map(|i| (day(i), 0.0001)).collect();
        let market: DateSeries = (0..DAYS).map(|i| (day(i), 0.003 * ((i % 5) as f64 - 2.0))).collect();

        let mut data = FirmData::new(FirmMeta::simple(Ticker::new(format!("F{k:02}"))), rf, market);
        data.daily_returns = Some(returns);
        if with_fundamentals {
            // Size and value rank firms by k; profitability and growth use
            // other orderings so the four factors differ.
            let s = k as f64 + 1.0;
            let profitability = ((k * 7) % 10 + 1) as f64 / 10.0;
            let growth = ((k * 3) % 10 + 1) as f64 / 100.0;
            data.fundamentals = Some(
                (0..3)
                    .map(|y| {
                        let date = Date::from_ymd_opt(2019 + y, 12, 31).unwrap();
                        let assets = 100.0 * s * (1.0 + growth).powi(y);
                        let ebit = 1.0 + s * s * profitability;
                        FundamentalsRecord::from_values(
                            date,
                            [Some(10.0 * s), Some(s * s), Some(ebit), Some(1.0), Some(assets)],
                        )
                    })
                    .collect(),
            );
        }
        if with_esg {
            let date = Date::from_ymd_opt(2021, 12, 31).unwrap();
            data.esg = Some(vec![EsgRecord::from_values(date, [Some(50.0 + k as f64), None, None, None])]);
        }
        Firm::new(data, 100.0)
    }

    fn selection() -> Selection {
        let mut firms: Vec<Firm> = (0..10).map(|k| firm(k, true, k % 2 == 0)).collect();
        firms.push(firm(10, false, true));
        Selection::new("GB", firms).unwrap()
    }

    #[test]
    fn summary_counts_subsets() {
        let sel = selection();
        let summary = sel.summary();

        assert_eq!(summary, SelectionSummary { n_firms: 11, n_fundamentals: 10, n_esg: 6 });
        assert_eq!(summary.to_string(), "11 firms, 10 with fundamentals, 6 with ESG");
    }

    #[test]
    fn factors_are_built_and_fitted() {
        let sel = selection();
        assert!(!sel.factors().is_empty());
        assert_eq!(sel.factors().smb.len(), DAYS);

        let fitted = sel.firm(&Ticker::new("F03")).unwrap();
        assert!(fitted.exposures(ReturnModel::ThreeFactor).is_some());

        // No fundamentals: kept for ESG, never fitted or tested.
        let outsider = sel.firm(&Ticker::new("F10")).unwrap();
        assert!(outsider.exposures(ReturnModel::ThreeFactor).is_none());
        assert!(sel.fundamentals_firms().all(|f| f.ticker().as_str() != "F10"));
    }

    #[test]
    fn tested_firms_are_the_fundamentals_subset() {
        let sel = selection();
        let report = sel.test_returns(&[day(10)], &ThresholdBank::default());
        let raw = report.report(ReturnModel::Raw).unwrap();

        assert_eq!(raw.observed.rows[0].firms_with_return, 10);
    }

    #[test]
    fn pooled_returns_skip_zeros() {
        let sel = selection();
        let pooled = sel.pooled_returns();
        assert!(pooled.iter().all(|v| *v != 0.0));
        assert!(pooled.len() <= 11 * DAYS);
    }

    #[test]
    fn empty_selection() {
        let sel = Selection::new("EMPTY", Vec::new()).unwrap();
        assert!(sel.is_empty());
        assert!(sel.factors().is_empty());
        assert!(sel.test_returns(&[day(0)], &ThresholdBank::default()).master().is_empty());
    }
}

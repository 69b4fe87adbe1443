//! Long-short portfolio construction.

use std::collections::BTreeMap;

use tailwatch_math::{mean, median, quantile};
use tailwatch_primitives::{Categorizers, Date, DateSeries, FactorKind, FactorSet, Ticker};
use tailwatch_traits::{FactorSort, SortRule};
use tracing::debug;

use crate::{InvestmentSort, ProfitabilitySort, SizeSort, SortError, ValueSort};

/// Configuration for percentile-split factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakpointConfig {
    /// Quantile at or below which a firm joins the low leg.
    pub lower: f64,
    /// Quantile at or above which a firm joins the high leg.
    pub upper: f64,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self { lower: 0.3, upper: 0.7 }
    }
}

/// A firm offered to a sort.
#[derive(Debug, Clone, Copy)]
pub struct SortMember<'a> {
    /// Firm identifier.
    pub ticker: &'a Ticker,
    /// Sorting characteristics.
    pub categorizers: &'a Categorizers,
    /// Daily total return.
    pub returns: &'a DateSeries,
}

/// The two legs of a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortLegs {
    /// Firms in the low leg (the long side).
    pub low: Vec<Ticker>,
    /// Firms in the high leg (the short side).
    pub high: Vec<Ticker>,
}

/// A constructed long-short factor.
#[derive(Debug, Clone, PartialEq)]
pub struct LongShortFactor {
    /// Which factor this is.
    pub kind: FactorKind,
    /// Leg membership.
    pub legs: SortLegs,
    /// Low-leg mean return minus high-leg mean return per date.
    pub series: DateSeries,
}

/// Split firms into the low and high leg of `sort`.
///
/// Firms without a finite characteristic are left out before breakpoints are
/// computed. A firm meeting both leg conditions is kept in the low leg only.
///
/// # Errors
/// Returns `SortError` if the sort rule is invalid.
pub fn split_legs(sort: &dyn FactorSort, members: &[SortMember<'_>]) -> Result<SortLegs, SortError> {
    let rule = sort.rule();
    rule.validate()?;

    let eligible: Vec<(&Ticker, f64)> = members
        .iter()
        .filter_map(|m| sort.categorizer(m.categorizers).filter(|v| v.is_finite()).map(|v| (m.ticker, v)))
        .collect();
    if eligible.is_empty() {
        return Ok(SortLegs::default());
    }
    let values: Vec<f64> = eligible.iter().map(|(_, v)| *v).collect();

    let (in_low, in_high): (Box<dyn Fn(f64) -> bool>, Box<dyn Fn(f64) -> bool>) = match rule {
        SortRule::Median => {
            let cut = median(&values);
            (Box::new(move |v| v < cut), Box::new(move |v| v >= cut))
        }
        SortRule::Percentiles { lower, upper } => {
            let low_cut = quantile(&values, lower)?;
            let high_cut = quantile(&values, upper)?;
            (Box::new(move |v| v <= low_cut), Box::new(move |v| v >= high_cut))
        }
    };

    let mut legs = SortLegs::default();
    for (ticker, v) in eligible {
        if in_low(v) {
            legs.low.push(ticker.clone());
        } else if in_high(v) {
            legs.high.push(ticker.clone());
        }
    }
    Ok(legs)
}

/// Equal-weighted mean return of a set of firms on every date any of them
/// trades.
#[must_use]
pub fn leg_returns<'a>(returns: impl IntoIterator<Item = &'a DateSeries>) -> DateSeries {
    let mut by_date: BTreeMap<Date, Vec<f64>> = BTreeMap::new();
    for series in returns {
        for (date, r) in series.iter() {
            by_date.entry(date).or_default().push(r);
        }
    }

    by_date
        .into_iter()
        .map(|(date, rs)| (date, mean(&rs)))
        .filter(|(_, m)| !m.is_nan())
        .collect()
}

/// Build the long-short factor of `sort` over `members`.
///
/// # Errors
/// Returns `SortError` if the legs cannot be computed.
pub fn build_factor(sort: &dyn FactorSort, members: &[SortMember<'_>]) -> Result<LongShortFactor, SortError> {
    let legs = split_legs(sort, members)?;

    let returns_of = |leg: &[Ticker]| {
        leg_returns(members.iter().filter(|m| leg.contains(m.ticker)).map(|m| m.returns))
    };
    let low = returns_of(&legs.low);
    let high = returns_of(&legs.high);

    let joined = DateSeries::inner_join(&[&low, &high]);
    let series = joined
        .dates
        .iter()
        .zip(joined.column(0).iter().zip(joined.column(1)))
        .map(|(date, (l, h))| (*date, l - h))
        .collect();

    debug!(
        factor = sort.name(),
        rule = %sort.rule(),
        low = legs.low.len(),
        high = legs.high.len(),
        "built long-short factor"
    );

    Ok(LongShortFactor { kind: sort.kind(), legs, series })
}

/// Builds the four sort factors of a group.
#[derive(Debug)]
pub struct FactorBuilder {
    size: SizeSort,
    value: ValueSort,
    profitability: ProfitabilitySort,
    investment: InvestmentSort,
}

impl FactorBuilder {
    /// Create a builder with the default breakpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BreakpointConfig::default())
    }

    /// Create a builder whose percentile sorts use `config`.
    #[must_use]
    pub const fn with_config(config: BreakpointConfig) -> Self {
        Self {
            size: SizeSort::new(),
            value: ValueSort::with_config(config),
            profitability: ProfitabilitySort::with_config(config),
            investment: InvestmentSort::with_config(config),
        }
    }

    /// Build every factor with its leg membership.
    ///
    /// # Errors
    /// Returns `SortError` if a sort fails.
    pub fn build_factors(&self, members: &[SortMember<'_>]) -> Result<Vec<LongShortFactor>, SortError> {
        let sorts: [&dyn FactorSort; 4] = [&self.size, &self.value, &self.profitability, &self.investment];
        sorts.into_iter().map(|sort| build_factor(sort, members)).collect()
    }

    /// Build the factor set broadcast to the firms of a group.
    ///
    /// # Errors
    /// Returns `SortError` if a sort fails.
    pub fn build(&self, members: &[SortMember<'_>]) -> Result<FactorSet, SortError> {
        let mut set = FactorSet::default();
        for factor in self.build_factors(members)? {
            match factor.kind {
                FactorKind::Smb => set.smb = factor.series,
                FactorKind::Hms => set.hms = factor.series,
                FactorKind::Rmw => set.rmw = factor.series,
                FactorKind::Cma => set.cma = factor.series,
                FactorKind::Market => {}
            }
        }
        Ok(set)
    }
}

impl Default for FactorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

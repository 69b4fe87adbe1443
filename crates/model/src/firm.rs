//! Firm model: return statistics, CAPM and factor-model residuals.

use tailwatch_math::{covariance, mean, median, pct_change, sample_std, sample_variance};
use tailwatch_primitives::{
    Categorizers, Date, DateSeries, EsgRecord, FactorExposures, FactorSet, FirmData, FirmMeta,
    FundamentalsRecord, ReturnModel, Ticker,
};
use tailwatch_utils::cumulative_index;
use tracing::{debug, warn};

use crate::{FactorFit, FactorRegression, factor_panel};

/// Minimum number of complete fundamentals rows behind the categorizers.
const MIN_FUNDAMENTALS_ROWS: usize = 2;

/// Summary statistics of a firm's raw daily returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample variance.
    pub variance: f64,
    /// Sample standard deviation.
    pub volatility: f64,
    /// Daily geometric mean gross return.
    pub geometric_mean: f64,
}

/// Everything derived from a firm's daily returns.
#[derive(Debug, Clone)]
pub struct ReturnProfile {
    /// Daily total return.
    pub daily_returns: DateSeries,
    /// Cumulative return index.
    pub return_index: DateSeries,
    /// Stock return minus risk-free rate, on the joined dates.
    pub stock_premiums: DateSeries,
    /// Market return minus risk-free rate, on the joined dates.
    pub market_premiums: DateSeries,
    /// Raw return statistics.
    pub stats: ReturnStats,
    /// CAPM beta, `NaN` when the market premium has no variance.
    pub beta: f64,
    /// `SP - beta * MP`.
    pub capm_residuals: DateSeries,
    /// Three-factor fit, once factors are set.
    pub three_factor: Option<FactorFit>,
    /// Five-factor fit, once factors are set.
    pub five_factor: Option<FactorFit>,
}

impl ReturnProfile {
    fn new(
        ticker: &Ticker,
        returns: DateSeries,
        risk_free: &DateSeries,
        market: &DateSeries,
        index_base: f64,
    ) -> Self {
        let return_index = cumulative_index(&returns, index_base);
        let geometric_mean = return_index.iter().next_back().map_or(f64::NAN, |(_, last)| {
            (last / index_base).powf(1.0 / returns.len() as f64)
        });

        let joined = DateSeries::inner_join(&[&returns, risk_free, market])
            .retain_rows(|row| row.iter().all(|v| !v.is_nan()) && row.iter().any(|v| *v != 0.0));
        // Raw returns live on the joined calendar; the index keeps every input day.
        let daily_returns = joined.series(0);
        let values = daily_returns.values();
        let variance = sample_variance(&values);
        let stats = ReturnStats {
            mean: mean(&values),
            median: median(&values),
            variance,
            volatility: variance.sqrt(),
            geometric_mean,
        };
        let (r, rf, m) = (joined.column(0), joined.column(1), joined.column(2));
        let sp: Vec<f64> = r.iter().zip(rf).map(|(r, rf)| r - rf).collect();
        let mp: Vec<f64> = m.iter().zip(rf).map(|(m, rf)| m - rf).collect();

        let market_variance = sample_variance(&mp);
        let beta = if market_variance > 0.0 {
            covariance(&sp, &mp).map_or(f64::NAN, |cov| cov / market_variance)
        } else {
            warn!(ticker = %ticker, rows = mp.len(), "market premium has no variance, beta undefined");
            f64::NAN
        };

        let stock_premiums: DateSeries = joined.dates.iter().copied().zip(sp.iter().copied()).collect();
        let market_premiums: DateSeries = joined.dates.iter().copied().zip(mp.iter().copied()).collect();
        let capm_residuals = joined
            .dates
            .iter()
            .zip(sp.iter().zip(&mp))
            .map(|(date, (sp, mp))| (*date, sp - beta * mp))
            .collect();

        Self {
            daily_returns,
            return_index,
            stock_premiums,
            market_premiums,
            stats,
            beta,
            capm_residuals,
            three_factor: None,
            five_factor: None,
        }
    }
}

/// Mean of the finite observations, `None` when there is none.
fn finite_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() { None } else { Some(mean(&finite)) }
}

/// Sort characteristics from complete fundamentals rows.
fn derive_categorizers(rows: &[FundamentalsRecord]) -> Categorizers {
    let field = |f: fn(&FundamentalsRecord) -> Option<f64>| -> Vec<f64> {
        rows.iter().map(|r| f(r).unwrap_or(f64::NAN)).collect()
    };
    let market_cap = field(|r| r.market_cap);
    let book_equity = field(|r| r.book_equity);
    let ebit = field(|r| r.ebit);
    let interest = field(|r| r.interest_expense);
    let assets = field(|r| r.total_assets);

    Categorizers {
        size: finite_mean(market_cap.iter().copied()),
        value: finite_mean(book_equity.iter().zip(&market_cap).map(|(be, mc)| be / mc)),
        profitability: finite_mean(
            ebit.iter().zip(&interest).zip(&book_equity).map(|((e, i), be)| (e - i) / be),
        ),
        investment: finite_mean(pct_change(&assets)),
    }
}

/// Z-scores of `series` on the requested dates.
///
/// Mean and sample standard deviation are taken over the whole series.
/// Requested dates the series does not cover are skipped.
#[must_use]
pub fn zscore(series: &DateSeries, dates: &[Date]) -> DateSeries {
    let values = series.values();
    let mu = mean(&values);
    let sigma = sample_std(&values);

    dates
        .iter()
        .filter_map(|date| series.get(date).map(|v| (*date, (v - mu) / sigma)))
        .collect()
}

/// One traded firm.
#[derive(Debug, Clone)]
pub struct Firm {
    meta: FirmMeta,
    broad_industry: Option<String>,
    fundamentals: Option<Vec<FundamentalsRecord>>,
    categorizers: Option<Categorizers>,
    esg: Option<Vec<EsgRecord>>,
    returns: Option<ReturnProfile>,
}

impl Firm {
    /// Build a firm from its loaded inputs.
    ///
    /// `index_base` scales the cumulative return index.
    #[must_use]
    pub fn new(data: FirmData, index_base: f64) -> Self {
        let FirmData { meta, fundamentals, risk_free, market, daily_returns, esg } = data;

        let fundamentals = fundamentals
            .map(|rows| rows.into_iter().filter(FundamentalsRecord::is_complete).collect::<Vec<_>>())
            .filter(|rows| rows.len() >= MIN_FUNDAMENTALS_ROWS);
        let categorizers = fundamentals.as_deref().map(derive_categorizers);

        let returns = daily_returns
            .filter(|r| !r.is_empty())
            .map(|r| ReturnProfile::new(&meta.ticker, r, &risk_free, &market, index_base));

        debug!(
            ticker = %meta.ticker,
            returns = returns.is_some(),
            fundamentals = fundamentals.is_some(),
            esg = esg.is_some(),
            "built firm"
        );

        Self { broad_industry: meta.broad_industry(), meta, fundamentals, categorizers, esg, returns }
    }

    /// Firm identifier.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        &self.meta.ticker
    }

    /// Firm metadata.
    #[must_use]
    pub const fn meta(&self) -> &FirmMeta {
        &self.meta
    }

    /// Normalized broad industry.
    #[must_use]
    pub fn broad_industry(&self) -> Option<&str> {
        self.broad_industry.as_deref()
    }

    /// Complete fundamentals rows, when at least two exist.
    #[must_use]
    pub fn fundamentals(&self) -> Option<&[FundamentalsRecord]> {
        self.fundamentals.as_deref()
    }

    /// Sort characteristics, available with fundamentals.
    #[must_use]
    pub const fn categorizers(&self) -> Option<&Categorizers> {
        self.categorizers.as_ref()
    }

    /// Year-end ESG scores.
    #[must_use]
    pub fn esg(&self) -> Option<&[EsgRecord]> {
        self.esg.as_deref()
    }

    /// Return-derived data, available with daily returns.
    #[must_use]
    pub const fn returns(&self) -> Option<&ReturnProfile> {
        self.returns.as_ref()
    }

    /// Daily total return.
    #[must_use]
    pub fn daily_returns(&self) -> Option<&DateSeries> {
        self.returns.as_ref().map(|r| &r.daily_returns)
    }

    /// CAPM beta.
    #[must_use]
    pub fn beta(&self) -> Option<f64> {
        self.returns.as_ref().map(|r| r.beta)
    }

    /// Whether the firm takes part in factor construction and regression.
    #[must_use]
    pub const fn is_fittable(&self) -> bool {
        self.returns.is_some() && self.categorizers.is_some()
    }

    /// Fitted exposures of a factor model, if any.
    #[must_use]
    pub fn exposures(&self, model: ReturnModel) -> Option<&FactorExposures> {
        let returns = self.returns.as_ref()?;
        let fit = match model {
            ReturnModel::ThreeFactor => returns.three_factor.as_ref(),
            ReturnModel::FiveFactor => returns.five_factor.as_ref(),
            ReturnModel::Raw | ReturnModel::Capm => None,
        };
        fit.map(|f| &f.exposures)
    }

    /// Fit the three- and five-factor models against a group's factors.
    ///
    /// Does nothing for a firm without fundamentals or returns. A fit that
    /// cannot be computed is logged and left unset.
    pub fn set_factors(&mut self, factors: &FactorSet) {
        if self.fundamentals.is_none() {
            return;
        }
        let Some(returns) = self.returns.as_mut() else {
            return;
        };

        let panel = factor_panel(&returns.stock_premiums, &returns.market_premiums, factors);
        let fit = |regression: FactorRegression| match regression.fit(&panel) {
            Ok(fit) => Some(fit),
            Err(err) => {
                warn!(
                    ticker = %self.meta.ticker,
                    factors = regression.regressors().len(),
                    rows = panel.n_rows(),
                    error = %err,
                    "factor fit skipped"
                );
                None
            }
        };

        returns.three_factor = fit(FactorRegression::three_factor());
        returns.five_factor = fit(FactorRegression::five_factor());
    }

    /// Return series tested under `model`.
    ///
    /// Factor models without a fit fall back to the CAPM residual.
    #[must_use]
    pub fn return_series(&self, model: ReturnModel) -> Option<&DateSeries> {
        let returns = self.returns.as_ref()?;
        let fit = match model {
            ReturnModel::Raw => return Some(&returns.daily_returns),
            ReturnModel::Capm => None,
            ReturnModel::ThreeFactor => returns.three_factor.as_ref(),
            ReturnModel::FiveFactor => returns.five_factor.as_ref(),
        };
        Some(fit.map_or(&returns.capm_residuals, |f| &f.residuals))
    }

    /// Z-scores of the `model` series on the requested dates.
    #[must_use]
    pub fn zscores(&self, model: ReturnModel, dates: &[Date]) -> Option<DateSeries> {
        self.return_series(model).map(|s| zscore(s, dates))
    }
}

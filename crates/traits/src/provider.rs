//! Market data provider trait definitions.

use derive_more::Display;
use tailwatch_primitives::{Date, DateSeries, EsgRecord, FirmMeta, FundamentalsRecord, Ticker};

/// Kind of data fetched from a provider or held in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum DataKind {
    /// Daily total return of a stock.
    #[display("daily_stock_data")]
    DailyStock,
    /// Daily risk-free return of a market.
    #[display("daily_risk_free_returns")]
    RiskFree,
    /// Daily market index return.
    #[display("daily_market_returns")]
    Market,
    /// Annual fundamentals.
    #[display("fundamentals")]
    Fundamentals,
    /// Year-end ESG scores.
    #[display("esg_data")]
    Esg,
    /// Firm list metadata.
    #[display("firm_lists")]
    Metadata,
}

/// Errors returned by a market data provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and holds no data for the request.
    #[error("no {kind} available for {ticker}")]
    Unavailable {
        /// Requested instrument.
        ticker: String,
        /// Requested data.
        kind: DataKind,
    },

    /// The request failed in transit and may succeed when retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// Every retry attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: usize,
        /// Message of the last failure.
        last: String,
    },

    /// The request itself was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Build an `Unavailable` outcome.
    #[must_use]
    pub fn unavailable(ticker: impl Into<String>, kind: DataKind) -> Self {
        Self::Unavailable { ticker: ticker.into(), kind }
    }

    /// Returns whether retrying the call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns whether the provider confirmed that no data exists.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result of a provider call.
pub type FetchResult<T> = Result<T, ProviderError>;

/// Synchronous source of market data.
///
/// Returns are decimal fractions (0.01 is one percent).
pub trait MarketDataProvider {
    /// Daily total return of a stock over `[start, end]`.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn total_return(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries>;

    /// Daily overnight risk-free return over `[start, end]`.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn overnight_rate(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries>;

    /// Daily index return over `[start, end]`, derived from index levels.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn index_returns(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries>;

    /// Annual fundamentals of a firm.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn fundamentals(&self, ticker: &Ticker) -> FetchResult<Vec<FundamentalsRecord>>;

    /// Year-end ESG scores of a firm.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn esg(&self, ticker: &Ticker) -> FetchResult<Vec<EsgRecord>>;

    /// Metadata for a list of vendor security codes.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be delivered.
    fn extended_metadata(&self, codes: &[String]) -> FetchResult<Vec<FirmMeta>>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn total_return(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        (**self).total_return(ticker, start, end)
    }

    fn overnight_rate(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        (**self).overnight_rate(ticker, start, end)
    }

    fn index_returns(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        (**self).index_returns(ticker, start, end)
    }

    fn fundamentals(&self, ticker: &Ticker) -> FetchResult<Vec<FundamentalsRecord>> {
        (**self).fundamentals(ticker)
    }

    fn esg(&self, ticker: &Ticker) -> FetchResult<Vec<EsgRecord>> {
        (**self).esg(ticker)
    }

    fn extended_metadata(&self, codes: &[String]) -> FetchResult<Vec<FirmMeta>> {
        (**self).extended_metadata(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_classification() {
        let err = ProviderError::Transport("timeout".to_string());
        assert!(err.is_transient());
        assert!(!err.is_unavailable());

        let err = ProviderError::unavailable("ABC.L", DataKind::Esg);
        assert!(err.is_unavailable());
        assert!(!err.is_transient());

        let err = ProviderError::Exhausted { attempts: 5, last: "timeout".to_string() };
        assert!(!err.is_transient());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::unavailable("ABC.L", DataKind::Fundamentals);
        assert_eq!(err.to_string(), "no fundamentals available for ABC.L");
        assert_eq!(DataKind::DailyStock.to_string(), "daily_stock_data");
    }
}

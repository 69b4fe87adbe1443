//! Cache and result persistence trait definitions.

use polars::prelude::*;
use tailwatch_primitives::{DateSeries, EsgRecord, FirmMeta, FundamentalsRecord, Ticker};

use crate::DataKind;

/// Errors that can occur while reading or writing persisted data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// A persisted file could not be parsed.
    #[error("corrupt file {path}: {reason}")]
    Corrupt {
        /// File path.
        path: String,
        /// Parse failure.
        reason: String,
    },

    /// The configured root directory does not exist.
    #[error("directory does not exist: {0}")]
    MissingRoot(String),

    /// Sheet name too long or otherwise unusable.
    #[error("invalid sheet name {name:?}: {reason}")]
    InvalidSheetName {
        /// Offending name.
        name: String,
        /// Why the name is rejected.
        reason: String,
    },

    /// A workbook was written twice in one run.
    #[error("duplicate output target: {0}")]
    DuplicateTarget(String),
}

impl StoreError {
    /// Returns whether the run can continue past this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Address of a cached series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Kind of data.
    pub kind: DataKind,
    /// Country code.
    pub country: String,
    /// Instrument, absent for country-level series (risk-free, market).
    pub ticker: Option<Ticker>,
}

impl CacheKey {
    /// Key for a per-stock series.
    #[must_use]
    pub fn stock(kind: DataKind, country: impl Into<String>, ticker: Ticker) -> Self {
        Self { kind, country: country.into(), ticker: Some(ticker) }
    }

    /// Key for a country-level series.
    #[must_use]
    pub fn country(kind: DataKind, country: impl Into<String>) -> Self {
        Self { kind, country: country.into(), ticker: None }
    }
}

/// Read-through cache of provider data.
///
/// Reads return `Ok(None)` on a cache miss.
pub trait SeriesStore {
    /// Read a cached daily series.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be read.
    fn read_series(&self, key: &CacheKey) -> Result<Option<DateSeries>, StoreError>;

    /// Write a daily series, replacing any cached copy.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be written.
    fn write_series(&mut self, key: &CacheKey, series: &DateSeries) -> Result<(), StoreError>;

    /// Read cached fundamentals of a firm.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be read.
    fn read_fundamentals(
        &self,
        country: &str,
        ticker: &Ticker,
    ) -> Result<Option<Vec<FundamentalsRecord>>, StoreError>;

    /// Write fundamentals of a firm.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be written.
    fn write_fundamentals(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[FundamentalsRecord],
    ) -> Result<(), StoreError>;

    /// Read cached ESG scores of a firm.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be read.
    fn read_esg(&self, country: &str, ticker: &Ticker) -> Result<Option<Vec<EsgRecord>>, StoreError>;

    /// Write ESG scores of a firm.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be written.
    fn write_esg(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[EsgRecord],
    ) -> Result<(), StoreError>;

    /// Read the firm list of a country.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be read.
    fn read_firm_list(&self, country: &str) -> Result<Option<Vec<FirmMeta>>, StoreError>;

    /// Write the firm list of a country.
    ///
    /// # Errors
    /// Returns `StoreError` if the cache cannot be written.
    fn write_firm_list(&mut self, country: &str, firms: &[FirmMeta]) -> Result<(), StoreError>;

    /// Whether `ticker` is on the no-data list of `kind` for `country`.
    ///
    /// # Errors
    /// Returns `StoreError` if the list cannot be read.
    fn is_marked_empty(&self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<bool, StoreError>;

    /// Add `ticker` to the no-data list of `kind` for `country`.
    ///
    /// # Errors
    /// Returns `StoreError` if the list cannot be written.
    fn mark_empty(&mut self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<(), StoreError>;
}

/// A named table of a workbook.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Table contents.
    pub frame: DataFrame,
}

impl Sheet {
    /// Create a new sheet.
    #[must_use]
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self { name: name.into(), frame }
    }
}

/// Destination of result tables.
pub trait ResultSink {
    /// Persist a workbook made of `sheets` under the logical name `name`.
    ///
    /// # Errors
    /// Returns `StoreError` on invalid sheet names, a duplicate workbook, or
    /// IO failure.
    fn write_workbook(&mut self, name: &str, sheets: &mut [Sheet]) -> Result<(), StoreError>;
}

//! File-backed market data provider.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tailwatch_primitives::{Date, DateSeries, EsgRecord, FirmMeta, FundamentalsRecord, Ticker};
use tailwatch_traits::{DataKind, FetchResult, MarketDataProvider, ProviderError, StoreError};
use tailwatch_utils::returns_from_levels;
use tracing::debug;

use crate::csv_io::{self, SeriesRow};

/// Reads vendor export files laid out under a root directory.
///
/// Total returns are stored in percent; calendar days without a value inside
/// the covered span are zero returns. Overnight rates are daily decimal
/// returns. Index files hold levels, converted to returns on read.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    const TOTAL_RETURN_DIR: &'static str = "total_return";
    const OVERNIGHT_RATE_DIR: &'static str = "overnight_rate";
    const INDEX_LEVELS_DIR: &'static str = "index_levels";
    const FUNDAMENTALS_DIR: &'static str = "fundamentals";
    const ESG_DIR: &'static str = "esg";
    const METADATA_FILE: &'static str = "metadata.csv";

    /// Open a provider over `root`.
    ///
    /// # Errors
    /// Returns `StoreError::MissingRoot` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::MissingRoot(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ticker_path(&self, dir: &str, ticker: &Ticker) -> PathBuf {
        self.root.join(dir).join(csv_io::file_name(ticker))
    }

    fn read<T: DeserializeOwned>(&self, path: &Path, ticker: &Ticker, kind: DataKind) -> FetchResult<Vec<T>> {
        if !path.is_file() {
            debug!(%ticker, %kind, path = %path.display(), "no vendor file");
            return Err(ProviderError::unavailable(ticker.as_str(), kind));
        }
        csv_io::read_rows(path).map_err(|err| {
            if err.is_io_error() {
                ProviderError::Transport(err.to_string())
            } else {
                ProviderError::InvalidRequest(format!("malformed {}: {err}", path.display()))
            }
        })
    }

    fn read_series_rows(&self, dir: &str, ticker: &Ticker, kind: DataKind) -> FetchResult<Vec<SeriesRow>> {
        self.read(&self.ticker_path(dir, ticker), ticker, kind)
    }
}

impl MarketDataProvider for FileProvider {
    fn total_return(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        let rows = self.read_series_rows(Self::TOTAL_RETURN_DIR, ticker, DataKind::DailyStock)?;
        let reported: DateSeries =
            rows.into_iter().filter_map(|r| Some((r.date, r.value? / 100.0))).collect();

        let (Some(first), Some(last)) = (reported.first_date(), reported.last_date()) else {
            return Ok(DateSeries::new());
        };
        let (from, to) = (start.max(first), end.min(last));
        if from > to {
            return Ok(DateSeries::new());
        }
        Ok(from
            .iter_days()
            .take_while(|d| *d <= to)
            .map(|d| (d, reported.get(&d).filter(|v| !v.is_nan()).unwrap_or(0.0)))
            .collect())
    }

    fn overnight_rate(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        let rows = self.read_series_rows(Self::OVERNIGHT_RATE_DIR, ticker, DataKind::RiskFree)?;
        let rates: DateSeries = rows.into_iter().filter_map(|r| Some((r.date, r.value?))).collect();
        Ok(rates.drop_nan().clip(start, end))
    }

    fn index_returns(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        let rows = self.read_series_rows(Self::INDEX_LEVELS_DIR, ticker, DataKind::Market)?;
        let levels: DateSeries =
            rows.into_iter().map(|r| (r.date, r.value.unwrap_or(f64::NAN))).collect();
        Ok(returns_from_levels(&levels.truncate_after(end)).clip(start, end))
    }

    fn fundamentals(&self, ticker: &Ticker) -> FetchResult<Vec<FundamentalsRecord>> {
        self.read(&self.ticker_path(Self::FUNDAMENTALS_DIR, ticker), ticker, DataKind::Fundamentals)
    }

    fn esg(&self, ticker: &Ticker) -> FetchResult<Vec<EsgRecord>> {
        self.read(&self.ticker_path(Self::ESG_DIR, ticker), ticker, DataKind::Esg)
    }

    fn extended_metadata(&self, codes: &[String]) -> FetchResult<Vec<FirmMeta>> {
        let path = self.root.join(Self::METADATA_FILE);
        let firms: Vec<FirmMeta> = self.read(&path, &Ticker::new(Self::METADATA_FILE), DataKind::Metadata)?;
        Ok(firms
            .into_iter()
            .filter(|f| f.code.as_ref().is_some_and(|c| codes.contains(c)))
            .collect())
    }
}

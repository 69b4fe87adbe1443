//! Read-through caches of provider data.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use tailwatch_primitives::{DateSeries, EsgRecord, FirmMeta, FundamentalsRecord, Ticker};
use tailwatch_traits::{CacheKey, DataKind, SeriesStore, StoreError};
use tracing::debug;

use crate::csv_io;

/// Cache of `;`-separated CSV files under a root directory.
///
/// ```text
/// daily_stock_data/<country>/<ticker>.csv
/// daily_risk_free_returns/<country>.csv
/// daily_market_returns/<country>.csv
/// fundamentals/<country>/<ticker>.csv
/// fundamentals/<country>/_no_fundamentals_list.txt
/// esg_data/<country>/<ticker>.csv
/// esg_data/<country>/_no_data_list.txt
/// firm_lists/<country>.csv
/// ```
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    /// Open the cache rooted at `root`.
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

    fn series_path(&self, key: &CacheKey) -> PathBuf {
        let dir = self.root.join(key.kind.to_string());
        match &key.ticker {
            Some(ticker) => dir.join(&key.country).join(csv_io::file_name(ticker)),
            None => dir.join(format!("{}.csv", key.country)),
        }
    }

    fn ticker_path(&self, kind: DataKind, country: &str, ticker: &Ticker) -> PathBuf {
        self.root.join(kind.to_string()).join(country).join(csv_io::file_name(ticker))
    }

    fn sentinel_path(&self, kind: DataKind, country: &str) -> PathBuf {
        let file = match kind {
            DataKind::Fundamentals => "_no_fundamentals_list.txt",
            _ => "_no_data_list.txt",
        };
        self.root.join(kind.to_string()).join(country).join(file)
    }

    fn firm_list_path(&self, country: &str) -> PathBuf {
        self.root.join(DataKind::Metadata.to_string()).join(format!("{country}.csv"))
    }

    fn read_sentinel(&self, kind: DataKind, country: &str) -> Result<BTreeSet<String>, StoreError> {
        let path = self.sentinel_path(kind, country);
        if !path.is_file() {
            return Ok(BTreeSet::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(content.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
    }

    fn read_if_present<T>(
        path: &Path,
        read: impl FnOnce(&Path) -> Result<T, csv::Error>,
    ) -> Result<Option<T>, StoreError> {
        if !path.is_file() {
            return Ok(None);
        }
        read(path).map(Some).map_err(|err| csv_io::store_error(path, err))
    }
}

impl SeriesStore for CsvStore {
    fn read_series(&self, key: &CacheKey) -> Result<Option<DateSeries>, StoreError> {
        Self::read_if_present(&self.series_path(key), csv_io::read_series)
    }

    fn write_series(&mut self, key: &CacheKey, series: &DateSeries) -> Result<(), StoreError> {
        let path = self.series_path(key);
        debug!(path = %path.display(), rows = series.len(), "writing series");
        csv_io::write_series(&path, series).map_err(|err| csv_io::store_error(&path, err))
    }

    fn read_fundamentals(
        &self,
        country: &str,
        ticker: &Ticker,
    ) -> Result<Option<Vec<FundamentalsRecord>>, StoreError> {
        Self::read_if_present(&self.ticker_path(DataKind::Fundamentals, country, ticker), csv_io::read_rows)
    }

    fn write_fundamentals(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[FundamentalsRecord],
    ) -> Result<(), StoreError> {
        let path = self.ticker_path(DataKind::Fundamentals, country, ticker);
        csv_io::write_rows(&path, records).map_err(|err| csv_io::store_error(&path, err))
    }

    fn read_esg(&self, country: &str, ticker: &Ticker) -> Result<Option<Vec<EsgRecord>>, StoreError> {
        Self::read_if_present(&self.ticker_path(DataKind::Esg, country, ticker), csv_io::read_rows)
    }

    fn write_esg(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[EsgRecord],
    ) -> Result<(), StoreError> {
        let path = self.ticker_path(DataKind::Esg, country, ticker);
        csv_io::write_rows(&path, records).map_err(|err| csv_io::store_error(&path, err))
    }

    fn read_firm_list(&self, country: &str) -> Result<Option<Vec<FirmMeta>>, StoreError> {
        Self::read_if_present(&self.firm_list_path(country), csv_io::read_rows)
    }

    fn write_firm_list(&mut self, country: &str, firms: &[FirmMeta]) -> Result<(), StoreError> {
        let path = self.firm_list_path(country);
        csv_io::write_rows(&path, firms).map_err(|err| csv_io::store_error(&path, err))
    }

    fn is_marked_empty(&self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<bool, StoreError> {
        Ok(self.read_sentinel(kind, country)?.contains(ticker.as_str()))
    }

    fn mark_empty(&mut self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<(), StoreError> {
        let mut listed = self.read_sentinel(kind, country)?;
        if !listed.insert(ticker.to_string()) {
            return Ok(());
        }
        let path = self.sentinel_path(kind, country);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = listed.into_iter().collect::<Vec<_>>().join("\n");
        content.push('\n');
        fs::write(&path, content)?;
        debug!(%ticker, %kind, country, "marked as having no data");
        Ok(())
    }
}

/// In-memory [`SeriesStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    series: HashMap<CacheKey, DateSeries>,
    fundamentals: HashMap<(String, Ticker), Vec<FundamentalsRecord>>,
    esg: HashMap<(String, Ticker), Vec<EsgRecord>>,
    firm_lists: HashMap<String, Vec<FirmMeta>>,
    empty: HashSet<(DataKind, String, Ticker)>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl SeriesStore for MemoryStore {
    fn read_series(&self, key: &CacheKey) -> Result<Option<DateSeries>, StoreError> {
        Ok(self.series.get(key).cloned())
    }

    fn write_series(&mut self, key: &CacheKey, series: &DateSeries) -> Result<(), StoreError> {
        self.writes += 1;
        self.series.insert(key.clone(), series.clone());
        Ok(())
    }

    fn read_fundamentals(
        &self,
        country: &str,
        ticker: &Ticker,
    ) -> Result<Option<Vec<FundamentalsRecord>>, StoreError> {
        Ok(self.fundamentals.get(&(country.to_string(), ticker.clone())).cloned())
    }

    fn write_fundamentals(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[FundamentalsRecord],
    ) -> Result<(), StoreError> {
        self.writes += 1;
        self.fundamentals.insert((country.to_string(), ticker.clone()), records.to_vec());
        Ok(())
    }

    fn read_esg(&self, country: &str, ticker: &Ticker) -> Result<Option<Vec<EsgRecord>>, StoreError> {
        Ok(self.esg.get(&(country.to_string(), ticker.clone())).cloned())
    }

    fn write_esg(
        &mut self,
        country: &str,
        ticker: &Ticker,
        records: &[EsgRecord],
    ) -> Result<(), StoreError> {
        self.writes += 1;
        self.esg.insert((country.to_string(), ticker.clone()), records.to_vec());
        Ok(())
    }

    fn read_firm_list(&self, country: &str) -> Result<Option<Vec<FirmMeta>>, StoreError> {
        Ok(self.firm_lists.get(country).cloned())
    }

    fn write_firm_list(&mut self, country: &str, firms: &[FirmMeta]) -> Result<(), StoreError> {
        self.writes += 1;
        self.firm_lists.insert(country.to_string(), firms.to_vec());
        Ok(())
    }

    fn is_marked_empty(&self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<bool, StoreError> {
        Ok(self.empty.contains(&(kind, country.to_string(), ticker.clone())))
    }

    fn mark_empty(&mut self, kind: DataKind, country: &str, ticker: &Ticker) -> Result<(), StoreError> {
        self.writes += 1;
        self.empty.insert((kind, country.to_string(), ticker.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;
    use tailwatch_primitives::Date;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2019, 7, day).unwrap()
    }

    fn series() -> DateSeries {
        DateSeries::from_pairs([(d(1), 0.01), (d(2), f64::NAN), (d(3), -0.02)])
    }

    fn fundamentals() -> Vec<FundamentalsRecord> {
        vec![
            FundamentalsRecord::from_values(d(31), [Some(1e9), Some(5e8), None, Some(1e6), Some(2e9)]),
        ]
    }

    #[test]
    fn open_requires_root() {
        assert!(matches!(CsvStore::open("/no/such/cache"), Err(StoreError::MissingRoot(_))));
    }

    #[test]
    fn csv_paths_follow_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(dir.path()).unwrap();

        let stock = CacheKey::stock(DataKind::DailyStock, "BE", Ticker::new("SOLB.BR"));
        let rf = CacheKey::country(DataKind::RiskFree, "BE");
        store.write_series(&stock, &series()).unwrap();
        store.write_series(&rf, &series()).unwrap();
        store.write_fundamentals("BE", &Ticker::new("SOLB.BR"), &fundamentals()).unwrap();
        store.mark_empty(DataKind::Fundamentals, "BE", &Ticker::new("UCB.BR")).unwrap();
        store.mark_empty(DataKind::Esg, "BE", &Ticker::new("UCB.BR")).unwrap();

        for rel in [
            "daily_stock_data/BE/SOLB.BR.csv",
            "daily_risk_free_returns/BE.csv",
            "fundamentals/BE/SOLB.BR.csv",
            "fundamentals/BE/_no_fundamentals_list.txt",
            "esg_data/BE/_no_data_list.txt",
        ] {
            assert!(dir.path().join(rel).is_file(), "{rel} missing");
        }
    }

    #[test]
    fn csv_store_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(dir.path()).unwrap();
        let key = CacheKey::stock(DataKind::DailyStock, "GB", Ticker::new("VOD.L"));

        assert!(store.read_series(&key).unwrap().is_none());
        store.write_series(&key, &series()).unwrap();
        let back = store.read_series(&key).unwrap().unwrap();
        assert_eq!(back.len(), 3);
        assert!(back.get(&d(2)).unwrap().is_nan());
        assert_relative_eq!(back.get(&d(3)).unwrap(), -0.02);

        let ticker = Ticker::new("VOD.L");
        store.write_fundamentals("GB", &ticker, &fundamentals()).unwrap();
        assert_eq!(store.read_fundamentals("GB", &ticker).unwrap().unwrap(), fundamentals());
        assert!(store.read_esg("GB", &ticker).unwrap().is_none());

        let mut meta = FirmMeta::simple(ticker.clone()).with_industry("Telecommunications");
        meta.dead_date = Some(d(15));
        store.write_firm_list("GB", std::slice::from_ref(&meta)).unwrap();
        assert_eq!(store.read_firm_list("GB").unwrap().unwrap(), vec![meta]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        let path = dir.path().join("daily_market_returns/ES.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "date;value\n2019-07-01;abc\n").unwrap();

        let err = store.read_series(&CacheKey::country(DataKind::Market, "ES")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[rstest]
    #[case::fundamentals(DataKind::Fundamentals)]
    #[case::esg(DataKind::Esg)]
    fn sentinels_accumulate(#[case] kind: DataKind) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(dir.path()).unwrap();
        let (a, b) = (Ticker::new("A.MC"), Ticker::new("B.MC"));

        assert!(!store.is_marked_empty(kind, "ES", &a).unwrap());
        store.mark_empty(kind, "ES", &a).unwrap();
        store.mark_empty(kind, "ES", &b).unwrap();
        store.mark_empty(kind, "ES", &a).unwrap();

        assert!(store.is_marked_empty(kind, "ES", &a).unwrap());
        assert!(store.is_marked_empty(kind, "ES", &b).unwrap());
        assert!(!store.is_marked_empty(kind, "GB", &a).unwrap());

        let content = fs::read_to_string(store.sentinel_path(kind, "ES")).unwrap();
        assert_eq!(content, "A.MC\nB.MC\n");
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        let key = CacheKey::country(DataKind::Market, "GB");

        assert!(store.read_series(&key).unwrap().is_none());
        store.write_series(&key, &series()).unwrap();
        store.mark_empty(DataKind::Esg, "GB", &Ticker::new("X.L")).unwrap();

        assert_eq!(store.writes(), 2);
        assert_eq!(store.read_series(&key).unwrap().unwrap().len(), 3);
        assert!(store.is_marked_empty(DataKind::Esg, "GB", &Ticker::new("X.L")).unwrap());
    }
}

//! Per-run memoization of loaded data.

use std::collections::HashMap;

use tailwatch_primitives::{Date, DateSeries, FirmData, Ticker};
use tailwatch_traits::DataKind;
use tailwatch_utils::MinObservations;
use tracing::debug;

/// Address of a country-level series prepared for one interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Risk-free or market.
    pub kind: DataKind,
    /// Country code.
    pub country: String,
    /// First day of the interval.
    pub start: Date,
    /// Last day of the interval.
    pub end: Date,
    index_base: u64,
}

impl SeriesKey {
    /// Create a key.
    #[must_use]
    pub fn new(kind: DataKind, country: impl Into<String>, start: Date, end: Date, index_base: f64) -> Self {
        Self { kind, country: country.into(), start, end, index_base: index_base.to_bits() }
    }

    /// Base of the cumulative return index.
    #[must_use]
    pub const fn index_base(&self) -> f64 {
        f64::from_bits(self.index_base)
    }
}

/// Parameters a firm is loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FirmQuery {
    /// First day of the return interval.
    pub start: Date,
    /// Last day of the return interval.
    pub end: Date,
    /// First ESG year.
    pub esg_first_year: i32,
    /// Last ESG year.
    pub esg_last_year: i32,
    min_observations: u64,
    min_is_fraction: bool,
}

impl FirmQuery {
    /// Create a query.
    #[must_use]
    pub fn new(start: Date, end: Date, esg_years: (i32, i32), min_observations: MinObservations) -> Self {
        let (value, min_is_fraction) = match min_observations {
            MinObservations::Count(n) => (n as u64, false),
            MinObservations::Fraction(f) => (f.to_bits(), true),
        };
        Self {
            start,
            end,
            esg_first_year: esg_years.0,
            esg_last_year: esg_years.1,
            min_observations: value,
            min_is_fraction,
        }
    }

    /// Minimum active return days.
    #[must_use]
    pub fn min_observations(&self) -> MinObservations {
        if self.min_is_fraction {
            MinObservations::Fraction(f64::from_bits(self.min_observations))
        } else {
            MinObservations::Count(self.min_observations as usize)
        }
    }
}

/// Address of a loaded firm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirmKey {
    /// Country code.
    pub country: String,
    /// Instrument code.
    pub ticker: Ticker,
    /// Load parameters.
    pub query: FirmQuery,
}

impl FirmKey {
    /// Create a key.
    #[must_use]
    pub fn new(country: impl Into<String>, ticker: Ticker, query: FirmQuery) -> Self {
        Self { country: country.into(), ticker, query }
    }
}

/// Memo of everything loaded during one run.
///
/// A firm that had to be skipped is remembered as `None` so it is not
/// fetched again.
#[derive(Debug, Clone, Default)]
pub struct RunCache {
    series: HashMap<SeriesKey, DateSeries>,
    firms: HashMap<FirmKey, Option<FirmData>>,
    hits: usize,
    misses: usize,
}

impl RunCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached series for `key`, computing it on the first request.
    ///
    /// # Errors
    /// Returns the error of `load`; nothing is cached in that case.
    pub fn series_or_load<E>(
        &mut self,
        key: SeriesKey,
        load: impl FnOnce(&SeriesKey) -> Result<DateSeries, E>,
    ) -> Result<DateSeries, E> {
        if let Some(series) = self.series.get(&key) {
            self.hits += 1;
            return Ok(series.clone());
        }
        self.misses += 1;
        let series = load(&key)?;
        debug!(kind = %key.kind, country = %key.country, rows = series.len(), "memoized series");
        self.series.insert(key, series.clone());
        Ok(series)
    }

    /// Cached firm for `key`, loading it on the first request.
    ///
    /// # Errors
    /// Returns the error of `load`; nothing is cached in that case.
    pub fn firm_or_load<E>(
        &mut self,
        key: FirmKey,
        load: impl FnOnce(&FirmKey) -> Result<Option<FirmData>, E>,
    ) -> Result<Option<FirmData>, E> {
        if let Some(firm) = self.firms.get(&key) {
            self.hits += 1;
            return Ok(firm.clone());
        }
        self.misses += 1;
        let firm = load(&key)?;
        self.firms.insert(key, firm.clone());
        Ok(firm)
    }

    /// Requests served from memory.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Requests that had to load.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Number of memoized firms, skipped ones included.
    #[must_use]
    pub fn n_firms(&self) -> usize {
        self.firms.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.series.clear();
        self.firms.clear();
    }
}

#[cfg(test)]
mod tests {
    use tailwatch_primitives::FirmMeta;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2020, 5, day).unwrap()
    }

    fn query(min: MinObservations) -> FirmQuery {
        FirmQuery::new(d(1), d(31), (2010, 2020), min)
    }

    #[test]
    fn series_loads_once_per_key() {
        let mut cache = RunCache::new();
        let key = SeriesKey::new(DataKind::RiskFree, "GB", d(1), d(31), 100.0);
        let mut loads = 0;

        for _ in 0..3 {
            let series = cache
                .series_or_load(key.clone(), |_| {
                    loads += 1;
                    Ok::<_, String>(DateSeries::from_pairs([(d(1), 0.01)]))
                })
                .unwrap();
            assert_eq!(series.len(), 1);
        }
        assert_eq!(loads, 1);
        assert_eq!((cache.hits(), cache.misses()), (2, 1));

        let other_base = SeriesKey::new(DataKind::RiskFree, "GB", d(1), d(31), 1.0);
        assert_ne!(key, other_base);
        assert_eq!(other_base.index_base(), 1.0);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let mut cache = RunCache::new();
        let key = SeriesKey::new(DataKind::Market, "ES", d(1), d(2), 100.0);

        assert!(cache.series_or_load(key.clone(), |_| Err("down")).is_err());
        let series = cache.series_or_load(key, |_| Ok::<_, &str>(DateSeries::new())).unwrap();
        assert!(series.is_empty());
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn firm_keys_include_the_query() {
        let mut cache = RunCache::new();
        let ticker = Ticker::new("SAN.MC");
        let by_count = FirmKey::new("ES", ticker.clone(), query(MinObservations::Count(10)));
        let by_fraction = FirmKey::new("ES", ticker.clone(), query(MinObservations::Fraction(0.1)));

        let load = |key: &FirmKey| {
            Ok::<_, String>(Some(FirmData::new(
                FirmMeta::simple(key.ticker.clone()),
                DateSeries::new(),
                DateSeries::new(),
            )))
        };
        cache.firm_or_load(by_count.clone(), load).unwrap();
        cache.firm_or_load(by_fraction.clone(), load).unwrap();
        cache.firm_or_load(by_count, load).unwrap();

        assert_eq!(cache.n_firms(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(by_fraction.query.min_observations(), MinObservations::Fraction(0.1));
    }

    #[test]
    fn skipped_firms_are_remembered() {
        let mut cache = RunCache::new();
        let key = FirmKey::new("GB", Ticker::new("GONE.L"), query(MinObservations::default()));

        assert!(cache.firm_or_load(key.clone(), |_| Ok::<_, String>(None)).unwrap().is_none());
        let again = cache.firm_or_load(key, |_| -> Result<_, String> { panic!("reloaded") }).unwrap();
        assert!(again.is_none());

        cache.clear();
        assert_eq!(cache.n_firms(), 0);
    }
}

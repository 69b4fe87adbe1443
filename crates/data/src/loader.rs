//! Assembly of firm inputs from a provider and a cache.

use std::collections::BTreeSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tailwatch_primitives::{Date, DateSeries, EsgRecord, FirmData, FirmMeta, FundamentalsRecord, Ticker};
use tailwatch_traits::{CacheKey, DataKind, FetchResult, MarketDataProvider, SeriesStore, StoreError};
use tailwatch_utils::{align_esg_to_year_ends, forward_fill_fundamentals, trim_trailing_zeros, year_end};
use tracing::{debug, info, warn};

use crate::{DataError, FirmKey, FirmQuery, RunCache, SeriesKey};

/// Benchmarks and security codes of one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMarket {
    /// Country code, also the cache partition.
    pub code: String,
    /// Overnight rate used as the risk-free return.
    pub risk_free: Ticker,
    /// Total-return market index.
    pub market: Ticker,
    /// Vendor security codes of the firm universe, used when no firm list
    /// is cached.
    #[serde(default)]
    pub codes: Vec<String>,
}

impl CountryMarket {
    /// Create a country with no security codes.
    #[must_use]
    pub fn new(code: impl Into<String>, risk_free: impl Into<Ticker>, market: impl Into<Ticker>) -> Self {
        Self { code: code.into(), risk_free: risk_free.into(), market: market.into(), codes: Vec::new() }
    }

    /// Attach the security codes of the firm universe.
    #[must_use]
    pub fn with_codes(mut self, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Built-in benchmarks for Belgium, Spain and Great Britain.
    #[must_use]
    pub fn builtin(code: &str) -> Option<Self> {
        match code {
            "BE" => Some(Self::new("BE", "EURIBORSWD=", ".BFXI")),
            "ES" => Some(Self::new("ES", "EURIBORSWD=", ".IBEXTR")),
            "GB" => Some(Self::new("GB", "SONIAOSR=", ".TRIUKX")),
            _ => None,
        }
    }
}

/// Cached entries that fail to parse are refetched.
fn recover<T>(result: Result<Option<T>, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "ignoring unreadable cache entry");
            Ok(None)
        }
        other => other,
    }
}

/// Provider data, or `None` when the provider confirmed there is none.
fn available<T>(result: FetchResult<T>) -> Result<Option<T>, DataError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_unavailable() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Serve `key` over `[start, end]` from the store, fetching only what the
/// cached copy does not cover and saving the extended series.
fn read_through<P, S>(
    provider: &P,
    store: &mut S,
    key: &CacheKey,
    start: Date,
    end: Date,
    fetch: impl Fn(&P, Date, Date) -> FetchResult<DateSeries>,
) -> Result<Option<DateSeries>, DataError>
where
    P: MarketDataProvider,
    S: SeriesStore,
{
    let cached = recover(store.read_series(key))?.filter(|s| !s.is_empty());

    let (mut series, mut changed) = match cached {
        Some(series) => (series, false),
        None => match available(fetch(provider, start, end))? {
            Some(series) if !series.is_empty() => (series, true),
            _ => return Ok(None),
        },
    };

    if let Some(before) = series.first_date().and_then(|d| d.pred_opt()).filter(|d| start <= *d) {
        if let Some(head) = available(fetch(provider, start, before))? {
            let n = series.len();
            series.merge_missing(&head);
            changed |= series.len() > n;
        }
    }
    if let Some(after) = series.last_date().and_then(|d| d.succ_opt()).filter(|d| *d <= end) {
        if let Some(tail) = available(fetch(provider, after, end))? {
            let n = series.len();
            series.merge_missing(&tail);
            changed |= series.len() > n;
        }
    }

    if changed {
        store.write_series(key, &series)?;
    }
    let clipped = series.clip(start, end);
    Ok((!clipped.is_empty()).then_some(clipped))
}

/// Whether a firm was still alive after `start`.
///
/// A firm with no known delisting date falls back to the year carried by a
/// delisted instrument code.
fn is_live(meta: &FirmMeta, start: Date, use_dead_list: bool) -> bool {
    if meta.dead_date.is_none() && meta.delisted.is_none() {
        if let (_, Some(year)) = meta.ticker.delisting_suffix() {
            return year_end(year).is_none_or(|d| d > start);
        }
    }
    meta.is_listed_after(start, use_dead_list)
}

/// Loads firm inputs through a read-through store and a per-run memo.
#[derive(Debug)]
pub struct DataLoader<P, S> {
    provider: P,
    store: S,
    cache: RunCache,
    index_base: f64,
    use_dead_list: bool,
}

impl<P: MarketDataProvider, S: SeriesStore> DataLoader<P, S> {
    /// Create a loader with an index base of 100 that honors dead dates.
    #[must_use]
    pub fn new(provider: P, store: S) -> Self {
        Self { provider, store, cache: RunCache::new(), index_base: 100.0, use_dead_list: true }
    }

    /// Set the base of cumulative return indices.
    #[must_use]
    pub fn with_index_base(mut self, index_base: f64) -> Self {
        self.index_base = index_base;
        self
    }

    /// Choose whether firm-list dead dates override delisting dates.
    #[must_use]
    pub fn with_dead_list(mut self, use_dead_list: bool) -> Self {
        self.use_dead_list = use_dead_list;
        self
    }

    /// Base of cumulative return indices.
    #[must_use]
    pub const fn index_base(&self) -> f64 {
        self.index_base
    }

    /// The provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The run memo.
    #[must_use]
    pub const fn cache(&self) -> &RunCache {
        &self.cache
    }

    /// Consume the loader, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn benchmark(
        &mut self,
        market: &CountryMarket,
        kind: DataKind,
        start: Date,
        end: Date,
    ) -> Result<DateSeries, DataError> {
        let Self { provider, store, cache, index_base, .. } = self;
        let key = SeriesKey::new(kind, market.code.clone(), start, end, *index_base);
        let cache_key = CacheKey::country(kind, market.code.clone());

        cache.series_or_load(key, |_| {
            let series = match kind {
                DataKind::RiskFree => read_through(&*provider, store, &cache_key, start, end, |p, s, e| {
                    p.overnight_rate(&market.risk_free, s, e)
                })?,
                _ => read_through(&*provider, store, &cache_key, start, end, |p, s, e| {
                    p.index_returns(&market.market, s, e)
                })?,
            };
            series.ok_or_else(|| DataError::MissingBenchmark { country: market.code.clone(), kind })
        })
    }

    /// Daily risk-free return of `market` over `[start, end]`.
    ///
    /// # Errors
    /// Returns `DataError::MissingBenchmark` if no data exists, or the store
    /// or provider error that stopped the load.
    pub fn risk_free(&mut self, market: &CountryMarket, start: Date, end: Date) -> Result<DateSeries, DataError> {
        self.benchmark(market, DataKind::RiskFree, start, end)
    }

    /// Daily market index return of `market` over `[start, end]`.
    ///
    /// # Errors
    /// Returns `DataError::MissingBenchmark` if no data exists, or the store
    /// or provider error that stopped the load.
    pub fn market_returns(
        &mut self,
        market: &CountryMarket,
        start: Date,
        end: Date,
    ) -> Result<DateSeries, DataError> {
        self.benchmark(market, DataKind::Market, start, end)
    }

    /// Daily total return of a stock over `[start, end]`, `None` without data.
    ///
    /// # Errors
    /// Returns `DataError` on store failures and unusable provider answers.
    pub fn daily_returns(
        &mut self,
        country: &str,
        ticker: &Ticker,
        start: Date,
        end: Date,
    ) -> Result<Option<DateSeries>, DataError> {
        let key = CacheKey::stock(DataKind::DailyStock, country, ticker.clone());
        read_through(&self.provider, &mut self.store, &key, start, end, |p, s, e| p.total_return(ticker, s, e))
    }

    /// Annual fundamentals reported in `[first_year, last_year]`, forward
    /// filled, keeping complete rows. `None` unless two complete rows remain.
    ///
    /// # Errors
    /// Returns `DataError` on store failures and unusable provider answers.
    pub fn fundamentals(
        &mut self,
        country: &str,
        ticker: &Ticker,
        first_year: i32,
        last_year: i32,
    ) -> Result<Option<Vec<FundamentalsRecord>>, DataError> {
        let Some(records) = self.cached_or_fetched(
            DataKind::Fundamentals,
            country,
            ticker,
            |store| store.read_fundamentals(country, ticker),
            |provider| provider.fundamentals(ticker),
            |store, records| store.write_fundamentals(country, ticker, records),
        )?
        else {
            return Ok(None);
        };

        let in_range: Vec<FundamentalsRecord> = records
            .into_iter()
            .filter(|r| (first_year..=last_year).contains(&r.date.year()))
            .collect();
        let complete: Vec<FundamentalsRecord> =
            forward_fill_fundamentals(&in_range)?.into_iter().filter(FundamentalsRecord::is_complete).collect();

        if complete.len() < 2 {
            debug!(%ticker, rows = complete.len(), "not enough fundamentals");
            return Ok(None);
        }
        Ok(Some(complete))
    }

    /// Year-end ESG scores over `[first_year, last_year]`, gap filled.
    ///
    /// # Errors
    /// Returns `DataError` on store failures and unusable provider answers.
    pub fn esg(
        &mut self,
        country: &str,
        ticker: &Ticker,
        first_year: i32,
        last_year: i32,
    ) -> Result<Option<Vec<EsgRecord>>, DataError> {
        let Some(records) = self.cached_or_fetched(
            DataKind::Esg,
            country,
            ticker,
            |store| store.read_esg(country, ticker),
            |provider| provider.esg(ticker),
            |store, records| store.write_esg(country, ticker, records),
        )?
        else {
            return Ok(None);
        };

        let aligned = align_esg_to_year_ends(&records, first_year, last_year)?;
        Ok((!aligned.is_empty()).then_some(aligned))
    }

    /// Per-firm records behind a no-data list: cached copy, else provider
    /// answer saved to the store. An empty or unavailable answer puts the
    /// firm on the list.
    fn cached_or_fetched<T>(
        &mut self,
        kind: DataKind,
        country: &str,
        ticker: &Ticker,
        read: impl FnOnce(&S) -> Result<Option<Vec<T>>, StoreError>,
        fetch: impl FnOnce(&P) -> FetchResult<Vec<T>>,
        write: impl FnOnce(&mut S, &[T]) -> Result<(), StoreError>,
    ) -> Result<Option<Vec<T>>, DataError> {
        if self.store.is_marked_empty(kind, country, ticker)? {
            debug!(%ticker, %kind, "on the no-data list");
            return Ok(None);
        }
        if let Some(records) = recover(read(&self.store))? {
            return Ok(Some(records));
        }

        match available(fetch(&self.provider))? {
            Some(records) if !records.is_empty() => {
                write(&mut self.store, &records)?;
                Ok(Some(records))
            }
            _ => {
                self.store.mark_empty(kind, country, ticker)?;
                Ok(None)
            }
        }
    }

    /// Firms of `market` still alive after `start`.
    ///
    /// The firm list comes from the store; without one, the country's
    /// security codes are expanded through the provider and the list saved.
    ///
    /// # Errors
    /// Returns `DataError::InvalidConfig` if neither a list nor codes exist,
    /// or the store or provider error that stopped the load.
    pub fn firm_universe(&mut self, market: &CountryMarket, start: Date) -> Result<Vec<FirmMeta>, DataError> {
        let firms = match recover(self.store.read_firm_list(&market.code))? {
            Some(firms) => firms,
            None => {
                if market.codes.is_empty() {
                    return Err(DataError::InvalidConfig(format!(
                        "no firm list and no security codes for {}",
                        market.code
                    )));
                }
                let firms = self.provider.extended_metadata(&market.codes)?;
                self.store.write_firm_list(&market.code, &firms)?;
                firms
            }
        };

        let total = firms.len();
        let mut seen = BTreeSet::new();
        let live: Vec<FirmMeta> = firms
            .into_iter()
            .filter(|f| !f.ticker.as_str().is_empty())
            .filter(|f| is_live(f, start, self.use_dead_list))
            .filter(|f| seen.insert(f.ticker.clone()))
            .collect();

        info!(country = %market.code, total, live = live.len(), "firm universe");
        Ok(live)
    }

    /// Inputs of one firm, memoized per run.
    ///
    /// Returns `None` when a provider call for the firm failed for good; the
    /// firm is skipped and nothing is cached for it.
    ///
    /// # Errors
    /// Returns `DataError` when the country benchmarks are missing or the
    /// store fails.
    pub fn load_firm(
        &mut self,
        market: &CountryMarket,
        meta: &FirmMeta,
        query: FirmQuery,
    ) -> Result<Option<FirmData>, DataError> {
        if query.start > query.end {
            return Err(DataError::InvalidConfig(format!(
                "return interval starts after it ends: {} > {}",
                query.start, query.end
            )));
        }
        let risk_free = self.risk_free(market, query.start, query.end)?;
        let market_returns = self.market_returns(market, query.start, query.end)?;

        let key = FirmKey::new(market.code.clone(), meta.ticker.clone(), query);
        let mut cache = std::mem::take(&mut self.cache);
        let firm = cache.firm_or_load(key, |key| {
            match self.assemble(&key.country, meta, key.query, risk_free, market_returns) {
                Ok(data) => Ok(Some(data)),
                Err(DataError::Provider(err)) => {
                    warn!(ticker = %meta.ticker, error = %err, "skipping firm");
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        });
        self.cache = cache;
        firm
    }

    fn assemble(
        &mut self,
        country: &str,
        meta: &FirmMeta,
        query: FirmQuery,
        risk_free: DateSeries,
        market_returns: DateSeries,
    ) -> Result<FirmData, DataError> {
        let ticker = &meta.ticker;
        let (start, end) = (query.start, query.end);

        let fundamentals = self.fundamentals(country, ticker, start.year(), end.year())?;

        let returns = self.daily_returns(country, ticker, start, end)?;
        let active = returns.as_ref().and_then(trim_trailing_zeros);
        let min_observations = query.min_observations();
        let daily_returns = active.filter(|r| min_observations.is_met(r, start, end));
        if returns.is_some() && daily_returns.is_none() {
            debug!(
                %ticker,
                required = min_observations.required(start, end),
                "too few active return days"
            );
        }

        let esg = self.esg(country, ticker, query.esg_first_year, query.esg_last_year)?;

        debug!(
            %ticker,
            fundamentals = fundamentals.is_some(),
            returns = daily_returns.is_some(),
            esg = esg.is_some(),
            "loaded firm"
        );
        let mut data = FirmData::new(meta.clone(), risk_free, market_returns);
        data.fundamentals = fundamentals;
        data.daily_returns = daily_returns;
        data.esg = esg;
        Ok(data)
    }

    /// Inputs of every live firm of `market`, skipped firms left out.
    ///
    /// # Errors
    /// Returns `DataError` on the fatal conditions of [`Self::firm_universe`]
    /// and [`Self::load_firm`].
    pub fn load_country(&mut self, market: &CountryMarket, query: FirmQuery) -> Result<Vec<FirmData>, DataError> {
        let universe = self.firm_universe(market, query.start)?;
        let mut firms = Vec::with_capacity(universe.len());
        for meta in &universe {
            if let Some(data) = self.load_firm(market, meta, query)? {
                firms.push(data);
            }
        }
        info!(
            country = %market.code,
            loaded = firms.len(),
            skipped = universe.len() - firms.len(),
            "loaded country"
        );
        Ok(firms)
    }
}

//! Study configuration.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tailwatch_data::{CountryMarket, DataLoader, FirmQuery, RetryPolicy};
use tailwatch_model::{DEFAULT_THRESHOLDS, ThresholdBank};
use tailwatch_primitives::Date;
use tailwatch_traits::{MarketDataProvider, SeriesStore};
use tailwatch_utils::MinObservations;

use crate::StudyError;

/// A country, either by code of a built-in market or spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountrySpec {
    /// Code of a built-in market (`BE`, `ES`, `GB`).
    Code(String),
    /// Explicit benchmarks.
    Market(CountryMarket),
}

impl CountrySpec {
    /// The market this entry stands for.
    ///
    /// # Errors
    /// Returns `StudyError::InvalidConfig` for an unknown built-in code.
    pub fn resolve(&self) -> Result<CountryMarket, StudyError> {
        match self {
            Self::Code(code) => CountryMarket::builtin(code)
                .ok_or_else(|| StudyError::InvalidConfig(format!("unknown country market {code:?}"))),
            Self::Market(market) => Ok(market.clone()),
        }
    }
}

impl From<CountryMarket> for CountrySpec {
    fn from(market: CountryMarket) -> Self {
        Self::Market(market)
    }
}

/// Parameters of one study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    /// Countries to study, in output order.
    pub countries: Vec<CountrySpec>,
    /// First day of the daily return interval.
    pub return_start: Date,
    /// Last day of the daily return interval.
    pub return_end: Date,
    /// First year of the ESG interval.
    pub esg_first_year: i32,
    /// Last year of the ESG interval.
    pub esg_last_year: i32,
    /// Use the vendor dead date, when known, to filter the firm universe.
    pub use_dead_list: bool,
    /// Smallest broad industry that is tested.
    pub min_num_firms: usize,
    /// Minimum active return days per firm.
    pub min_observations: MinObservations,
    /// Two-sided z thresholds.
    pub thresholds: Vec<f64>,
    /// Base of the cumulative return indices.
    pub index_base: f64,
    /// Provider attempts per call.
    pub retry_attempts: usize,
    /// Pause between provider attempts, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Directory of vendor export files.
    pub data_dir: PathBuf,
    /// Directory of the on-disk cache.
    pub cache_dir: PathBuf,
    /// Directory result workbooks are written to.
    pub output_dir: PathBuf,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            countries: ["BE", "ES", "GB"].map(|c| CountrySpec::Code(c.to_string())).to_vec(),
            return_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            return_end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            esg_first_year: 2005,
            esg_last_year: 2030,
            use_dead_list: true,
            min_num_firms: 5,
            min_observations: MinObservations::default(),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            index_base: 100.0,
            retry_attempts: 5,
            retry_backoff_ms: 500,
            data_dir: PathBuf::from("data"),
            cache_dir: PathBuf::from("cache"),
            output_dir: PathBuf::from("results"),
        }
    }
}

impl StudyConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// default.
    ///
    /// # Errors
    /// Returns `StudyError::Json` for malformed input and
    /// `StudyError::InvalidConfig` when validation fails.
    pub fn from_json(json: &str) -> Result<Self, StudyError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `StudyError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StudyError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Check every rule a run depends on.
    ///
    /// # Errors
    /// Returns `StudyError::InvalidConfig` describing the first violation.
    pub fn validate(&self) -> Result<(), StudyError> {
        self.markets()?;
        if self.return_start > self.return_end {
            return Err(StudyError::InvalidConfig(format!(
                "return interval {}..{} is inverted",
                self.return_start, self.return_end
            )));
        }
        if self.esg_first_year > self.esg_last_year {
            return Err(StudyError::InvalidConfig(format!(
                "ESG interval {}..{} is inverted",
                self.esg_first_year, self.esg_last_year
            )));
        }
        MinObservations::from_value(f64::from(self.min_observations))?;
        self.threshold_bank()?;
        if !self.index_base.is_finite() || self.index_base <= 0.0 {
            return Err(StudyError::InvalidConfig(format!("index base {} must be positive", self.index_base)));
        }
        if self.retry_attempts == 0 {
            return Err(StudyError::InvalidConfig("at least one provider attempt is required".to_string()));
        }
        Ok(())
    }

    /// Resolved country markets.
    ///
    /// # Errors
    /// Returns `StudyError::InvalidConfig` for no countries, an unknown code
    /// or a country listed twice.
    pub fn markets(&self) -> Result<Vec<CountryMarket>, StudyError> {
        if self.countries.is_empty() {
            return Err(StudyError::InvalidConfig("no countries configured".to_string()));
        }
        let markets = self.countries.iter().map(CountrySpec::resolve).collect::<Result<Vec<_>, _>>()?;
        let mut seen = HashSet::new();
        if let Some(dup) = markets.iter().find(|m| !seen.insert(m.code.as_str())) {
            return Err(StudyError::InvalidConfig(format!("country {} listed twice", dup.code)));
        }
        Ok(markets)
    }

    /// Load parameters of every firm.
    #[must_use]
    pub fn query(&self) -> FirmQuery {
        FirmQuery::new(
            self.return_start,
            self.return_end,
            (self.esg_first_year, self.esg_last_year),
            self.min_observations,
        )
    }

    /// The configured thresholds as a bank.
    ///
    /// # Errors
    /// Returns `StudyError::Model` for an empty or non-positive set.
    pub fn threshold_bank(&self) -> Result<ThresholdBank, StudyError> {
        Ok(ThresholdBank::new(self.thresholds.clone())?)
    }

    /// A loader over `provider` and `store` using this run's index base and
    /// dead-list setting.
    #[must_use]
    pub fn loader<P: MarketDataProvider, S: SeriesStore>(&self, provider: P, store: S) -> DataLoader<P, S> {
        DataLoader::new(provider, store).with_index_base(self.index_base).with_dead_list(self.use_dead_list)
    }

    /// Retry policy of provider calls.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }
}

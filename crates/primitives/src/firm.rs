//! Firm identity and raw input definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Date, DateSeries, EsgRecord, FundamentalsRecord};

/// Separator between a sector and its sub-classification in raw industry labels.
const SECTOR_SEPARATOR: char = '/';

/// Separator between industry levels in raw industry labels.
const LEVEL_SEPARATOR: char = '|';

/// Prefix token of catch-all service labels whose second level is the real industry.
const OTHER_SERVICES_PREFIX: &str = "Other Services|";

/// Raw broad-industry names merged into a single normalized name.
const INDUSTRY_REMAP: [(&str, &str); 5] = [
    ("Basic Materials Industry and Construction", "Basic Industry"),
    ("Basic Metals and Chemicals", "Basic Industry"),
    ("Basic Industries", "Basic Industry"),
    ("Finance, Insurance and Real Estate", "Financials"),
    ("Financial Services and Real Estate", "Financials"),
];

/// Instrument code (RIC) of a traded firm.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticker(pub String);

impl Ticker {
    /// Create a new ticker.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a delisted instrument code such as `ABC.L^K19` into its live code
    /// and the delisting year.
    ///
    /// Codes without a `^` suffix are returned unchanged with no year. Two-digit
    /// years above 30 belong to the twentieth century.
    #[must_use]
    pub fn delisting_suffix(&self) -> (Self, Option<i32>) {
        let Some((code, suffix)) = self.0.split_once('^') else {
            return (self.clone(), None);
        };

        let digits: String = suffix.chars().skip(1).collect();
        let year = digits
            .parse::<i32>()
            .ok()
            .filter(|_| digits.len() == 2)
            .map(|yy| if yy > 30 { 1900 + yy } else { 2000 + yy });

        (Self::new(code), year)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Normalize a raw industry classification into its broad industry.
///
/// Keeps the part before the first `/`, unwraps the `Other Services|` prefix,
/// keeps the first `|` level and applies the fixed remap table.
#[must_use]
pub fn broad_industry(raw: &str) -> String {
    let sector = raw.split(SECTOR_SEPARATOR).next().unwrap_or(raw);
    let sector = if sector.starts_with(OTHER_SERVICES_PREFIX) {
        sector.split(LEVEL_SEPARATOR).nth(1).unwrap_or(sector)
    } else {
        sector
    };
    let level = sector.split(LEVEL_SEPARATOR).next().unwrap_or(sector);

    INDUSTRY_REMAP
        .iter()
        .find(|(from, _)| *from == level)
        .map_or_else(|| level.to_string(), |(_, to)| (*to).to_string())
}

/// Descriptive metadata for a firm, as held in firm lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmMeta {
    /// Instrument code.
    pub ticker: Ticker,
    /// Vendor security code.
    pub code: Option<String>,
    /// Company name.
    pub name: Option<String>,
    /// Raw industry classification.
    pub industry: Option<String>,
    /// Fine-grained industry classification.
    pub specific_industry: Option<String>,
    /// Delisting date reported by the metadata source.
    pub delisted: Option<Date>,
    /// Delisting reason reported by the metadata source.
    pub delisting_reason: Option<String>,
    /// Dead date carried by the raw firm list.
    pub dead_date: Option<Date>,
}

impl FirmMeta {
    /// Create metadata holding only a ticker.
    #[must_use]
    pub const fn simple(ticker: Ticker) -> Self {
        Self {
            ticker,
            code: None,
            name: None,
            industry: None,
            specific_industry: None,
            delisted: None,
            delisting_reason: None,
            dead_date: None,
        }
    }

    /// Attach a raw industry classification.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Normalized broad industry, if an industry is known.
    #[must_use]
    pub fn broad_industry(&self) -> Option<String> {
        self.industry.as_deref().map(broad_industry)
    }

    /// Whether the firm was still listed after `date`.
    ///
    /// With `use_dead_list` the raw list's dead date wins when present;
    /// otherwise the metadata delisting date is used.
    #[must_use]
    pub fn is_listed_after(&self, date: Date, use_dead_list: bool) -> bool {
        let end = if use_dead_list { self.dead_date.or(self.delisted) } else { self.delisted };
        end.is_none_or(|d| d > date)
    }
}

/// Everything needed to construct a firm: identity plus its loaded series.
#[derive(Debug, Clone)]
pub struct FirmData {
    /// Firm metadata.
    pub meta: FirmMeta,
    /// Annual fundamentals, when at least two complete rows exist.
    pub fundamentals: Option<Vec<FundamentalsRecord>>,
    /// Daily risk-free return of the firm's market.
    pub risk_free: DateSeries,
    /// Daily market index return of the firm's market.
    pub market: DateSeries,
    /// Daily total return, trimmed of trailing zeros.
    pub daily_returns: Option<DateSeries>,
    /// Year-end ESG scores.
    pub esg: Option<Vec<EsgRecord>>,
}

impl FirmData {
    /// Create inputs for a firm with no loaded series.
    #[must_use]
    pub const fn new(meta: FirmMeta, risk_free: DateSeries, market: DateSeries) -> Self {
        Self { meta, fundamentals: None, risk_free, market, daily_returns: None, esg: None }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Basic Industries/Chemicals", "Basic Industry")]
    #[case("Finance, Insurance and Real Estate|Banks", "Financials")]
    #[case("Financial Services and Real Estate", "Financials")]
    #[case("Other Services|Technology|Software/IT", "Technology")]
    #[case("Utilities|Electric", "Utilities")]
    #[case("Consumer Goods", "Consumer Goods")]
    fn broad_industry_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(broad_industry(raw), expected);
    }

    #[rstest]
    #[case("ABC.L^K19", "ABC.L", Some(2019))]
    #[case("XYZ.MC^A98", "XYZ.MC", Some(1998))]
    #[case("VOD.L", "VOD.L", None)]
    fn delisting_suffix_parse(
        #[case] raw: &str,
        #[case] code: &str,
        #[case] year: Option<i32>,
    ) {
        let (ticker, parsed) = Ticker::from(raw).delisting_suffix();
        assert_eq!(ticker.as_str(), code);
        assert_eq!(parsed, year);
    }

    #[test]
    fn listing_filter_prefers_dead_date() {
        let cutoff = Date::from_ymd_opt(2020, 1, 1).unwrap();
        let mut meta = FirmMeta::simple(Ticker::new("ABC.L"));
        assert!(meta.is_listed_after(cutoff, true));

        meta.delisted = Some(Date::from_ymd_opt(2021, 6, 1).unwrap());
        meta.dead_date = Some(Date::from_ymd_opt(2019, 6, 1).unwrap());
        assert!(!meta.is_listed_after(cutoff, true));
        assert!(meta.is_listed_after(cutoff, false));
    }
}

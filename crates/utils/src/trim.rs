//! Return series preparation.

use serde::{Deserialize, Serialize};
use tailwatch_primitives::{Date, DateSeries};

use crate::UtilsError;

/// Drop the trailing run of zero returns a series carries after a firm
/// stops trading.
///
/// Returns `None` when no non-zero value remains.
#[must_use]
pub fn trim_trailing_zeros(series: &DateSeries) -> Option<DateSeries> {
    let last_active = series.iter().rev().find(|(_, v)| *v != 0.0 && !v.is_nan()).map(|(d, _)| d)?;
    Some(series.truncate_after(last_active))
}

/// Value index of a return series, `base * Π(1 + r)`.
#[must_use]
pub fn cumulative_index(returns: &DateSeries, base: f64) -> DateSeries {
    let mut level = base;
    returns
        .iter()
        .map(|(date, r)| {
            level *= 1.0 + r;
            (date, level)
        })
        .collect()
}

/// Daily returns of a level series.
///
/// Missing levels are forward filled, leading gaps back filled, then the
/// relative change is taken. The first date has no return.
#[must_use]
pub fn returns_from_levels(levels: &DateSeries) -> DateSeries {
    let first_valid = levels.iter().map(|(_, v)| v).find(|v| !v.is_nan());
    let Some(mut previous) = first_valid else {
        return DateSeries::new();
    };

    let mut out = DateSeries::new();
    let mut first = true;
    for (date, level) in levels.iter() {
        let level = if level.is_nan() { previous } else { level };
        if !first {
            out.insert(date, level / previous - 1.0);
        }
        first = false;
        previous = level;
    }
    out
}

/// Minimum number of active return days a firm needs.
///
/// A value strictly between 0 and 1 is a fraction of the calendar days in the
/// return interval; anything else is an absolute count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum MinObservations {
    /// Absolute number of days.
    Count(usize),
    /// Fraction of the interval's calendar days.
    Fraction(f64),
}

impl MinObservations {
    /// Interpret a configured value.
    ///
    /// # Errors
    /// Returns `UtilsError::InvalidParameter` for negative or non-finite values.
    pub fn from_value(value: f64) -> Result<Self, UtilsError> {
        if !value.is_finite() || value < 0.0 {
            return Err(UtilsError::InvalidParameter(format!(
                "minimum observations must be a non-negative number, got {value}"
            )));
        }
        if value > 0.0 && value < 1.0 {
            Ok(Self::Fraction(value))
        } else {
            Ok(Self::Count(value as usize))
        }
    }

    /// Days required over `[start, end]`. A fractional threshold rounds up,
    /// so a firm must reach it, not just its integer part.
    #[must_use]
    pub fn required(&self, start: Date, end: Date) -> usize {
        match *self {
            Self::Count(n) => n,
            Self::Fraction(f) => {
                let days = (end - start).num_days().max(0) as f64;
                (days * f).ceil() as usize
            }
        }
    }

    /// Whether `returns` has enough non-zero days over `[start, end]`.
    #[must_use]
    pub fn is_met(&self, returns: &DateSeries, start: Date, end: Date) -> bool {
        let active = returns.iter().filter(|(_, v)| *v != 0.0 && !v.is_nan()).count();
        active >= self.required(start, end)
    }
}

impl Default for MinObservations {
    fn default() -> Self {
        Self::Fraction(0.1)
    }
}

impl TryFrom<f64> for MinObservations {
    type Error = UtilsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<MinObservations> for f64 {
    fn from(value: MinObservations) -> Self {
        match value {
            MinObservations::Count(n) => n as Self,
            MinObservations::Fraction(f) => f,
        }
    }
}

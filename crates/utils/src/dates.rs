//! Date and year selections.

use std::str::FromStr;

use tailwatch_primitives::Date;

use crate::UtilsError;

/// 31 December of `year`.
#[must_use]
pub fn year_end(year: i32) -> Option<Date> {
    Date::from_ymd_opt(year, 12, 31)
}

/// Calendar dates to test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelection {
    /// An explicit list of dates.
    Dates(Vec<Date>),
    /// Every calendar day of an inclusive range.
    Range {
        /// First day.
        start: Date,
        /// Last day.
        end: Date,
    },
}

impl DateSelection {
    /// Interpret bounds: one date selects that day, two select the inclusive
    /// range between them.
    ///
    /// # Errors
    /// Returns `UtilsError::InvalidSelection` for any other number of bounds or
    /// an inverted range.
    pub fn from_bounds(bounds: &[Date]) -> Result<Self, UtilsError> {
        match *bounds {
            [day] => Ok(Self::Dates(vec![day])),
            [start, end] if start <= end => Ok(Self::Range { start, end }),
            [start, end] => {
                Err(UtilsError::InvalidSelection(format!("range {start}..{end} is inverted")))
            }
            _ => Err(UtilsError::InvalidSelection(format!(
                "expected 1 or 2 date bounds, got {}",
                bounds.len()
            ))),
        }
    }

    /// All selected dates, ascending and without duplicates.
    #[must_use]
    pub fn expand(&self) -> Vec<Date> {
        match self {
            Self::Dates(dates) => {
                let mut dates = dates.clone();
                dates.sort_unstable();
                dates.dedup();
                dates
            }
            Self::Range { start, end } => start.iter_days().take_while(|d| d <= end).collect(),
        }
    }

    /// Earliest and latest selected date.
    #[must_use]
    pub fn span(&self) -> Option<(Date, Date)> {
        let dates = self.expand();
        Some((*dates.first()?, *dates.last()?))
    }
}

impl FromStr for DateSelection {
    type Err = UtilsError;

    /// Parses `2020-03-09..2020-03-20` as a range and `2020-03-09,2020-03-16`
    /// as a list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            Date::parse_from_str(part.trim(), "%Y-%m-%d")
                .map_err(|e| UtilsError::InvalidSelection(format!("{part:?}: {e}")))
        };

        if let Some((start, end)) = s.split_once("..") {
            return Self::from_bounds(&[parse(start)?, parse(end)?]);
        }

        let dates = s.split(',').map(parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Dates(dates))
    }
}

/// ESG years to test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearSelection {
    /// An explicit list of years.
    Years(Vec<i32>),
    /// Every year of an inclusive range.
    Range {
        /// First year.
        start: i32,
        /// Last year.
        end: i32,
    },
}

impl YearSelection {
    /// Interpret bounds: one year selects that year, two select the inclusive
    /// range between them.
    ///
    /// # Errors
    /// Returns `UtilsError::InvalidSelection` for any other number of bounds or
    /// an inverted range.
    pub fn from_bounds(bounds: &[i32]) -> Result<Self, UtilsError> {
        match *bounds {
            [year] => Ok(Self::Years(vec![year])),
            [start, end] if start <= end => Ok(Self::Range { start, end }),
            [start, end] => {
                Err(UtilsError::InvalidSelection(format!("range {start}..{end} is inverted")))
            }
            _ => Err(UtilsError::InvalidSelection(format!(
                "expected 1 or 2 year bounds, got {}",
                bounds.len()
            ))),
        }
    }

    /// All selected years, ascending and without duplicates.
    #[must_use]
    pub fn expand(&self) -> Vec<i32> {
        match self {
            Self::Years(years) => {
                let mut years = years.clone();
                years.sort_unstable();
                years.dedup();
                years
            }
            Self::Range { start, end } => (*start..=*end).collect(),
        }
    }

    /// 31 December of every selected year.
    #[must_use]
    pub fn year_ends(&self) -> Vec<Date> {
        self.expand().into_iter().filter_map(year_end).collect()
    }
}

impl FromStr for YearSelection {
    type Err = UtilsError;

    /// Parses `2015..2022` as a range and `2015,2020` as a list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| UtilsError::InvalidSelection(format!("{part:?}: {e}")))
        };

        if let Some((start, end)) = s.split_once("..") {
            return Self::from_bounds(&[parse(start)?, parse(end)?]);
        }

        let years = s.split(',').map(parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Years(years))
    }
}

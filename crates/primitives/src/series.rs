//! Date-indexed series definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Date;

/// Daily values indexed by calendar date, kept in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSeries {
    points: BTreeMap<Date, f64>,
}

impl DateSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: BTreeMap::new() }
    }

    /// Build a series from `(date, value)` pairs. Later duplicates win.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Date, f64)>) -> Self {
        Self { points: pairs.into_iter().collect() }
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value on a specific date.
    #[must_use]
    pub fn get(&self, date: &Date) -> Option<f64> {
        self.points.get(date).copied()
    }

    /// Insert or replace the value on a date.
    pub fn insert(&mut self, date: Date, value: f64) {
        self.points.insert(date, value);
    }

    /// Earliest date in the series.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.points.keys().next().copied()
    }

    /// Latest date in the series.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.points.keys().next_back().copied()
    }

    /// Iterate over `(date, value)` pairs in date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Iterate over dates in order.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = Date> + '_ {
        self.points.keys().copied()
    }

    /// Values in date order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Restrict to the inclusive window `[start, end]`.
    #[must_use]
    pub fn clip(&self, start: Date, end: Date) -> Self {
        if start > end {
            return Self::new();
        }
        Self { points: self.points.range(start..=end).map(|(d, v)| (*d, *v)).collect() }
    }

    /// Keep only observations on or before `end`.
    #[must_use]
    pub fn truncate_after(&self, end: Date) -> Self {
        Self { points: self.points.range(..=end).map(|(d, v)| (*d, *v)).collect() }
    }

    /// Drop NaN observations.
    #[must_use]
    pub fn drop_nan(&self) -> Self {
        Self { points: self.points.iter().filter(|(_, v)| !v.is_nan()).map(|(d, v)| (*d, *v)).collect() }
    }

    /// Apply `f` to every value.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self { points: self.points.iter().map(|(d, v)| (*d, f(*v))).collect() }
    }

    /// Add observations from `other` on dates this series does not cover.
    pub fn merge_missing(&mut self, other: &Self) {
        for (date, value) in other.iter() {
            self.points.entry(date).or_insert(value);
        }
    }

    /// Align several series on the dates they all share.
    #[must_use]
    pub fn inner_join(series: &[&Self]) -> AlignedSeries {
        let Some((first, rest)) = series.split_first() else {
            return AlignedSeries::default();
        };

        let mut dates = Vec::new();
        let mut columns = vec![Vec::new(); series.len()];

        'dates: for (date, head) in first.iter() {
            let mut row = Vec::with_capacity(rest.len());
            for s in rest {
                match s.get(&date) {
                    Some(v) => row.push(v),
                    None => continue 'dates,
                }
            }
            dates.push(date);
            columns[0].push(head);
            for (j, v) in row.into_iter().enumerate() {
                columns[j + 1].push(v);
            }
        }

        AlignedSeries { dates, columns }
    }
}

impl FromIterator<(Date, f64)> for DateSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Several series aligned row by row on common dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    /// Shared dates in ascending order.
    pub dates: Vec<Date>,
    /// One column per input series, each `dates.len()` long.
    pub columns: Vec<Vec<f64>>,
}

impl AlignedSeries {
    /// Number of aligned rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Check if no rows are aligned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Column `j` as a slice, empty when out of range.
    #[must_use]
    pub fn column(&self, j: usize) -> &[f64] {
        self.columns.get(j).map_or(&[], Vec::as_slice)
    }

    /// Rebuild column `j` as a series.
    #[must_use]
    pub fn series(&self, j: usize) -> DateSeries {
        self.dates.iter().copied().zip(self.column(j).iter().copied()).collect()
    }

    /// Keep only the rows for which `keep` returns true.
    #[must_use]
    pub fn retain_rows(&self, keep: impl Fn(&[f64]) -> bool) -> Self {
        let mut out = Self { dates: Vec::new(), columns: vec![Vec::new(); self.columns.len()] };
        let mut row = Vec::with_capacity(self.columns.len());
        for (i, date) in self.dates.iter().enumerate() {
            row.clear();
            row.extend(self.columns.iter().map(|c| c[i]));
            if keep(&row) {
                out.dates.push(*date);
                for (j, v) in row.iter().enumerate() {
                    out.columns[j].push(*v);
                }
            }
        }
        out
    }
}

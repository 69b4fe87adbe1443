//! Gap filling utilities.

use std::collections::BTreeMap;

use chrono::Datelike;
use polars::prelude::*;
use tailwatch_primitives::{Date, EsgRecord, FundamentalsRecord};

use crate::{UtilsError, year_end};

/// Direction in which missing values are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDirection {
    /// Propagate the last known value forward.
    Forward,
    /// Propagate the next known value backward.
    Backward,
    /// Forward fill, then backward fill what is still missing.
    Both,
}

/// Fill missing values in feature columns.
///
/// Casts to float and fills nulls in the given direction, optionally within
/// each partition.
///
/// # Arguments
/// * `df` - Input LazyFrame
/// * `features` - Column names to fill
/// * `sort_col` - Column to sort by (typically "date")
/// * `over_col` - Column to partition by, if any (typically "ticker")
/// * `direction` - Fill direction
///
/// # Returns
/// LazyFrame with filled features.
pub fn fill_features(
    df: LazyFrame,
    features: &[&str],
    sort_col: &str,
    over_col: Option<&str>,
    direction: FillDirection,
) -> LazyFrame {
    let sort_options = SortMultipleOptions::new().with_maintain_order(true);
    let mut lf = df.sort([sort_col], sort_options);

    for &feat in features {
        let base = col(feat).cast(DataType::Float64);
        let filled = match direction {
            FillDirection::Forward => base.forward_fill(None),
            FillDirection::Backward => base.backward_fill(None),
            FillDirection::Both => base.forward_fill(None).backward_fill(None),
        };
        let filled = match over_col {
            Some(over) => filled.over([col(over)]),
            None => filled,
        };
        lf = lf.with_column(filled.alias(feat));
    }

    lf
}

fn rows_to_frame<const N: usize>(
    rows: &BTreeMap<Date, [Option<f64>; N]>,
    columns: &[&str; N],
) -> PolarsResult<DataFrame> {
    let dates: Vec<Date> = rows.keys().copied().collect();
    let mut frame_columns = vec![Column::new("date".into(), dates)];
    for (j, name) in columns.iter().enumerate() {
        let values: Vec<Option<f64>> =
            rows.values().map(|row| row[j].filter(|v| !v.is_nan())).collect();
        frame_columns.push(Column::new((*name).into(), values));
    }
    DataFrame::new(frame_columns)
}

fn frame_to_rows<const N: usize>(
    df: &DataFrame,
    dates: impl Iterator<Item = Date>,
    columns: &[&str; N],
) -> PolarsResult<Vec<(Date, [Option<f64>; N])>> {
    let mut values = Vec::with_capacity(N);
    for name in columns {
        let filled: Vec<Option<f64>> = df.column(name)?.f64()?.into_iter().collect();
        values.push(filled);
    }

    Ok(dates
        .enumerate()
        .map(|(i, date)| {
            let mut row = [None; N];
            for (j, col_values) in values.iter().enumerate() {
                row[j] = col_values.get(i).copied().flatten();
            }
            (date, row)
        })
        .collect())
}

/// Align a firm's ESG scores to year ends.
///
/// Keeps records dated within `[first_year, last_year]`, adds a 31 December
/// row for every year between the first and last kept record, then forward
/// and backward fills the scores.
///
/// # Errors
/// Returns `UtilsError` if the frame operations fail.
pub fn align_esg_to_year_ends(
    records: &[EsgRecord],
    first_year: i32,
    last_year: i32,
) -> Result<Vec<EsgRecord>, UtilsError> {
    let mut rows: BTreeMap<Date, [Option<f64>; 4]> = records
        .iter()
        .filter(|r| (first_year..=last_year).contains(&r.date.year()))
        .map(|r| (r.date, r.values()))
        .collect();

    let (Some(first), Some(last)) = (rows.keys().next().copied(), rows.keys().next_back().copied())
    else {
        return Ok(Vec::new());
    };
    for year in first.year()..=last.year() {
        if let Some(date) = year_end(year) {
            rows.entry(date).or_insert([None; 4]);
        }
    }

    let df = rows_to_frame(&rows, &EsgRecord::COLUMNS)?;
    let filled =
        fill_features(df.lazy(), &EsgRecord::COLUMNS, "date", None, FillDirection::Both).collect()?;

    Ok(frame_to_rows(&filled, rows.keys().copied(), &EsgRecord::COLUMNS)?
        .into_iter()
        .map(|(date, values)| EsgRecord::from_values(date, values))
        .collect())
}

/// Forward fill gaps in a firm's annual fundamentals, in date order.
///
/// # Errors
/// Returns `UtilsError` if the frame operations fail.
pub fn forward_fill_fundamentals(
    records: &[FundamentalsRecord],
) -> Result<Vec<FundamentalsRecord>, UtilsError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let rows: BTreeMap<Date, [Option<f64>; 5]> = records.iter().map(|r| (r.date, r.values())).collect();
    let df = rows_to_frame(&rows, &FundamentalsRecord::COLUMNS)?;
    let filled = fill_features(
        df.lazy(),
        &FundamentalsRecord::COLUMNS,
        "date",
        None,
        FillDirection::Forward,
    )
    .collect()?;

    Ok(frame_to_rows(&filled, rows.keys().copied(), &FundamentalsRecord::COLUMNS)?
        .into_iter()
        .map(|(date, values)| FundamentalsRecord::from_values(date, values))
        .collect())
}

//! `;`-separated record files shared by the provider and the store.

use std::{fs, path::Path};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tailwatch_primitives::{Date, DateSeries, Ticker};
use tailwatch_traits::StoreError;

/// Field separator of every file the crate reads or writes.
pub(crate) const DELIMITER: u8 = b';';

/// One row of a `date;value` file. Empty values are gaps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct SeriesRow {
    pub(crate) date: Date,
    pub(crate) value: Option<f64>,
}

/// File name holding the data of `ticker`.
pub(crate) fn file_name(ticker: &Ticker) -> String {
    format!("{}.csv", ticker.as_str().replace(['/', '\\'], "_"))
}

/// Read every record of `path`.
pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, csv::Error> {
    let mut reader = ReaderBuilder::new().delimiter(DELIMITER).trim(csv::Trim::All).from_path(path)?;
    reader.deserialize().collect()
}

/// Write `rows` to `path`, creating parent directories.
pub(crate) fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), csv::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().delimiter(DELIMITER).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a `date;value` file, dropping gaps.
pub(crate) fn read_series(path: &Path) -> Result<DateSeries, csv::Error> {
    let rows: Vec<SeriesRow> = read_rows(path)?;
    Ok(rows.into_iter().filter_map(|r| Some((r.date, r.value?))).collect())
}

/// Write a series as a `date;value` file.
pub(crate) fn write_series(path: &Path, series: &DateSeries) -> Result<(), csv::Error> {
    write_rows(path, series.iter().map(|(date, v)| SeriesRow { date, value: Some(v) }))
}

/// Classify a csv failure on `path` as an IO or a corruption error.
pub(crate) fn store_error(path: &Path, err: csv::Error) -> StoreError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => StoreError::Io(io),
        _ => StoreError::Corrupt { path: path.display().to_string(), reason },
    }
}

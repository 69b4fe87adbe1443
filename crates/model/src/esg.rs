//! Cross-sectional ESG aggregation.

use polars::prelude::*;
use tailwatch_primitives::{Date, EsgRecord};

use crate::{Firm, ModelError};

/// Mean of every ESG column per year end across `firms`.
///
/// The result holds one row per requested date, ascending. Dates no firm
/// reports on are null rows.
///
/// # Errors
/// Returns `ModelError::Polars` if the frame operations fail.
pub fn mean_esg<'a>(
    firms: impl IntoIterator<Item = &'a Firm>,
    year_ends: &[Date],
) -> Result<DataFrame, ModelError> {
    let records: Vec<&EsgRecord> = firms.into_iter().filter_map(Firm::esg).flatten().collect();

    let mut columns = vec![Column::new("date".into(), records.iter().map(|r| r.date).collect::<Vec<_>>())];
    for (j, name) in EsgRecord::COLUMNS.iter().enumerate() {
        let values: Vec<Option<f64>> =
            records.iter().map(|r| r.values()[j].filter(|v| !v.is_nan())).collect();
        columns.push(Column::new((*name).into(), values));
    }
    let long = DataFrame::new(columns)?;

    let means = long
        .lazy()
        .group_by([col("date")])
        .agg(EsgRecord::COLUMNS.iter().map(|c| col(*c).mean()).collect::<Vec<_>>());

    let mut dates = year_ends.to_vec();
    dates.sort_unstable();
    dates.dedup();
    let requested = DataFrame::new(vec![Column::new("date".into(), dates)])?;

    let out = requested
        .lazy()
        .join(means, [col("date")], [col("date")], JoinArgs::new(JoinType::Left))
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

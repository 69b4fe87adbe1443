//! Result tables of an event test.

use polars::prelude::*;
use tailwatch_primitives::Ticker;
use tailwatch_traits::Sheet;

use crate::{BreachTable, Comparison, EventTestReport, ExpectedRow, ModelError, ThresholdBank};

/// Label of the row summing every column of an observed table.
const TOTAL_ROW: &str = "Total";

/// Column holding the number of firms with a valid z-score.
const FIRMS_COLUMN: &str = "Firms_with_return";

/// Render sorted firm identifiers as `[A | B | C]`.
#[must_use]
pub fn firms_label(firms: &[Ticker]) -> String {
    let names: Vec<&str> = firms.iter().map(Ticker::as_str).collect();
    format!("[{}]", names.join(" | "))
}

/// Observed breach counts, with a trailing `Total` row.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be built.
pub fn observed_frame(table: &BreachTable) -> PolarsResult<DataFrame> {
    let (firms_total, breach_totals) = table.total();

    // The `Total` label shares the date column, so dates are rendered as
    // ISO strings here; the other tables keep a `Date` column.
    let mut dates: Vec<String> = table.rows.iter().map(|r| r.date.to_string()).collect();
    dates.push(TOTAL_ROW.to_string());
    let mut firms: Vec<u64> = table.rows.iter().map(|r| r.firms_with_return as u64).collect();
    firms.push(firms_total as u64);

    let mut columns = vec![Column::new("date".into(), dates), Column::new(FIRMS_COLUMN.into(), firms)];
    for (j, threshold) in table.thresholds.iter().enumerate() {
        let mut counts: Vec<u64> = table.rows.iter().map(|r| r.breaches[j] as u64).collect();
        counts.push(breach_totals[j] as u64);
        columns.push(Column::new(threshold.to_string().into(), counts));
    }
    DataFrame::new(columns)
}

/// Expected breach counts.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be built.
pub fn expected_frame(rows: &[ExpectedRow], thresholds: &ThresholdBank) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Column::new("date".into(), rows.iter().map(|r| r.date).collect::<Vec<_>>()),
        Column::new(FIRMS_COLUMN.into(), rows.iter().map(|r| r.firms_with_return as u64).collect::<Vec<_>>()),
    ];
    for (j, label) in thresholds.labels().into_iter().enumerate() {
        columns.push(Column::new(label.into(), rows.iter().map(|r| r.expected[j]).collect::<Vec<_>>()));
    }
    DataFrame::new(columns)
}

/// Comparison rows where observed breaches exceeded the expectation.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be built.
pub fn comparison_frame(rows: &[Comparison]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new("date".into(), rows.iter().map(|r| r.date).collect::<Vec<_>>()),
        Column::new("return_type".into(), rows.iter().map(|r| r.model.label()).collect::<Vec<_>>()),
        Column::new("z_score".into(), rows.iter().map(|r| r.threshold).collect::<Vec<_>>()),
        Column::new("exp_amount".into(), rows.iter().map(|r| r.expected).collect::<Vec<_>>()),
        Column::new("real_amount".into(), rows.iter().map(|r| r.observed as u64).collect::<Vec<_>>()),
        Column::new("exp_gt_real".into(), rows.iter().map(|r| r.exp_gt_real).collect::<Vec<_>>()),
        Column::new("firms".into(), rows.iter().map(|r| firms_label(&r.firms)).collect::<Vec<_>>()),
    ])
}

/// Sheets of a group's return-test workbook: the master comparison, then
/// observed, expected and comparison tables per return model.
///
/// # Errors
/// Returns `ModelError::Polars` if a table cannot be built.
pub fn report_sheets(report: &EventTestReport) -> Result<Vec<Sheet>, ModelError> {
    let mut sheets = vec![Sheet::new("master_comp", comparison_frame(&report.master())?)];
    for model_report in &report.reports {
        let label = model_report.model.label();
        sheets.push(Sheet::new(format!("{label}_real"), observed_frame(&model_report.observed)?));
        sheets.push(Sheet::new(
            format!("{label}_exp"),
            expected_frame(&model_report.expected, &report.thresholds)?,
        ));
        sheets.push(Sheet::new(format!("{label}_comp"), comparison_frame(&model_report.comparisons)?));
    }
    Ok(sheets)
}

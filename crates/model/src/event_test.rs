//! Z-score event testing: observed versus expected threshold breaches.

use std::collections::BTreeMap;

use tailwatch_math::expected_breaches;
use tailwatch_primitives::{Date, ReturnModel, Ticker};
use tracing::debug;

use crate::{Firm, ThresholdBank};

/// Observed breaches on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachRow {
    /// Tested date.
    pub date: Date,
    /// Firms with a valid z-score on the date.
    pub firms_with_return: usize,
    /// Number of firms with `|z| > threshold`, one entry per threshold.
    pub breaches: Vec<usize>,
    /// Sorted identifiers behind each breach count.
    pub breaching_firms: Vec<Vec<Ticker>>,
}

/// Observed breach counts of one return model.
#[derive(Debug, Clone, PartialEq)]
pub struct BreachTable {
    /// Return model the z-scores were computed on.
    pub model: ReturnModel,
    /// Thresholds, one per breach column.
    pub thresholds: Vec<f64>,
    /// Rows in ascending date order, only dates with at least one valid z.
    pub rows: Vec<BreachRow>,
}

impl BreachTable {
    /// Column sums: firms with a return, then one total per threshold.
    #[must_use]
    pub fn total(&self) -> (usize, Vec<usize>) {
        let mut breaches = vec![0; self.thresholds.len()];
        let mut firms = 0;
        for row in &self.rows {
            firms += row.firms_with_return;
            for (total, n) in breaches.iter_mut().zip(&row.breaches) {
                *total += n;
            }
        }
        (firms, breaches)
    }
}

/// Expected breaches on one date under normality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedRow {
    /// Tested date.
    pub date: Date,
    /// Firms with a valid z-score on the date.
    pub firms_with_return: usize,
    /// `ceil(firms_with_return * p)`, one entry per threshold.
    pub expected: Vec<u64>,
}

/// A date and threshold where more firms breached than expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Tested date.
    pub date: Date,
    /// Return model.
    pub model: ReturnModel,
    /// Threshold.
    pub threshold: f64,
    /// Expected breaches.
    pub expected: u64,
    /// Observed breaches.
    pub observed: usize,
    /// Always set for reported rows: observed exceeded expected.
    pub exp_gt_real: bool,
    /// Breaching firms, sorted.
    pub firms: Vec<Ticker>,
}

impl Comparison {
    fn sort_key(&self) -> (Date, ReturnModel, f64) {
        (self.date, self.model, self.threshold)
    }
}

/// Observed, expected and comparison tables of one return model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    /// Return model.
    pub model: ReturnModel,
    /// Observed breach counts.
    pub observed: BreachTable,
    /// Expected breach counts.
    pub expected: Vec<ExpectedRow>,
    /// Cells where observed exceeded expected.
    pub comparisons: Vec<Comparison>,
}

/// Result of an event test over every return model.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTestReport {
    /// Thresholds tested.
    pub thresholds: ThresholdBank,
    /// One report per return model, in [`ReturnModel::ALL`] order.
    pub reports: Vec<ModelReport>,
}

impl EventTestReport {
    /// Report of a single model.
    #[must_use]
    pub fn report(&self, model: ReturnModel) -> Option<&ModelReport> {
        self.reports.iter().find(|r| r.model == model)
    }

    /// Comparison rows of every model, sorted by date, model and threshold.
    #[must_use]
    pub fn master(&self) -> Vec<Comparison> {
        let mut rows: Vec<Comparison> =
            self.reports.iter().flat_map(|r| r.comparisons.iter().cloned()).collect();
        rows.sort_by(|a, b| {
            let (da, ma, ta) = a.sort_key();
            let (db, mb, tb) = b.sort_key();
            da.cmp(&db).then(ma.cmp(&mb)).then(ta.total_cmp(&tb))
        });
        rows
    }
}

/// Counts z-score threshold breaches across firms.
#[derive(Debug, Clone, Default)]
pub struct EventTester {
    thresholds: ThresholdBank,
}

impl EventTester {
    /// Create a tester for a threshold bank.
    #[must_use]
    pub const fn new(thresholds: ThresholdBank) -> Self {
        Self { thresholds }
    }

    /// Thresholds tested.
    #[must_use]
    pub const fn thresholds(&self) -> &ThresholdBank {
        &self.thresholds
    }

    /// Test `firms` on `dates` under every return model.
    #[must_use]
    pub fn run<'a>(&self, firms: impl IntoIterator<Item = &'a Firm>, dates: &[Date]) -> EventTestReport {
        let firms: Vec<&Firm> = firms.into_iter().collect();
        let reports = ReturnModel::ALL.into_iter().map(|model| self.run_model(&firms, model, dates)).collect();
        EventTestReport { thresholds: self.thresholds.clone(), reports }
    }

    /// Test `firms` on `dates` under a single return model.
    #[must_use]
    pub fn run_model(&self, firms: &[&Firm], model: ReturnModel, dates: &[Date]) -> ModelReport {
        let observed = self.observed(firms, model, dates);
        let expected = self.expected(&observed);
        let comparisons = self.compare(&observed, &expected);

        debug!(
            model = %model,
            firms = firms.len(),
            dates = observed.rows.len(),
            comparisons = comparisons.len(),
            "event test"
        );

        ModelReport { model, observed, expected, comparisons }
    }

    fn observed(&self, firms: &[&Firm], model: ReturnModel, dates: &[Date]) -> BreachTable {
        let thresholds = self.thresholds.as_slice();
        let mut by_date: BTreeMap<Date, (usize, Vec<Vec<Ticker>>)> = BTreeMap::new();

        for firm in firms {
            let Some(z) = firm.zscores(model, dates) else {
                continue;
            };
            for (date, z) in z.iter().filter(|(_, z)| z.is_finite()) {
                let (count, breaching) =
                    by_date.entry(date).or_insert_with(|| (0, vec![Vec::new(); thresholds.len()]));
                *count += 1;
                for (t, list) in thresholds.iter().zip(breaching.iter_mut()) {
                    if z.abs() > *t {
                        list.push(firm.ticker().clone());
                    }
                }
            }
        }

        let rows = by_date
            .into_iter()
            .map(|(date, (firms_with_return, mut breaching_firms))| {
                breaching_firms.iter_mut().for_each(|f| f.sort());
                BreachRow {
                    date,
                    firms_with_return,
                    breaches: breaching_firms.iter().map(Vec::len).collect(),
                    breaching_firms,
                }
            })
            .collect();

        BreachTable { model, thresholds: thresholds.to_vec(), rows }
    }

    fn expected(&self, observed: &BreachTable) -> Vec<ExpectedRow> {
        observed
            .rows
            .iter()
            .map(|row| ExpectedRow {
                date: row.date,
                firms_with_return: row.firms_with_return,
                expected: self
                    .thresholds
                    .as_slice()
                    .iter()
                    .map(|t| expected_breaches(row.firms_with_return, *t))
                    .collect(),
            })
            .collect()
    }

    fn compare(&self, observed: &BreachTable, expected: &[ExpectedRow]) -> Vec<Comparison> {
        let mut out = Vec::new();
        for (row, exp) in observed.rows.iter().zip(expected) {
            for (i, threshold) in self.thresholds.as_slice().iter().enumerate() {
                let (n_obs, n_exp) = (row.breaches[i], exp.expected[i]);
                if n_obs as u64 > n_exp {
                    out.push(Comparison {
                        date: row.date,
                        model: observed.model,
                        threshold: *threshold,
                        expected: n_exp,
                        observed: n_obs,
                        exp_gt_real: true,
                        firms: row.breaching_firms[i].clone(),
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use tailwatch_primitives::{DateSeries, FirmData, FirmMeta};

    use super::*;

    const DAYS: usize = 60;
    const SHOCK_DAY: usize = 40;

    fn day(i: usize) -> Date {
        Date::from_ymd_opt(2021, 3, 1).unwrap().iter_days().nth(i).unwrap()
    }

    fn firm(name: &str, shock: Option<f64>) -> Firm {
        let returns: DateSeries = (0..DAYS)
            .map(|i| {
                let r = if i % 2 == 0 { 0.01 } else { -0.01 };
                (day(i), if i == SHOCK_DAY { shock.unwrap_or(r) } else { r })
            })
            .collect();
        let rf: DateSeries = (0..DAYS).map(|i| (day(i), 0.0001)).collect();
        let market: DateSeries = (0..DAYS).map(|i| (day(i), 0.002 * ((i % 3) as f64 - 1.0))).collect();

        let mut data = FirmData::new(FirmMeta::simple(Ticker::new(name)), rf, market);
        data.daily_returns = Some(returns);
        Firm::new(data, 100.0)
    }

    fn universe() -> Vec<Firm> {
        let mut firms: Vec<Firm> = (0..7).map(|i| firm(&format!("Q{i}"), None)).collect();
        firms.extend(["C", "A", "B"].map(|name| firm(name, Some(0.1))));
        firms
    }

    #[test]
    fn shocked_firms_exceed_expectation() {
        let firms = universe();
        let report = EventTester::default().run(&firms, &[day(SHOCK_DAY), day(SHOCK_DAY + 1)]);
        let raw = report.report(ReturnModel::Raw).unwrap();

        assert_eq!(raw.observed.rows.len(), 2);
        let shock_row = &raw.observed.rows[0];
        assert_eq!(shock_row.firms_with_return, 10);
        assert_eq!(shock_row.breaches, vec![3, 3, 3, 3]);

        // ceil(10 * 0.05) = 1
        assert_eq!(raw.expected[0].expected[1], 1);

        let at_196: Vec<&Comparison> = raw.comparisons.iter().filter(|c| c.threshold == 1.96).collect();
        assert_eq!(at_196.len(), 1);
        assert_eq!(at_196[0].date, day(SHOCK_DAY));
        assert!(at_196[0].exp_gt_real);
        let names: Vec<&str> = at_196[0].firms.iter().map(Ticker::as_str).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn observed_never_exceeds_firms_with_return() {
        let firms = universe();
        let dates: Vec<Date> = (0..DAYS).map(day).collect();
        let report = EventTester::default().run(&firms, &dates);

        for model_report in &report.reports {
            for row in &model_report.observed.rows {
                assert!(row.breaches.iter().all(|b| *b <= row.firms_with_return));
            }
        }
        assert_eq!(report.reports.len(), 4);
    }

    #[test]
    fn totals_sum_columns() {
        let firms = universe();
        let report = EventTester::default().run(&firms, &[day(SHOCK_DAY), day(SHOCK_DAY + 1)]);
        let (firms_total, breaches) = report.report(ReturnModel::Raw).unwrap().observed.total();

        assert_eq!(firms_total, 20);
        assert_eq!(breaches[0], 3);
    }

    #[test]
    fn absent_dates_produce_no_rows() {
        let firms = universe();
        let report = EventTester::default().run(&firms, &[day(DAYS + 5)]);
        assert!(report.reports.iter().all(|r| r.observed.rows.is_empty() && r.comparisons.is_empty()));
        assert!(report.master().is_empty());
    }

    #[test]
    fn master_is_sorted() {
        let firms = universe();
        let report = EventTester::default().run(&firms, &[day(SHOCK_DAY)]);
        let master = report.master();

        assert!(!master.is_empty());
        for pair in master.windows(2) {
            assert!((pair[0].date, pair[0].model) <= (pair[1].date, pair[1].model));
            if pair[0].model == pair[1].model {
                assert!(pair[0].threshold < pair[1].threshold);
            }
        }
    }
}

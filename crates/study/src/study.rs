//! Country and broad-industry event study.

use std::collections::BTreeMap;

use polars::prelude::*;
use tailwatch_data::DataLoader;
use tailwatch_math::{GaussianKde, linspace, simpson};
use tailwatch_model::{EventTestReport, Firm, Selection, ThresholdBank, comparison_frame, report_sheets};
use tailwatch_primitives::Date;
use tailwatch_traits::{MarketDataProvider, ResultSink, SeriesStore, Sheet};
use tailwatch_utils::{DateSelection, YearSelection};
use tracing::{info, warn};

use crate::{StudyConfig, StudyError, names::WorkbookNames};

const MASTER_SHEET: &str = "master_comp";
const ESG_SHEET: &str = "MEAN_ESG_VALUES";
const DISTRIBUTION_SHEET: &str = "kde";
const PLOT_SHEET: &str = "series";

/// Kernel bandwidth as a multiple of the sample standard deviation.
const KDE_BANDWIDTH: f64 = 1.0;
const KDE_GRID_START: f64 = -3.0;
const KDE_GRID_END: f64 = 3.0;
const KDE_GRID_POINTS: usize = 2000;

/// Density of the pooled daily returns of every firm.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnDistribution {
    /// Evaluation points.
    pub grid: Vec<f64>,
    /// Estimated density on `grid`.
    pub density: Vec<f64>,
    /// Simpson integral of the density over the grid.
    pub area: f64,
    /// Number of returns the density was fitted to.
    pub n_obs: usize,
}

impl ReturnDistribution {
    /// Gaussian KDE of `returns` on 2000 points in `[-3, 3]`.
    ///
    /// # Errors
    /// Returns `StudyError::Math` with fewer than two returns or a
    /// degenerate sample.
    pub fn estimate(returns: &[f64]) -> Result<Self, StudyError> {
        let kde = GaussianKde::new(returns, KDE_BANDWIDTH)?;
        let grid = linspace(KDE_GRID_START, KDE_GRID_END, KDE_GRID_POINTS);
        let density = kde.evaluate(&grid);
        let area = simpson(&density, &grid)?;
        Ok(Self { grid, density, area, n_obs: kde.n_obs() })
    }

    /// Grid and density as a two-column table.
    ///
    /// # Errors
    /// Returns `PolarsError` if the frame cannot be built.
    pub fn frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("return".into(), self.grid.clone()),
            Column::new("density".into(), self.density.clone()),
        ])
    }
}

/// Results of one group.
#[derive(Debug, Clone)]
pub struct GroupResult {
    /// Country code or broad industry.
    pub name: String,
    /// Event test over every return model.
    pub report: EventTestReport,
    /// Mean ESG scores per requested year end.
    pub esg: DataFrame,
}

/// Results of one execution.
#[derive(Debug, Clone)]
pub struct StudyResults {
    /// One entry per country, in configuration order.
    pub countries: Vec<GroupResult>,
    /// One entry per tested broad industry, sorted by name.
    pub broad_industries: Vec<GroupResult>,
    /// Comparison rows of every country, with a `country` column.
    pub country_master: DataFrame,
    /// Comparison rows of every broad industry, with a `broad_industry` column.
    pub industry_master: DataFrame,
    /// Pooled return density, when enough returns exist.
    pub distribution: Option<ReturnDistribution>,
}

impl StudyResults {
    /// Results of a country.
    #[must_use]
    pub fn country(&self, code: &str) -> Option<&GroupResult> {
        self.countries.iter().find(|g| g.name == code)
    }

    /// Results of a broad industry.
    #[must_use]
    pub fn broad_industry(&self, name: &str) -> Option<&GroupResult> {
        self.broad_industries.iter().find(|g| g.name == name)
    }
}

/// Event study over a set of countries and the broad industries of their
/// pooled firms.
///
/// Every group owns its own copy of its firms, fitted against the group's
/// factors, so a firm's country and industry results do not interfere.
#[derive(Debug, Clone)]
pub struct Study {
    country_codes: Vec<String>,
    return_interval: (Date, Date),
    esg_interval: (i32, i32),
    thresholds: ThresholdBank,
    countries: Vec<Selection>,
    broad_industries: Vec<Selection>,
}

impl Study {
    /// Load every configured country through `loader` and build the country
    /// and broad-industry selections.
    ///
    /// # Errors
    /// Returns `StudyError` for an invalid configuration, a fatal loading
    /// error or a failed factor construction.
    pub fn build<P: MarketDataProvider, S: SeriesStore>(
        config: &StudyConfig,
        loader: &mut DataLoader<P, S>,
    ) -> Result<Self, StudyError> {
        config.validate()?;
        let markets = config.markets()?;
        let query = config.query();
        let index_base = loader.index_base();

        let mut countries = Vec::with_capacity(markets.len());
        let mut by_industry: BTreeMap<String, Vec<Firm>> = BTreeMap::new();
        for market in &markets {
            let firms: Vec<Firm> = loader
                .load_country(market, query)?
                .into_iter()
                .map(|data| Firm::new(data, index_base))
                .collect();
            for firm in &firms {
                if let Some(industry) = firm.broad_industry() {
                    by_industry.entry(industry.to_string()).or_default().push(firm.clone());
                }
            }
            countries.push(Selection::new(market.code.clone(), firms)?);
        }

        let broad_industries = industry_selections(by_industry, config.min_num_firms)?;
        info!(
            countries = countries.len(),
            broad_industries = broad_industries.len(),
            cache_hits = loader.cache().hits(),
            "built study"
        );

        Ok(Self {
            country_codes: markets.into_iter().map(|m| m.code).collect(),
            return_interval: (config.return_start, config.return_end),
            esg_interval: (config.esg_first_year, config.esg_last_year),
            thresholds: config.threshold_bank()?,
            countries,
            broad_industries,
        })
    }

    /// Country selections, in configuration order.
    #[must_use]
    pub fn countries(&self) -> &[Selection] {
        &self.countries
    }

    /// Broad-industry selections with at least the minimum number of firms,
    /// sorted by name.
    #[must_use]
    pub fn broad_industries(&self) -> &[Selection] {
        &self.broad_industries
    }

    /// A country selection.
    #[must_use]
    pub fn country(&self, code: &str) -> Option<&Selection> {
        self.countries.iter().find(|s| s.name() == code)
    }

    /// A broad-industry selection.
    #[must_use]
    pub fn broad_industry(&self, name: &str) -> Option<&Selection> {
        self.broad_industries.iter().find(|s| s.name() == name)
    }

    /// Thresholds every group is tested with.
    #[must_use]
    pub const fn thresholds(&self) -> &ThresholdBank {
        &self.thresholds
    }

    /// Daily return interval the firms were loaded for.
    #[must_use]
    pub const fn return_interval(&self) -> (Date, Date) {
        self.return_interval
    }

    /// Non-zero, non-NaN daily returns of every firm of every country.
    #[must_use]
    pub fn pooled_returns(&self) -> Vec<f64> {
        self.countries.iter().flat_map(Selection::pooled_returns).collect()
    }

    /// Test `dates` and `years` on every country, then every broad industry,
    /// and write the result workbooks to `sink`.
    ///
    /// The pooled return distribution is always written; the ESG series per
    /// group only when `plot_esg` is set.
    ///
    /// # Errors
    /// Returns `StudyError::InvalidConfig` for an empty selection and
    /// `StudyError::Store` if the sink rejects a workbook.
    pub fn execute<R: ResultSink + ?Sized>(
        &self,
        dates: &DateSelection,
        years: &YearSelection,
        sink: &mut R,
        plot_esg: bool,
    ) -> Result<StudyResults, StudyError> {
        let check_dates = dates.expand();
        let checked = dates.span().ok_or_else(|| StudyError::InvalidConfig("no dates to test".to_string()))?;
        let year_list = years.expand();
        let (Some(&first_year), Some(&last_year)) = (year_list.first(), year_list.last()) else {
            return Err(StudyError::InvalidConfig("no ESG years to test".to_string()));
        };
        let year_ends = years.year_ends();
        let names = WorkbookNames::new(
            &self.country_codes,
            self.return_interval,
            checked,
            self.esg_interval,
            (first_year, last_year),
        );
        info!(
            dates = check_dates.len(),
            years = year_ends.len(),
            first = %checked.0,
            last = %checked.1,
            "executing study"
        );

        let distribution = self.write_return_distribution(&names, sink)?;

        let mut countries = Vec::with_capacity(self.countries.len());
        for selection in &self.countries {
            let returns = names.country_returns(selection.name());
            let esg = names.country_esg(selection.name());
            countries.push(self.test_group(selection, &check_dates, &year_ends, &returns, &esg, sink)?);
        }
        let country_master = master_frame("country", &countries)?;
        sink.write_workbook(&names.country_master(), &mut [Sheet::new(MASTER_SHEET, country_master.clone())])?;

        let mut broad_industries = Vec::with_capacity(self.broad_industries.len());
        for selection in &self.broad_industries {
            let returns = names.industry_returns(selection.name());
            let esg = names.industry_esg(selection.name());
            broad_industries.push(self.test_group(selection, &check_dates, &year_ends, &returns, &esg, sink)?);
        }
        let industry_master = master_frame("broad_industry", &broad_industries)?;
        sink.write_workbook(&names.industry_master(), &mut [Sheet::new(MASTER_SHEET, industry_master.clone())])?;

        if plot_esg {
            write_esg_plots(&names, &countries, &broad_industries, sink)?;
        }

        info!(
            country_comparisons = country_master.height(),
            industry_comparisons = industry_master.height(),
            "study complete"
        );
        Ok(StudyResults { countries, broad_industries, country_master, industry_master, distribution })
    }

    fn test_group<R: ResultSink + ?Sized>(
        &self,
        selection: &Selection,
        dates: &[Date],
        year_ends: &[Date],
        returns_workbook: &str,
        esg_workbook: &str,
        sink: &mut R,
    ) -> Result<GroupResult, StudyError> {
        let report = selection.test_returns(dates, &self.thresholds);
        sink.write_workbook(returns_workbook, &mut report_sheets(&report)?)?;

        let esg = selection.test_esg(year_ends)?;
        sink.write_workbook(esg_workbook, &mut [Sheet::new(ESG_SHEET, esg.clone())])?;

        info!(
            group = selection.name(),
            tested = selection.fundamentals_firms().count(),
            comparisons = report.master().len(),
            "tested group"
        );
        Ok(GroupResult { name: selection.name().to_string(), report, esg })
    }

    fn write_return_distribution<R: ResultSink + ?Sized>(
        &self,
        names: &WorkbookNames,
        sink: &mut R,
    ) -> Result<Option<ReturnDistribution>, StudyError> {
        let returns = self.pooled_returns();
        let distribution = match ReturnDistribution::estimate(&returns) {
            Ok(distribution) => distribution,
            Err(err) => {
                warn!(observations = returns.len(), error = %err, "skipping return distribution");
                return Ok(None);
            }
        };
        info!(observations = distribution.n_obs, area = distribution.area, "return distribution");

        sink.write_workbook(
            &names.return_distribution(),
            &mut [Sheet::new(DISTRIBUTION_SHEET, distribution.frame()?)],
        )?;
        Ok(Some(distribution))
    }
}

fn industry_selections(
    by_industry: BTreeMap<String, Vec<Firm>>,
    min_num_firms: usize,
) -> Result<Vec<Selection>, StudyError> {
    let mut selections = Vec::new();
    for (industry, firms) in by_industry {
        if firms.len() < min_num_firms {
            info!(%industry, firms = firms.len(), min_num_firms, "skipping broad industry");
            continue;
        }
        info!(%industry, firms = firms.len(), "building broad industry");
        selections.push(Selection::new(industry, firms)?);
    }
    Ok(selections)
}

/// `frame` with a leading column holding `group` on every row.
fn with_group(column: &str, group: &str, mut frame: DataFrame) -> PolarsResult<DataFrame> {
    let values = vec![group; frame.height()];
    frame.insert_column(0, Column::new(column.into(), values))?;
    Ok(frame)
}

/// Comparison rows of every group stacked, sorted by group, date, return
/// model and threshold.
fn master_frame(column: &str, groups: &[GroupResult]) -> PolarsResult<DataFrame> {
    let mut master = with_group(column, "", comparison_frame(&[])?)?;
    for group in groups {
        let frame = with_group(column, &group.name, comparison_frame(&group.report.master())?)?;
        master.vstack_mut(&frame)?;
    }
    master.sort([column, "date", "return_type", "z_score"], SortMultipleOptions::default())
}

/// One ESG column of every group side by side, indexed by year end.
fn esg_plot_frame(groups: &[GroupResult], column: &str) -> PolarsResult<Option<DataFrame>> {
    let Some(first) = groups.first() else {
        return Ok(None);
    };
    let mut columns = vec![first.esg.column("date")?.clone()];
    for group in groups {
        columns.push(group.esg.column(column)?.clone().with_name(group.name.as_str().into()));
    }
    DataFrame::new(columns).map(Some)
}

fn write_esg_plots<R: ResultSink + ?Sized>(
    names: &WorkbookNames,
    countries: &[GroupResult],
    broad_industries: &[GroupResult],
    sink: &mut R,
) -> Result<(), StudyError> {
    let plots = [
        ("COUNTRY_ESG", countries, "esg_score"),
        ("COUNTRY_ENVIRONMENT", countries, "environmental_pillar_score"),
        ("BROAD_INDUSTRIES_ESG", broad_industries, "esg_score"),
        ("BROAD_INDUSTRIES_ENVIRONMENT", broad_industries, "environmental_pillar_score"),
    ];
    for (kind, groups, column) in plots {
        if let Some(frame) = esg_plot_frame(groups, column)? {
            sink.write_workbook(&names.esg_plot(kind), &mut [Sheet::new(PLOT_SHEET, frame)])?;
        }
    }
    Ok(())
}

//! Result workbook names.

use tailwatch_primitives::Date;

/// Group name as used in workbook names: upper case, with spaces, `|` and
/// path separators replaced by `_`.
#[must_use]
pub fn workbook_label(name: &str) -> String {
    name.to_uppercase().replace([' ', '|', '/', '\\'], "_")
}

/// Intervals every workbook name of one execution is built from.
#[derive(Debug, Clone)]
pub(crate) struct WorkbookNames {
    /// Country codes joined with `_`.
    countries: String,
    returns: (Date, Date),
    checked: (Date, Date),
    esg_interval: (i32, i32),
    esg_years: (i32, i32),
}

impl WorkbookNames {
    pub(crate) fn new(
        country_codes: &[String],
        returns: (Date, Date),
        checked: (Date, Date),
        esg_interval: (i32, i32),
        esg_years: (i32, i32),
    ) -> Self {
        Self { countries: country_codes.join("_"), returns, checked, esg_interval, esg_years }
    }

    fn intervals(&self) -> String {
        format!("{}_{}__{}_{}", self.returns.0, self.returns.1, self.checked.0, self.checked.1)
    }

    pub(crate) fn country_returns(&self, code: &str) -> String {
        format!("{code}/TEST_RETURN____{}", self.intervals())
    }

    pub(crate) fn country_esg(&self, code: &str) -> String {
        format!("{code}/ESG____{}__{}", self.esg_years.0, self.esg_years.1)
    }

    pub(crate) fn industry_returns(&self, industry: &str) -> String {
        format!("{}/TEST_RETURN__{}__{}", self.countries, workbook_label(industry), self.intervals())
    }

    pub(crate) fn industry_esg(&self, industry: &str) -> String {
        format!(
            "{}/ESG__{}__{}_{}",
            self.countries,
            workbook_label(industry),
            self.esg_years.0,
            self.esg_years.1
        )
    }

    pub(crate) fn country_master(&self) -> String {
        format!("{}/TEST_RETURN__MASTER_COMP_COUNTRIES__{}", self.countries, self.intervals())
    }

    pub(crate) fn industry_master(&self) -> String {
        format!("{}/TEST_RETURN__MASTER_COMP_BROAD_INDUSTRIES__{}", self.countries, self.intervals())
    }

    pub(crate) fn return_distribution(&self) -> String {
        format!("{}/RETURN_DISTRIBUTION__{}__{}", self.countries, self.returns.0, self.returns.1)
    }

    /// `kind` is one of `COUNTRY_ESG`, `COUNTRY_ENVIRONMENT`,
    /// `BROAD_INDUSTRIES_ESG`, `BROAD_INDUSTRIES_ENVIRONMENT`.
    pub(crate) fn esg_plot(&self, kind: &str) -> String {
        format!(
            "{}/PLOT_{kind}__{}_{}__{}_{}",
            self.countries, self.esg_interval.0, self.esg_interval.1, self.esg_years.0, self.esg_years.1
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn names() -> WorkbookNames {
        let d = |y, m, day| Date::from_ymd_opt(y, m, day).unwrap();
        WorkbookNames::new(
            &["BE".to_string(), "GB".to_string()],
            (d(2010, 1, 1), d(2025, 1, 1)),
            (d(2017, 5, 25), d(2017, 6, 9)),
            (2005, 2030),
            (2010, 2024),
        )
    }

    #[rstest]
    #[case::plain("Utilities", "UTILITIES")]
    #[case::spaces("Consumer Cyclicals", "CONSUMER_CYCLICALS")]
    #[case::pipe("Energy|Oil", "ENERGY_OIL")]
    #[case::slash("Food / Drug", "FOOD___DRUG")]
    fn labels(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(workbook_label(name), expected);
    }

    #[test]
    fn group_workbooks() {
        let names = names();
        assert_eq!(names.country_returns("BE"), "BE/TEST_RETURN____2010-01-01_2025-01-01__2017-05-25_2017-06-09");
        assert_eq!(names.country_esg("BE"), "BE/ESG____2010__2024");
        assert_eq!(
            names.industry_returns("Basic Materials"),
            "BE_GB/TEST_RETURN__BASIC_MATERIALS__2010-01-01_2025-01-01__2017-05-25_2017-06-09"
        );
        assert_eq!(names.industry_esg("Basic Materials"), "BE_GB/ESG__BASIC_MATERIALS__2010_2024");
    }

    #[test]
    fn run_workbooks() {
        let names = names();
        assert_eq!(
            names.country_master(),
            "BE_GB/TEST_RETURN__MASTER_COMP_COUNTRIES__2010-01-01_2025-01-01__2017-05-25_2017-06-09"
        );
        assert!(names.industry_master().starts_with("BE_GB/TEST_RETURN__MASTER_COMP_BROAD_INDUSTRIES__"));
        assert_eq!(names.return_distribution(), "BE_GB/RETURN_DISTRIBUTION__2010-01-01__2025-01-01");
        assert_eq!(names.esg_plot("COUNTRY_ESG"), "BE_GB/PLOT_COUNTRY_ESG__2005_2030__2010_2024");
    }
}

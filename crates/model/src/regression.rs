//! Per-firm factor regressions.

use ndarray::{Array1, Array2};
use tailwatch_math::ordinary_least_squares;
use tailwatch_primitives::{AlignedSeries, DateSeries, FactorExposures, FactorKind, FactorSet};

use crate::ModelError;

/// Column of a regressor in a [`factor_panel`]; column 0 is the stock premium.
const fn panel_column(kind: FactorKind) -> usize {
    match kind {
        FactorKind::Market => 1,
        FactorKind::Smb => 2,
        FactorKind::Hms => 3,
        FactorKind::Rmw => 4,
        FactorKind::Cma => 5,
    }
}

/// Align a firm's stock premium, market premium and the group factors on
/// their common dates.
///
/// Columns are `[SP, MP, SMB, HMS, RMW, CMA]`. Both factor models are fitted
/// on this one sample.
#[must_use]
pub fn factor_panel(
    stock_premiums: &DateSeries,
    market_premiums: &DateSeries,
    factors: &FactorSet,
) -> AlignedSeries {
    DateSeries::inner_join(&[
        stock_premiums,
        market_premiums,
        &factors.smb,
        &factors.hms,
        &factors.rmw,
        &factors.cma,
    ])
    .retain_rows(|row| row.iter().all(|v| !v.is_nan()))
}

/// Result of one factor regression.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorFit {
    /// Intercept and factor loadings.
    pub exposures: FactorExposures,
    /// Stock premium minus the fitted premium.
    pub residuals: DateSeries,
    /// Share of premium variance explained.
    pub r_squared: f64,
}

impl FactorFit {
    /// Number of observations behind the fit.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.residuals.len()
    }
}

/// OLS of the stock premium on a constant and a set of factors.
#[derive(Debug, Clone)]
pub struct FactorRegression {
    regressors: Vec<FactorKind>,
}

impl FactorRegression {
    /// Market premium, SMB and HMS.
    #[must_use]
    pub fn three_factor() -> Self {
        Self { regressors: FactorKind::THREE.to_vec() }
    }

    /// Market premium, SMB, HMS, RMW and CMA.
    #[must_use]
    pub fn five_factor() -> Self {
        Self { regressors: FactorKind::FIVE.to_vec() }
    }

    /// Regressors in design-matrix order.
    #[must_use]
    pub fn regressors(&self) -> &[FactorKind] {
        &self.regressors
    }

    /// Fit on a panel built by [`factor_panel`].
    ///
    /// # Errors
    /// Returns `ModelError` if the panel has fewer rows than parameters or the
    /// design is singular.
    pub fn fit(&self, panel: &AlignedSeries) -> Result<FactorFit, ModelError> {
        let n = panel.n_rows();
        let p = self.regressors.len() + 1;
        if n < p {
            return Err(ModelError::InsufficientData { required: p, actual: n });
        }

        let y = Array1::from(panel.column(0).to_vec());
        let mut x = Array2::zeros((n, self.regressors.len()));
        for (j, kind) in self.regressors.iter().enumerate() {
            for (i, v) in panel.column(panel_column(*kind)).iter().enumerate() {
                x[[i, j]] = *v;
            }
        }

        let result = ordinary_least_squares(&y, &x)?;

        let loadings = self
            .regressors
            .iter()
            .enumerate()
            .map(|(j, kind)| (*kind, result.coefficients[j + 1]))
            .collect();
        let residuals = panel.dates.iter().copied().zip(result.residuals.iter().copied()).collect();

        Ok(FactorFit {
            exposures: FactorExposures::new(result.coefficients[0], loadings),
            residuals,
            r_squared: result.r_squared,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tailwatch_primitives::Date;

    use super::*;

    fn day(i: u64) -> Date {
        Date::from_ymd_opt(2023, 1, 1).unwrap().iter_days().nth(i as usize).unwrap()
    }

    fn series(values: impl Fn(u64) -> f64, n: u64) -> DateSeries {
        (0..n).map(|i| (day(i), values(i))).collect()
    }

    fn wave(i: u64, period: u64, amp: f64) -> f64 {
        amp * ((i % period) as f64 - (period as f64 - 1.0) / 2.0)
    }

    fn synthetic_factors(n: u64) -> (DateSeries, FactorSet) {
        let mp = series(|i| wave(i, 7, 0.002), n);
        let factors = FactorSet {
            smb: series(|i| wave(i, 5, 0.001), n),
            hms: series(|i| wave(i, 11, 0.0015), n),
            rmw: series(|i| wave(i, 3, 0.001), n),
            cma: series(|i| wave(i, 13, 0.0008), n),
        };
        (mp, factors)
    }

    #[test]
    fn five_factor_recovers_loadings() {
        let n = 120;
        let (mp, f) = synthetic_factors(n);
        let sp: DateSeries = (0..n)
            .map(|i| {
                let d = day(i);
                let v = 0.0005 + 1.1 * mp.get(&d).unwrap() + 0.4 * f.smb.get(&d).unwrap()
                    - 0.2 * f.hms.get(&d).unwrap()
                    + 0.3 * f.rmw.get(&d).unwrap()
                    + 0.1 * f.cma.get(&d).unwrap();
                (d, v)
            })
            .collect();

        let panel = factor_panel(&sp, &mp, &f);
        let fit = FactorRegression::five_factor().fit(&panel).unwrap();

        assert_relative_eq!(fit.exposures.intercept, 0.0005, epsilon = 1e-9);
        assert_relative_eq!(fit.exposures.get(FactorKind::Market).unwrap(), 1.1, epsilon = 1e-6);
        assert_relative_eq!(fit.exposures.get(FactorKind::Hms).unwrap(), -0.2, epsilon = 1e-6);
        assert_relative_eq!(fit.exposures.get(FactorKind::Cma).unwrap(), 0.1, epsilon = 1e-6);
        assert_eq!(fit.n_obs(), n as usize);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn three_factor_uses_three_regressors() {
        let n = 60;
        let (mp, f) = synthetic_factors(n);
        let sp = series(|i| wave(i, 17, 0.003), n);

        let fit = FactorRegression::three_factor().fit(&factor_panel(&sp, &mp, &f)).unwrap();
        assert_eq!(fit.exposures.n_exposures(), 3);
        assert!(fit.exposures.get(FactorKind::Rmw).is_none());
        assert_eq!(fit.residuals.len(), 60);
    }

    #[test]
    fn empty_panel_is_insufficient() {
        let (mp, _) = synthetic_factors(10);
        let panel = factor_panel(&mp, &mp, &FactorSet::default());

        assert!(panel.is_empty());
        assert!(matches!(
            FactorRegression::three_factor().fit(&panel),
            Err(ModelError::InsufficientData { required: 4, actual: 0 })
        ));
    }
}

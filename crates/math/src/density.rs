//! Gaussian kernel density estimation and numerical integration.

use std::f64::consts::PI;

use crate::{MathError, sample_std};

/// Gaussian kernel density estimate of a univariate sample.
///
/// The kernel bandwidth is `bandwidth_factor` times the sample standard
/// deviation of the data.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    data: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit a density to `data`, ignoring NaN observations.
    ///
    /// # Errors
    /// Returns error with fewer than two observations or a degenerate
    /// (zero-variance) sample.
    pub fn new(data: &[f64], bandwidth_factor: f64) -> Result<Self, MathError> {
        let data: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
        if data.len() < 2 {
            return Err(MathError::InsufficientData { required: 2, actual: data.len() });
        }

        let bandwidth = sample_std(&data) * bandwidth_factor;
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(MathError::NumericalInstability(format!(
                "kernel bandwidth {bandwidth} is not positive"
            )));
        }

        Ok(Self { data, bandwidth })
    }

    /// Kernel bandwidth.
    #[must_use]
    pub const fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Number of observations behind the estimate.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.data.len()
    }

    /// Density at `x`.
    #[must_use]
    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / (self.data.len() as f64 * self.bandwidth * (2.0 * PI).sqrt());
        let sum: f64 = self
            .data
            .iter()
            .map(|xi| {
                let u = (x - xi) / self.bandwidth;
                (-0.5 * u * u).exp()
            })
            .sum();
        norm * sum
    }

    /// Density at every point of `grid`.
    #[must_use]
    pub fn evaluate(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|x| self.density(*x)).collect()
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Integrate samples `y` taken at points `x` with composite Simpson's rule.
///
/// Spacing may be uneven. With an even number of points the last interval
/// receives Cartwright's correction. Two points fall back to the trapezoid
/// rule.
///
/// # Errors
/// Returns error if `x` and `y` differ in length or hold fewer than two points.
pub fn simpson(y: &[f64], x: &[f64]) -> Result<f64, MathError> {
    let n = y.len();
    if x.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.len() });
    }
    if n < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: n });
    }
    if n == 2 {
        return Ok(0.5 * (x[1] - x[0]) * (y[0] + y[1]));
    }

    let odd_end = if n % 2 == 1 { n } else { n - 1 };
    let mut total = 0.0;
    let mut i = 0;
    while i + 2 < odd_end {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let ratio = h0 / h1;
        total += hsum / 6.0
            * (y[i] * (2.0 - 1.0 / ratio) + y[i + 1] * hsum * hsum / (h0 * h1) + y[i + 2] * (2.0 - ratio));
        i += 2;
    }

    if n % 2 == 0 {
        let h0 = x[n - 2] - x[n - 3];
        let h1 = x[n - 1] - x[n - 2];
        let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
        let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
        let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
        total += alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3];
    }

    Ok(total)
}

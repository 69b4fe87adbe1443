//! Sample moments and order statistics.
//!
//! NaN observations are skipped everywhere, so a series with gaps behaves like
//! the same series with the gaps removed. Dispersion estimates use the sample
//! (n - 1) denominator.

use crate::MathError;

fn finite_values(data: &[f64]) -> impl Iterator<Item = f64> + '_ {
    data.iter().copied().filter(|x| !x.is_nan())
}

/// Arithmetic mean, `NaN` when there is no observation.
#[must_use]
pub fn mean(data: &[f64]) -> f64 {
    let (sum, n) = finite_values(data).fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample variance, `NaN` with fewer than two observations.
#[must_use]
pub fn sample_variance(data: &[f64]) -> f64 {
    let m = mean(data);
    let (ss, n) = finite_values(data).fold((0.0, 0usize), |(s, n), x| (s + (x - m).powi(2), n + 1));
    if n < 2 { f64::NAN } else { ss / (n - 1) as f64 }
}

/// Sample standard deviation.
#[must_use]
pub fn sample_std(data: &[f64]) -> f64 {
    sample_variance(data).sqrt()
}

/// Sample covariance of two equally long slices, over pairs where both sides
/// are present.
///
/// # Errors
/// Returns error if the slices differ in length.
pub fn covariance(x: &[f64], y: &[f64]) -> Result<f64, MathError> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch { expected: x.len(), actual: y.len() });
    }

    let pairs: Vec<(f64, f64)> =
        x.iter().zip(y).filter(|(a, b)| !a.is_nan() && !b.is_nan()).map(|(a, b)| (*a, *b)).collect();
    let n = pairs.len();
    if n < 2 {
        return Ok(f64::NAN);
    }

    let mx = pairs.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|(_, b)| b).sum::<f64>() / n as f64;
    let sxy: f64 = pairs.iter().map(|(a, b)| (a - mx) * (b - my)).sum();
    Ok(sxy / (n - 1) as f64)
}

/// Quantile with linear interpolation between order statistics.
///
/// The position of quantile `q` among `n` sorted values is `q * (n - 1)`.
///
/// # Errors
/// Returns error if `q` is outside `[0, 1]` or there is no observation.
pub fn quantile(data: &[f64], q: f64) -> Result<f64, MathError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidQuantile(q));
    }

    let mut sorted: Vec<f64> = finite_values(data).collect();
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median, `NaN` when there is no observation.
#[must_use]
pub fn median(data: &[f64]) -> f64 {
    quantile(data, 0.5).unwrap_or(f64::NAN)
}

/// Period-over-period relative change. The first element has no predecessor
/// and is omitted.
#[must_use]
pub fn pct_change(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

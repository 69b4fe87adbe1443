//! Ordinary least squares for factor-model fits.

use ndarray::{Array1, Array2, Axis, s};

use crate::MathError;

/// Pivots below this magnitude mark the normal equations as singular.
const PIVOT_TOLERANCE: f64 = 1e-14;

/// Fitted regression of one response on a design with a leading constant.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Intercept followed by one coefficient per regressor.
    pub coefficients: Array1<f64>,
    /// Response minus fitted values, in observation order.
    pub residuals: Array1<f64>,
    /// Share of the response variance explained by the fit.
    pub r_squared: f64,
}

/// Ordinary least squares of `y` on the columns of `x` plus a leading constant.
///
/// The first coefficient of the result is the intercept; the remaining
/// coefficients follow the column order of `x`.
///
/// # Errors
/// Returns error if dimensions mismatch, there are fewer observations than
/// parameters, or the design is singular.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let n = y.len();
    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }

    let p = x.ncols() + 1;
    if n < p {
        return Err(MathError::InsufficientData { required: p, actual: n });
    }

    let mut design = Array2::ones((n, p));
    design.slice_mut(s![.., 1..]).assign(x);

    let coefficients = solve_normal_equations(&design, y)?;
    let residuals = y - &design.dot(&coefficients);

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot = y.mapv(|v| (v - y_mean).powi(2)).sum();
    let ss_res = residuals.mapv(|r| r * r).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(OlsResult { coefficients, residuals, r_squared })
}

/// Solve `X'X b = X'y` by Gaussian elimination with partial pivoting.
fn solve_normal_equations(design: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let p = design.ncols();
    if p == 0 {
        return Err(MathError::EmptyData);
    }

    // [X'X | X'y]
    let mut aug = Array2::<f64>::zeros((p, p + 1));
    aug.slice_mut(s![.., ..p]).assign(&design.t().dot(design));
    aug.column_mut(p).assign(&design.t().dot(y));

    for col in 0..p {
        let (pivot, magnitude) = (col..p)
            .map(|row| (row, aug[[row, col]].abs()))
            .fold((col, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
        if magnitude.is_nan() || magnitude < PIVOT_TOLERANCE {
            return Err(MathError::LinearAlgebra("normal equations are singular".to_string()));
        }
        if pivot != col {
            let (mut upper, mut lower) = aug.multi_slice_mut((s![col, ..], s![pivot, ..]));
            ndarray::Zip::from(&mut upper).and(&mut lower).for_each(|a, b| std::mem::swap(a, b));
        }

        let head = aug.row(col).to_owned();
        for mut row in aug.axis_iter_mut(Axis(0)).skip(col + 1) {
            let factor = row[col] / head[col];
            row.scaled_add(-factor, &head);
        }
    }

    let mut solution = Array1::<f64>::zeros(p);
    for i in (0..p).rev() {
        let tail = aug.slice(s![i, i + 1..p]).dot(&solution.slice(s![i + 1..]));
        solution[i] = (aug[[i, p]] - tail) / aug[[i, i]];
    }
    Ok(solution)
}

//! Ordinary least squares via normal equations.
//!
//! The regressions used here are tiny (2-3 columns, a few hundred rows), so a
//! direct Gaussian-elimination solve is plenty and avoids a linear-algebra
//! dependency.

use crate::error::StatFailure;

/// Fitted OLS regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficient per design column, in input order.
    pub coefficients: Vec<f64>,
    /// Standard error per coefficient.
    pub std_errors: Vec<f64>,
    /// Residuals y - X*beta.
    pub residuals: Vec<f64>,
}

impl OlsFit {
    /// t-statistic for coefficient `i` (coefficient / standard error).
    pub fn t_stat(&self, i: usize) -> f64 {
        let se = self.std_errors[i];
        if se <= f64::EPSILON {
            0.0
        } else {
            self.coefficients[i] / se
        }
    }
}

/// Fit `y = X * beta + e` where `columns` are the design-matrix columns.
///
/// Returns a structured failure for singular or under-determined systems;
/// never panics.
pub fn fit_ols(y: &[f64], columns: &[&[f64]]) -> Result<OlsFit, StatFailure> {
    let n = y.len();
    let k = columns.len();
    if k == 0 || n <= k {
        return Err(StatFailure::InsufficientData {
            required: k + 1,
            actual: n,
        });
    }
    if columns.iter().any(|c| c.len() != n) {
        return Err(StatFailure::Numerical(
            "design column length mismatch".to_string(),
        ));
    }

    // Normal equations: (X'X) beta = X'y.
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in i..k {
            let dot: f64 = columns[i]
                .iter()
                .zip(columns[j])
                .map(|(a, b)| a * b)
                .sum();
            xtx[i][j] = dot;
            xtx[j][i] = dot;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let inv = invert(&xtx)?;
    let coefficients: Vec<f64> = (0..k)
        .map(|i| (0..k).map(|j| inv[i][j] * xty[j]).sum())
        .collect();

    let residuals: Vec<f64> = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|j| coefficients[j] * columns[j][t]).sum();
            y[t] - fitted
        })
        .collect();

    let ssr: f64 = residuals.iter().map(|r| r * r).sum();
    let sigma2 = ssr / (n - k) as f64;
    let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * inv[i][i]).max(0.0).sqrt()).collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        residuals,
    })
}

/// Invert a small symmetric matrix by Gauss-Jordan with partial pivoting.
fn invert(m: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, StatFailure> {
    let k = m.len();
    // Augment [M | I].
    let mut a: Vec<Vec<f64>> = m
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..k).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..k {
        // Partial pivot.
        let pivot_row = (col..k)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(StatFailure::Numerical("singular regression matrix".to_string()));
        }
        a.swap(col, pivot_row);

        let pivot = a[col][col];
        for v in a[col].iter_mut() {
            *v /= pivot;
        }
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * k {
                a[row][j] -= factor * a[col][j];
            }
        }
    }

    Ok(a.into_iter().map(|row| row[k..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_known_line() {
        // y = 2 + 3x, exact fit.
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ones = vec![1.0; 20];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();

        let fit = fit_ols(&y, &[&ones, &x]).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-9);
        assert!((fit.coefficients[1] - 3.0).abs() < 1e-9);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn singular_design_reports_numerical_failure() {
        // Two identical columns are perfectly collinear.
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let err = fit_ols(&y, &[&x, &x]).unwrap_err();
        assert!(matches!(err, StatFailure::Numerical(_)));
    }

    #[test]
    fn too_few_rows_reports_insufficient_data() {
        let x = vec![1.0, 2.0];
        let y = vec![1.0, 2.0];
        let ones = vec![1.0, 1.0];
        let err = fit_ols(&y, &[&ones, &x]).unwrap_err();
        assert!(matches!(err, StatFailure::InsufficientData { .. }));
    }

    #[test]
    fn t_stat_is_large_for_strong_relationship() {
        let x: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let ones = vec![1.0; 50];
        // Slight deterministic perturbation so standard errors are nonzero.
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 1.0 + 0.5 * v + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();

        let fit = fit_ols(&y, &[&ones, &x]).unwrap();
        assert!(fit.t_stat(1) > 100.0);
    }
}

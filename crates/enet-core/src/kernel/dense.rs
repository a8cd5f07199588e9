//! Dense coordinate-descent kernel (§4.1, "Dense").

use crate::design_matrix::DenseMatrix;
use crate::error::{EnetError, EnetResult};
use crate::kernel::soft_threshold::{soft_threshold, soft_threshold_positive};
use crate::kernel::{KernelOutcome, RegStrengths};

/// Runs cyclic coordinate descent on a dense, already-centered design matrix
/// until the duality gap falls below `tol * ||y||^2` or `max_iter` sweeps
/// elapse. `w` is warm-started in place.
///
/// # Errors
///
/// Returns [`EnetError::NegativeColumnNorm`] if a column's squared norm is
/// negative (corrupted input, since squared norms cannot be negative).
pub fn dense_coordinate_descent(
    x: &DenseMatrix,
    y: &[f64],
    w: &mut [f64],
    reg: RegStrengths,
    max_iter: usize,
    tol: f64,
    positive: bool,
) -> EnetResult<KernelOutcome> {
    let n_samples = x.n_samples();
    let n_features = x.n_features();
    debug_assert_eq!(y.len(), n_samples);
    debug_assert_eq!(w.len(), n_features);

    let norm_cols_x: Vec<f64> = (0..n_features)
        .map(|j| x.column(j).iter().map(|v| v * v).sum::<f64>())
        .collect();
    for (j, &norm) in norm_cols_x.iter().enumerate() {
        if norm < 0.0 {
            return Err(EnetError::NegativeColumnNorm {
                column: j,
                value: norm,
            });
        }
    }

    let y_norm2: f64 = y.iter().map(|v| v * v).sum();
    let eps_threshold = tol * y_norm2;

    // r = y - X w
    let mut r = y.to_vec();
    for j in 0..n_features {
        let wj = w[j];
        if wj != 0.0 {
            for (ri, &xij) in r.iter_mut().zip(x.column(j)) {
                *ri -= wj * xij;
            }
        }
    }

    let mut n_iter = 0usize;
    let mut gap = f64::INFINITY;

    for iter in 1..=max_iter {
        n_iter = iter;
        let mut max_w = 0.0_f64;
        let mut max_delta = 0.0_f64;

        for j in 0..n_features {
            let norm_j = norm_cols_x[j];
            if norm_j == 0.0 {
                w[j] = 0.0;
                continue;
            }
            let wj_old = w[j];
            let col = x.column(j);

            let mut rho = wj_old * norm_j;
            for (&ri, &xij) in r.iter().zip(col) {
                rho += xij * ri;
            }

            let wj_new = if positive {
                soft_threshold_positive(rho, reg.l1_reg) / (norm_j + reg.l2_reg)
            } else {
                soft_threshold(rho, reg.l1_reg) / (norm_j + reg.l2_reg)
            };

            if wj_new != wj_old {
                let delta = wj_old - wj_new;
                for (ri, &xij) in r.iter_mut().zip(col) {
                    *ri += delta * xij;
                }
            }
            w[j] = wj_new;

            max_w = max_w.max(wj_new.abs());
            max_delta = max_delta.max((wj_new - wj_old).abs());
        }

        let converged_by_delta = max_w > 0.0 && max_delta / max_w < tol;
        gap = duality_gap(x, w, &r, y, y_norm2, reg);
        if gap < eps_threshold || converged_by_delta {
            break;
        }
    }

    Ok(KernelOutcome {
        gap,
        eps_threshold,
        n_iter,
    })
}

/// Computes the duality gap (§4.1 "Convergence test") given the residual
/// already in sync with `w`.
pub(crate) fn duality_gap(
    x: &DenseMatrix,
    w: &[f64],
    r: &[f64],
    y: &[f64],
    y_norm2: f64,
    reg: RegStrengths,
) -> f64 {
    let n_features = x.n_features();
    let mut dual_norm = 0.0_f64;
    for j in 0..n_features {
        let xtr: f64 = x.column(j).iter().zip(r).map(|(&xij, &ri)| xij * ri).sum();
        let xta_j = xtr - reg.l2_reg * w[j];
        dual_norm = dual_norm.max(xta_j.abs());
    }
    gap_from_dual_norm(dual_norm, w, r, y, y_norm2, reg)
}

/// The part of the gap formula common to every kernel once the per-kernel
/// dual norm has been computed (dense/sparse scan columns, gram reconstructs
/// from `G`, multi-task takes a row-norm max instead of an absolute value).
pub(crate) fn gap_from_dual_norm(
    dual_norm: f64,
    w: &[f64],
    r: &[f64],
    y: &[f64],
    y_norm2: f64,
    reg: RegStrengths,
) -> f64 {
    let _ = y_norm2;
    let r_norm2: f64 = r.iter().map(|v| v * v).sum();
    let l1_norm_w: f64 = w.iter().map(|v| v.abs()).sum();
    let w_norm2: f64 = w.iter().map(|v| v * v).sum();

    let const_ = if dual_norm > reg.l1_reg {
        reg.l1_reg / dual_norm
    } else {
        1.0
    };
    let a_norm2 = r_norm2 * const_ * const_;
    let ry: f64 = r.iter().zip(y).map(|(a, b)| a * b).sum();

    0.5 * (r_norm2 + a_norm2) - const_ * ry
        + reg.l1_reg * l1_norm_w
        + 0.5 * reg.l2_reg * (1.0 + const_ * const_) * w_norm2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_matrix::DenseMatrix;

    fn dense(data: Vec<f64>, n_samples: usize, n_features: usize) -> DenseMatrix {
        DenseMatrix::from_column_major(data, n_samples, n_features).unwrap()
    }

    #[test]
    fn pins_zero_norm_columns_to_zero() {
        let x = dense(vec![0.0, 0.0, 0.0], 3, 1);
        let y = vec![1.0, 2.0, 3.0];
        let mut w = vec![0.0];
        let reg = RegStrengths::from_alpha(0.1, 1.0, 3);
        let out = dense_coordinate_descent(&x, &y, &mut w, reg, 100, 1e-4, false).unwrap();
        assert_eq!(w[0], 0.0);
        assert!(out.n_iter >= 1);
    }

    #[test]
    fn positive_constraint_keeps_coefficients_nonnegative() {
        let x = dense(vec![1.0, 2.0, 3.0, -1.0, -2.0, -3.0], 3, 2);
        let y = vec![-1.0, -2.0, -3.0];
        let mut w = vec![0.0, 0.0];
        let reg = RegStrengths::from_alpha(0.01, 1.0, 3);
        dense_coordinate_descent(&x, &y, &mut w, reg, 1000, 1e-6, true).unwrap();
        assert!(w.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn converges_to_near_zero_gap_on_simple_problem() {
        // y is an exact linear combination of the two (correlated) columns,
        // lightly regularized: the gap should end up tiny.
        let x = dense(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2);
        let y = vec![0.0, 1.0, 2.0];
        let mut w = vec![0.0, 0.0];
        let reg = RegStrengths::from_alpha(1e-6, 1.0, 3);
        let out = dense_coordinate_descent(&x, &y, &mut w, reg, 10_000, 1e-10, false).unwrap();
        assert!(out.gap < out.eps_threshold.max(1e-8));
    }
}

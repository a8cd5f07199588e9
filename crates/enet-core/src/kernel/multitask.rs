//! Multi-task (block-sparse) coordinate-descent kernel (§4.1 "Multi-task",
//! §9 "Multi-task block soft-threshold").
//!
//! `W` is row-major per feature (`n_features` rows of `n_tasks` entries); the
//! l1 soft-threshold becomes a row-level `l2`-ball shrinkage, and the dual
//! norm used for convergence is a max *row norm* rather than a max absolute
//! value. This is why it is its own kernel rather than a generalization
//! bolted onto the dense one.

use crate::design_matrix::DenseMatrix;
use crate::error::{EnetError, EnetResult};
use crate::kernel::{KernelOutcome, RegStrengths};

/// Runs cyclic block coordinate descent on a dense multi-task problem.
///
/// `r` and `y` are row-major `(n_samples, n_tasks)` matrices. `w` is
/// row-major `(n_features, n_tasks)` and warm-started in place.
///
/// # Errors
///
/// Returns [`EnetError::NegativeColumnNorm`] if a column's squared norm is
/// negative (corrupted input).
#[allow(clippy::too_many_arguments)]
pub fn multitask_coordinate_descent(
    x: &DenseMatrix,
    y: &[f64],
    w: &mut [f64],
    n_tasks: usize,
    reg: RegStrengths,
    max_iter: usize,
    tol: f64,
) -> EnetResult<KernelOutcome> {
    let n_samples = x.n_samples();
    let n_features = x.n_features();
    debug_assert_eq!(y.len(), n_samples * n_tasks);
    debug_assert_eq!(w.len(), n_features * n_tasks);

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

    // R = Y - X W (row-major (n_samples, n_tasks))
    let mut r = y.to_vec();
    for j in 0..n_features {
        let row = &w[j * n_tasks..(j + 1) * n_tasks];
        if row.iter().any(|&v| v != 0.0) {
            for (i, &xij) in x.column(j).iter().enumerate() {
                if xij == 0.0 {
                    continue;
                }
                for k in 0..n_tasks {
                    r[i * n_tasks + k] -= xij * row[k];
                }
            }
        }
    }

    let mut rho = vec![0.0_f64; n_tasks];
    let mut n_iter = 0usize;
    let mut gap = f64::INFINITY;

    for iter in 1..=max_iter {
        n_iter = iter;
        let mut max_row_norm = 0.0_f64;
        let mut max_row_delta = 0.0_f64;

        for j in 0..n_features {
            let norm_j = norm_cols_x[j];
            let row_start = j * n_tasks;
            if norm_j == 0.0 {
                w[row_start..row_start + n_tasks].fill(0.0);
                continue;
            }

            rho.iter_mut().for_each(|v| *v = 0.0);
            let col = x.column(j);
            for (i, &xij) in col.iter().enumerate() {
                if xij == 0.0 {
                    continue;
                }
                for k in 0..n_tasks {
                    rho[k] += xij * r[i * n_tasks + k];
                }
            }
            for k in 0..n_tasks {
                rho[k] += norm_j * w[row_start + k];
            }

            let rho_norm = rho.iter().map(|v| v * v).sum::<f64>().sqrt();
            let shrink = if rho_norm == 0.0 {
                0.0
            } else {
                (1.0 - reg.l1_reg / rho_norm).max(0.0) / (norm_j + reg.l2_reg)
            };

            let mut row_delta_norm2 = 0.0_f64;
            let mut new_row_norm2 = 0.0_f64;
            for k in 0..n_tasks {
                let new_val = shrink * rho[k];
                let old_val = w[row_start + k];
                let delta = old_val - new_val;
                row_delta_norm2 += delta * delta;
                new_row_norm2 += new_val * new_val;
                if delta != 0.0 {
                    for (i, &xij) in col.iter().enumerate() {
                        if xij != 0.0 {
                            r[i * n_tasks + k] += delta * xij;
                        }
                    }
                }
                w[row_start + k] = new_val;
            }

            max_row_norm = max_row_norm.max(new_row_norm2.sqrt());
            max_row_delta = max_row_delta.max(row_delta_norm2.sqrt());
        }

        let converged_by_delta = max_row_norm > 0.0 && max_row_delta / max_row_norm < tol;
        gap = duality_gap(x, w, &r, y, n_tasks, reg);
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

fn duality_gap(
    x: &DenseMatrix,
    w: &[f64],
    r: &[f64],
    y: &[f64],
    n_tasks: usize,
    reg: RegStrengths,
) -> f64 {
    let n_features = x.n_features();

    let mut dual_norm = 0.0_f64;
    let mut xta_row = vec![0.0_f64; n_tasks];
    for j in 0..n_features {
        xta_row.iter_mut().for_each(|v| *v = 0.0);
        for (i, &xij) in x.column(j).iter().enumerate() {
            if xij == 0.0 {
                continue;
            }
            for k in 0..n_tasks {
                xta_row[k] += xij * r[i * n_tasks + k];
            }
        }
        for k in 0..n_tasks {
            xta_row[k] -= reg.l2_reg * w[j * n_tasks + k];
        }
        let row_norm = xta_row.iter().map(|v| v * v).sum::<f64>().sqrt();
        dual_norm = dual_norm.max(row_norm);
    }

    let r_norm2: f64 = r.iter().map(|v| v * v).sum();
    let ry: f64 = r.iter().zip(y).map(|(a, b)| a * b).sum();
    let p1_w: f64 = (0..n_features)
        .map(|j| {
            w[j * n_tasks..(j + 1) * n_tasks]
                .iter()
                .map(|v| v * v)
                .sum::<f64>()
                .sqrt()
        })
        .sum();
    let w_norm2: f64 = w.iter().map(|v| v * v).sum();

    let const_ = if dual_norm > reg.l1_reg {
        reg.l1_reg / dual_norm
    } else {
        1.0
    };
    let a_norm2 = r_norm2 * const_ * const_;

    0.5 * (r_norm2 + a_norm2) - const_ * ry
        + reg.l1_reg * p1_w
        + 0.5 * reg.l2_reg * (1.0 + const_ * const_) * w_norm2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_matrix::DenseMatrix;

    #[test]
    fn zero_l1_ratio_does_not_produce_nan_on_zero_gradient_row() {
        // A feature column orthogonal to y drives rho to exactly zero for
        // that row; with l1_reg == 0.0 (l1_ratio 0) the shrink factor must
        // not come out as 0.0 / 0.0.
        let x = DenseMatrix::from_column_major(vec![1.0, -1.0, 1.0, -1.0, 0.0, 0.0], 2, 3).unwrap();
        let y = vec![0.0, 0.0, 0.0, 0.0]; // row-major (2 samples, 2 tasks), all zero
        let mut w = vec![0.0; 3 * 2];
        let reg = RegStrengths::from_alpha(0.1, 0.0, 2);
        multitask_coordinate_descent(&x, &y, &mut w, 2, reg, 100, 1e-8).unwrap();
        assert!(w.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn block_sparsity_has_no_mixed_zero_rows() {
        let x = DenseMatrix::from_column_major(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2).unwrap();
        let y = vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]; // row-major (3 samples, 2 tasks)
        let mut w = vec![0.0; 2 * 2];
        let reg = RegStrengths::from_alpha(0.1, 0.5, 3);
        multitask_coordinate_descent(&x, &y, &mut w, 2, reg, 1000, 1e-8).unwrap();

        for j in 0..2 {
            let row = &w[j * 2..(j + 1) * 2];
            let row_norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if row_norm > 0.0 {
                assert!(row.iter().all(|&v| v.abs() > 0.0 || row_norm == 0.0));
            } else {
                assert!(row.iter().all(|&v| v == 0.0));
            }
        }
    }
}

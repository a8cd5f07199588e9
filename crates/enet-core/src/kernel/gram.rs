//! Precomputed-Gram coordinate-descent kernel (§4.1 "Gram").
//!
//! Consumes `G = X^T X` and `Xy = X^T y` only; never touches `X` or a
//! residual vector. `G` is symmetric, so its column `j` doubles as row `j`.

use crate::design_matrix::DenseMatrix;
use crate::error::{EnetError, EnetResult};
use crate::kernel::soft_threshold::{soft_threshold, soft_threshold_positive};
use crate::kernel::{KernelOutcome, RegStrengths};

/// Runs cyclic coordinate descent using only the Gram matrix and `Xy`.
///
/// `y_norm2` must be `||y||^2` for the centered target, supplied by the
/// caller since this kernel never sees `y` itself.
///
/// # Errors
///
/// Returns [`EnetError::NegativeColumnNorm`] if a diagonal entry of `G` is
/// negative (corrupted Gram matrix).
pub fn gram_coordinate_descent(
    g: &DenseMatrix,
    xy: &[f64],
    y_norm2: f64,
    w: &mut [f64],
    reg: RegStrengths,
    max_iter: usize,
    tol: f64,
    positive: bool,
) -> EnetResult<KernelOutcome> {
    let n_features = g.n_features();
    debug_assert_eq!(g.n_samples(), n_features, "Gram matrix must be square");
    debug_assert_eq!(xy.len(), n_features);
    debug_assert_eq!(w.len(), n_features);

    for j in 0..n_features {
        let diag = g.column(j)[j];
        if diag < 0.0 {
            return Err(EnetError::NegativeColumnNorm {
                column: j,
                value: diag,
            });
        }
    }

    let eps_threshold = tol * y_norm2;

    let mut n_iter = 0usize;
    let mut gap = f64::INFINITY;

    for iter in 1..=max_iter {
        n_iter = iter;
        let mut max_w = 0.0_f64;
        let mut max_delta = 0.0_f64;

        for j in 0..n_features {
            let gjj = g.column(j)[j];
            if gjj == 0.0 {
                w[j] = 0.0;
                continue;
            }
            let wj_old = w[j];

            // rho_j = Xy_j - G_{j,.} W + G_{j,j} W_j
            let gw_j: f64 = g.column(j).iter().zip(w.iter()).map(|(&gij, &wi)| gij * wi).sum();
            let rho = xy[j] - gw_j + gjj * wj_old;

            let wj_new = if positive {
                soft_threshold_positive(rho, reg.l1_reg) / (gjj + reg.l2_reg)
            } else {
                soft_threshold(rho, reg.l1_reg) / (gjj + reg.l2_reg)
            };

            w[j] = wj_new;
            max_w = max_w.max(wj_new.abs());
            max_delta = max_delta.max((wj_new - wj_old).abs());
        }

        let converged_by_delta = max_w > 0.0 && max_delta / max_w < tol;
        gap = duality_gap(g, xy, w, y_norm2, reg);
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

fn duality_gap(g: &DenseMatrix, xy: &[f64], w: &[f64], y_norm2: f64, reg: RegStrengths) -> f64 {
    let n_features = g.n_features();

    // r_norm2 = ||y||^2 - 2 W^T Xy + W^T G W  (§4.1 "Gram")
    let wt_xy: f64 = w.iter().zip(xy).map(|(a, b)| a * b).sum();
    let mut wt_g_w = 0.0_f64;
    for j in 0..n_features {
        let gw_j: f64 = g.column(j).iter().zip(w.iter()).map(|(&gij, &wi)| gij * wi).sum();
        wt_g_w += w[j] * gw_j;
    }
    let r_norm2 = (y_norm2 - 2.0 * wt_xy + wt_g_w).max(0.0);

    // XtA_j = (Xy - G W)_j - l2_reg * w_j
    let mut dual_norm = 0.0_f64;
    for j in 0..n_features {
        let gw_j: f64 = g.column(j).iter().zip(w.iter()).map(|(&gij, &wi)| gij * wi).sum();
        let xta_j = (xy[j] - gw_j) - reg.l2_reg * w[j];
        dual_norm = dual_norm.max(xta_j.abs());
    }

    // r.y = ||y||^2 - W^T Xy, since r = y - X W and Xy = X^T y. The rest of
    // the gap formula matches `gap_from_dual_norm` exactly, but that helper
    // takes `r`/`y` slices directly, which the Gram kernel never has.
    let ry = y_norm2 - wt_xy;
    let l1_norm_w: f64 = w.iter().map(|v| v.abs()).sum();
    let w_norm2: f64 = w.iter().map(|v| v * v).sum();

    let const_ = if dual_norm > reg.l1_reg {
        reg.l1_reg / dual_norm
    } else {
        1.0
    };
    let a_norm2 = r_norm2 * const_ * const_;

    0.5 * (r_norm2 + a_norm2) - const_ * ry
        + reg.l1_reg * l1_norm_w
        + 0.5 * reg.l2_reg * (1.0 + const_ * const_) * w_norm2
}

//! Alpha-grid builder (§4.3, C3).

use crate::error::{EnetError, EnetResult};

/// Computes the descending, log-spaced grid of regularization strengths.
///
/// `xy_row_norms` is `|Xy_j|` per feature in the mono-task case, or
/// `||Xy_{j,.}||_2` (norm over the output axis) in the multi-task case —
/// the caller (the pre-fit adapter) has already folded in the sparse-X
/// centering adjustment described in §4.3 before calling this.
///
/// # Errors
///
/// Returns [`EnetError::InvalidEps`] if `eps` is not in `(0, 1)`, or
/// [`EnetError::InvalidL1Ratio`] if `l1_ratio` is outside `[0, 1]`.
pub fn alpha_grid(
    xy_row_norms: &[f64],
    n_samples: usize,
    l1_ratio: f64,
    n_alphas: usize,
    eps: f64,
) -> EnetResult<Vec<f64>> {
    if !(0.0..=1.0).contains(&l1_ratio) {
        return Err(EnetError::InvalidL1Ratio { l1_ratio });
    }
    if !(eps > 0.0 && eps < 1.0) {
        return Err(EnetError::InvalidEps { eps });
    }

    let max_norm = xy_row_norms.iter().cloned().fold(0.0_f64, f64::max);
    // Safety floor against division by zero as l1_ratio -> 0 (pure ridge).
    let l1_floor = l1_ratio.max(1e-3);
    let alpha_max = max_norm / (n_samples as f64 * l1_floor);

    Ok(geomspace_descending(alpha_max, eps, n_alphas))
}

/// `n` log-spaced points from `alpha_max` down to `eps * alpha_max`,
/// strictly descending (contract of §4.3: the grid always starts at
/// `alpha_max`).
fn geomspace_descending(alpha_max: f64, eps: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 || alpha_max == 0.0 {
        return vec![alpha_max; n];
    }
    let log_max = alpha_max.ln();
    let log_min = (alpha_max * eps).ln();
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            (log_max + t * (log_min - log_max)).exp()
        })
        .collect()
}

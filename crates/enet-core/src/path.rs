//! Path engine (§4.2, C2): sweeps a descending alpha-grid, warm-starting `W`
//! between successive points and dispatching to the matching kernel.

use crate::design_matrix::{Coefficients, DesignMatrix, Target};
use crate::error::{EnetError, EnetResult};
use crate::kernel::{
    dense::dense_coordinate_descent, gram::gram_coordinate_descent,
    multitask::multitask_coordinate_descent, sparse::sparse_coordinate_descent, KernelMode,
    KernelOutcome, RegStrengths,
};
use crate::prefit::GramData;

/// One alpha's worth of path history.
#[derive(Debug, Clone)]
pub struct PathPoint {
    pub alpha: f64,
    pub gap: f64,
    pub eps_threshold: f64,
    pub n_iter: usize,
}

impl PathPoint {
    pub fn converged(&self) -> bool {
        self.gap <= self.eps_threshold
    }
}

/// The full path artifact (§3): coefficients and diagnostics at every grid
/// point, in the order `alphas` was given.
pub struct PathResult {
    /// `coefs[k]` is `W` at `alphas[k]`.
    pub coefs: Vec<Coefficients>,
    pub points: Vec<PathPoint>,
}

/// Everything the path engine needs beyond `(X, y, alphas, l1_ratio)` —
/// produced by the pre-fit adapter.
pub struct PathInputs<'a> {
    pub x: &'a DesignMatrix,
    pub y: &'a Target,
    /// Per-column centering shift, only consulted in sparse mode.
    pub x_mean: &'a [f64],
    pub mode: KernelMode,
    pub gram: Option<&'a GramData>,
    pub max_iter: usize,
    pub tol: f64,
    pub positive: bool,
}

/// Runs coordinate descent at every point of `alphas`, warm-starting `W`
/// from the previous point (§4.2: "the entire point of doing a path").
///
/// `coef_init` seeds the first point; pass zeros for a cold start or an
/// existing `coef_` for `warm_start=true` (§4.5).
///
/// # Errors
///
/// Returns [`EnetError::PositiveWithMultiTask`] if `positive` is set under
/// the multi-task kernel (§4.1 rejects it there), or propagates the first
/// kernel error encountered, tagged with the failing alpha's index via
/// [`EnetError`] variants surfaced from the kernel itself.
pub fn run_path(inputs: &PathInputs<'_>, alphas: &[f64], l1_ratio: f64, coef_init: Coefficients) -> EnetResult<PathResult> {
    if inputs.positive && inputs.mode == KernelMode::MultiTask {
        return Err(EnetError::PositiveWithMultiTask);
    }

    let n_samples = inputs.x.n_samples();
    let n_features = inputs.x.n_features();
    let n_tasks = inputs.y.n_tasks();

    let mut w = coef_init;
    let mut coefs = Vec::with_capacity(alphas.len());
    let mut points = Vec::with_capacity(alphas.len());

    for (alpha_index, &alpha) in alphas.iter().enumerate() {
        let reg = RegStrengths::from_alpha(alpha, l1_ratio, n_samples);

        let outcome = dispatch(inputs, &mut w, n_features, n_tasks, reg).map_err(|source| {
            EnetError::PathError {
                alpha_index,
                source: Box::new(source),
            }
        })?;

        if !outcome.converged() {
            log::warn!(
                "coordinate descent did not converge at alpha={alpha:.6e} after {} iterations \
                 (gap={:.3e}, tol*||y||^2={:.3e}); consider increasing max_iter",
                outcome.n_iter,
                outcome.gap,
                outcome.eps_threshold,
            );
        }

        points.push(PathPoint {
            alpha,
            gap: outcome.gap,
            eps_threshold: outcome.eps_threshold,
            n_iter: outcome.n_iter,
        });
        coefs.push(w.clone());
    }

    Ok(PathResult { coefs, points })
}

fn dispatch(
    inputs: &PathInputs<'_>,
    w: &mut Coefficients,
    n_features: usize,
    n_tasks: usize,
    reg: RegStrengths,
) -> EnetResult<KernelOutcome> {
    match inputs.mode {
        KernelMode::Dense => {
            let DesignMatrix::Dense(dense) = inputs.x else {
                unreachable!("pre-fit never selects Dense mode for sparse X")
            };
            let Target::Mono(y) = inputs.y else {
                unreachable!("pre-fit never selects Dense mode for a multi-task target")
            };
            dense_coordinate_descent(
                dense,
                y,
                w.as_mono_mut(),
                reg,
                inputs.max_iter,
                inputs.tol,
                inputs.positive,
            )
        }
        KernelMode::Sparse => {
            let DesignMatrix::Sparse(csc) = inputs.x else {
                unreachable!("pre-fit never selects Sparse mode for dense X")
            };
            let Target::Mono(y) = inputs.y else {
                unreachable!("pre-fit never selects Sparse mode for a multi-task target")
            };
            sparse_coordinate_descent(
                csc,
                y,
                inputs.x_mean,
                w.as_mono_mut(),
                reg,
                inputs.max_iter,
                inputs.tol,
                inputs.positive,
            )
        }
        KernelMode::Gram => {
            let gram = inputs
                .gram
                .expect("pre-fit always supplies GramData when mode == Gram");
            let Target::Mono(y) = inputs.y else {
                unreachable!("pre-fit never selects Gram mode for a multi-task target")
            };
            let y_norm2: f64 = y.iter().map(|v| v * v).sum();
            gram_coordinate_descent(
                &gram.gram,
                &gram.xy,
                y_norm2,
                w.as_mono_mut(),
                reg,
                inputs.max_iter,
                inputs.tol,
                inputs.positive,
            )
        }
        KernelMode::MultiTask => {
            let DesignMatrix::Dense(dense) = inputs.x else {
                unreachable!("pre-fit never selects MultiTask mode for sparse X")
            };
            let Target::Multi { data, n_tasks: yt } = inputs.y else {
                unreachable!("pre-fit never selects MultiTask mode for a mono-task target")
            };
            debug_assert_eq!(*yt, n_tasks);
            let Coefficients::Multi { data: wdata, .. } = w else {
                unreachable!("pre-fit never selects MultiTask mode with mono coefficients")
            };
            debug_assert_eq!(wdata.len(), n_features * n_tasks);
            multitask_coordinate_descent(dense, data, wdata, n_tasks, reg, inputs.max_iter, inputs.tol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_matrix::DenseMatrix;

    #[test]
    fn warm_start_reduces_total_iterations_vs_cold_restart() {
        let x = DesignMatrix::Dense(
            DenseMatrix::from_column_major(vec![1.0, 2.0, 3.0, 4.0, 2.0, 1.0, 0.0, -1.0], 4, 2)
                .unwrap(),
        );
        let y = Target::Mono(vec![3.0, 4.0, 2.0, 1.0]);
        let alphas = vec![1.0, 0.5, 0.1, 0.05, 0.01];

        let inputs = PathInputs {
            x: &x,
            y: &y,
            x_mean: &[0.0, 0.0],
            mode: KernelMode::Dense,
            gram: None,
            max_iter: 1000,
            tol: 1e-7,
            positive: false,
        };

        let warm = run_path(&inputs, &alphas, 0.5, Coefficients::zeros_mono(2)).unwrap();
        let warm_total: usize = warm.points.iter().map(|p| p.n_iter).sum();

        let mut cold_total = 0usize;
        for &alpha in &alphas {
            let single = run_path(&inputs, &[alpha], 0.5, Coefficients::zeros_mono(2)).unwrap();
            cold_total += single.points[0].n_iter;
        }

        assert!(warm_total <= cold_total);
    }

    #[test]
    fn rejects_positive_constraint_under_multitask() {
        let x = DesignMatrix::Dense(DenseMatrix::from_column_major(vec![1.0, 2.0], 2, 1).unwrap());
        let y = Target::Multi {
            data: vec![1.0, 2.0, 3.0, 4.0],
            n_tasks: 2,
        };
        let inputs = PathInputs {
            x: &x,
            y: &y,
            x_mean: &[0.0],
            mode: KernelMode::MultiTask,
            gram: None,
            max_iter: 10,
            tol: 1e-4,
            positive: true,
        };
        let err = run_path(&inputs, &[0.1], 0.5, Coefficients::zeros_multi(1, 2)).unwrap_err();
        assert!(matches!(err, EnetError::PositiveWithMultiTask));
    }
}

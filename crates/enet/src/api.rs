//! Free-function API (§6): `enet_path` / `lasso_path`.

use enet_core::{
    alpha_grid, linalg, pre_fit, run_path, Coefficients, DesignMatrix, EnetResult, PathInputs,
    PrecomputeOption, Target,
};

/// Parameters for [`enet_path`] beyond `(X, y, l1_ratio)`.
pub struct PathParams {
    pub eps: f64,
    pub n_alphas: usize,
    /// Explicit alpha grid; when `None`, one is built from the data (§4.3).
    pub alphas: Option<Vec<f64>>,
    pub fit_intercept: bool,
    pub normalize: bool,
    pub precompute: PrecomputeOption,
    pub coef_init: Option<Coefficients>,
    pub max_iter: usize,
    pub tol: f64,
    pub positive: bool,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            eps: 1e-3,
            n_alphas: 100,
            alphas: None,
            fit_intercept: true,
            normalize: false,
            precompute: PrecomputeOption::Auto,
            coef_init: None,
            max_iter: 1000,
            tol: 1e-4,
            positive: false,
        }
    }
}

/// The output of a path fit (§6): alphas paired with their coefficients and
/// per-point diagnostics.
pub struct Path {
    pub alphas: Vec<f64>,
    pub coefs: Vec<Coefficients>,
    pub gaps: Vec<f64>,
    pub n_iters: Vec<usize>,
}

/// Computes the elastic-net regularization path for a fixed `l1_ratio`
/// (§4.2, §6). `l1_ratio=1.0` is the lasso path ([`lasso_path`]).
///
/// # Errors
///
/// Propagates validation and kernel errors from the pre-fit adapter and
/// path engine, tagged with the failing alpha's position in the grid.
pub fn enet_path(
    x: DesignMatrix,
    y: Target,
    l1_ratio: f64,
    params: PathParams,
) -> EnetResult<Path> {
    let n_features = x.n_features();
    let n_tasks = y.n_tasks();
    let multi = y.is_multi();

    let fit = pre_fit(x, y, params.fit_intercept, params.normalize, params.precompute)?;

    let alphas = match params.alphas {
        Some(a) => a,
        None => {
            let xy = fit
                .gram
                .as_ref()
                .map(|g| g.xy.clone())
                .unwrap_or_else(|| linalg::cross_products(&fit.x, &fit.y));
            let row_norms = xy_row_norms(&xy, n_features, n_tasks, multi);
            alpha_grid(&row_norms, fit.x.n_samples(), l1_ratio, params.n_alphas, params.eps)?
        }
    };

    let coef_init = params.coef_init.unwrap_or_else(|| {
        if multi {
            Coefficients::zeros_multi(n_features, n_tasks)
        } else {
            Coefficients::zeros_mono(n_features)
        }
    });

    let inputs = PathInputs {
        x: &fit.x,
        y: &fit.y,
        x_mean: &fit.x_mean,
        mode: fit.mode,
        gram: fit.gram.as_ref(),
        max_iter: params.max_iter,
        tol: params.tol,
        positive: params.positive,
    };
    let result = run_path(&inputs, &alphas, l1_ratio, coef_init)?;

    Ok(Path {
        alphas,
        coefs: result.coefs,
        gaps: result.points.iter().map(|p| p.gap).collect(),
        n_iters: result.points.iter().map(|p| p.n_iter).collect(),
    })
}

/// `enet_path` with `l1_ratio` pinned to `1.0` (§6).
pub fn lasso_path(x: DesignMatrix, y: Target, params: PathParams) -> EnetResult<Path> {
    enet_path(x, y, 1.0, params)
}

fn xy_row_norms(xy: &[f64], n_features: usize, n_tasks: usize, multi: bool) -> Vec<f64> {
    if !multi {
        return xy.to_vec();
    }
    (0..n_features)
        .map(|j| xy[j * n_tasks..(j + 1) * n_tasks].iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect()
}

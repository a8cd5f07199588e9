//! CV driver (§4.5, C5): Cartesian product of `l1_ratio x fold` jobs,
//! executed on a bounded worker pool, aggregated into `MSE[l1_ratio, fold, alpha]`.

use enet_core::{alpha_grid, linalg, pre_fit, run_path, Coefficients, DesignMatrix, EnetError, EnetResult, PathInputs, PrecomputeOption, Target};
use rayon::prelude::*;

use super::fold::KFold;

/// Inputs to a full CV sweep (§4.5).
pub struct CvParams {
    pub l1_ratios: Vec<f64>,
    pub eps: f64,
    pub n_alphas: usize,
    pub fold: KFold,
    pub fit_intercept: bool,
    pub normalize: bool,
    pub max_iter: usize,
    pub tol: f64,
    /// `Some(k)` bounds the worker pool to `k` threads; `None` uses the
    /// global rayon pool (all cores), per §5.
    pub n_jobs: Option<usize>,
}

/// Result of a CV sweep: the selected hyperparameters plus the full MSE
/// grid for diagnostics (`mse_path_`, §6).
pub struct CvResult {
    pub alpha_: f64,
    pub l1_ratio_: f64,
    pub alphas_: Vec<Vec<f64>>,
    /// `mse_path_[l1_ratio_index][fold_index][alpha_index]`.
    pub mse_path_: Vec<Vec<Vec<f64>>>,
}

struct Job {
    l1_ratio_index: usize,
    fold_index: usize,
    l1_ratio: f64,
    train: Vec<usize>,
    test: Vec<usize>,
}

/// Runs the full CV sweep over `(l1_ratio, fold)` and selects the
/// `(l1_ratio, alpha)` pair minimizing mean test MSE (§4.5 step 4).
///
/// # Errors
///
/// Returns the first job's [`EnetError`], tagged with its `(l1_ratio_index,
/// fold_index)`, if any job's pre-fit or path run fails.
pub fn fit_cv(x: &DesignMatrix, y: &Target, params: &CvParams) -> EnetResult<CvResult> {
    let n_samples = x.n_samples();
    let folds = params.fold.split(n_samples);

    // Build one alpha-grid per l1_ratio on the full data so every fold
    // evaluates at identical alpha values (§4.5 step 1).
    let alphas_per_ratio: Vec<Vec<f64>> = params
        .l1_ratios
        .iter()
        .map(|&l1_ratio| full_data_grid(x, y, l1_ratio, params))
        .collect::<EnetResult<_>>()?;

    let jobs: Vec<Job> = params
        .l1_ratios
        .iter()
        .enumerate()
        .flat_map(|(li, &l1_ratio)| {
            folds
                .iter()
                .enumerate()
                .map(move |(fi, (train, test))| Job {
                    l1_ratio_index: li,
                    fold_index: fi,
                    l1_ratio,
                    train: train.clone(),
                    test: test.clone(),
                })
        })
        .collect();

    let run_job = |job: &Job| -> EnetResult<(usize, usize, Vec<f64>)> {
        let alphas = &alphas_per_ratio[job.l1_ratio_index];
        let mse = evaluate_fold(x, y, job.l1_ratio, alphas, &job.train, &job.test, params).map_err(
            |source| EnetError::CvError {
                l1_ratio_index: job.l1_ratio_index,
                fold_index: job.fold_index,
                source: Box::new(source),
            },
        )?;
        Ok((job.l1_ratio_index, job.fold_index, mse))
    };

    let results: Vec<EnetResult<(usize, usize, Vec<f64>)>> = if let Some(n_jobs) = params.n_jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .build()
            .expect("thread pool construction with a positive thread count cannot fail");
        pool.install(|| jobs.par_iter().map(run_job).collect())
    } else {
        jobs.par_iter().map(run_job).collect()
    };

    // Ordering guarantee (§4.5): results are placed at fixed indices
    // regardless of completion order, not relying on `results` order.
    let n_l1 = params.l1_ratios.len();
    let n_folds = folds.len();
    let mut mse_path_ = vec![vec![Vec::new(); n_folds]; n_l1];
    for result in results {
        let (li, fi, mse) = result?;
        mse_path_[li][fi] = mse;
    }

    let mut best = (f64::INFINITY, 0usize, 0usize);
    for (li, per_ratio) in mse_path_.iter().enumerate() {
        let n_alphas = alphas_per_ratio[li].len();
        for ai in 0..n_alphas {
            let mean_mse: f64 = per_ratio.iter().map(|fold_mse| fold_mse[ai]).sum::<f64>() / n_folds as f64;
            if mean_mse < best.0 {
                best = (mean_mse, li, ai);
            }
        }
    }

    let (_, best_li, best_ai) = best;
    Ok(CvResult {
        alpha_: alphas_per_ratio[best_li][best_ai],
        l1_ratio_: params.l1_ratios[best_li],
        alphas_: alphas_per_ratio,
        mse_path_,
    })
}

fn full_data_grid(
    x: &DesignMatrix,
    y: &Target,
    l1_ratio: f64,
    params: &CvParams,
) -> EnetResult<Vec<f64>> {
    let fit = pre_fit(
        x.clone(),
        y.clone(),
        params.fit_intercept,
        params.normalize,
        PrecomputeOption::Auto,
    )?;
    let xy = fit
        .gram
        .as_ref()
        .map(|g| g.xy.clone())
        .unwrap_or_else(|| linalg::cross_products(&fit.x, &fit.y));
    let row_norms = if y.is_multi() {
        let n_tasks = y.n_tasks();
        (0..x.n_features())
            .map(|j| xy[j * n_tasks..(j + 1) * n_tasks].iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect()
    } else {
        xy
    };
    alpha_grid(&row_norms, fit.x.n_samples(), l1_ratio, params.n_alphas, params.eps)
}

/// One `(l1_ratio, fold)` job (§4.5 step 3): pre-fit on train only, run the
/// path, undo normalization, score every alpha's test-set MSE.
fn evaluate_fold(
    x: &DesignMatrix,
    y: &Target,
    l1_ratio: f64,
    alphas: &[f64],
    train: &[usize],
    test: &[usize],
    params: &CvParams,
) -> EnetResult<Vec<f64>> {
    let (x_train, y_train) = slice(x, y, train);
    let (x_test, y_test) = slice(x, y, test);

    let n_features = x.n_features();
    let n_tasks = y.n_tasks();
    let multi = y.is_multi();

    let fit = pre_fit(x_train, y_train, params.fit_intercept, params.normalize, PrecomputeOption::Auto)?;

    let coef_init = if multi {
        Coefficients::zeros_multi(n_features, n_tasks)
    } else {
        Coefficients::zeros_mono(n_features)
    };

    let inputs = PathInputs {
        x: &fit.x,
        y: &fit.y,
        x_mean: &fit.x_mean,
        mode: fit.mode,
        gram: fit.gram.as_ref(),
        max_iter: params.max_iter,
        tol: params.tol,
        positive: false,
    };
    let path = run_path(&inputs, alphas, l1_ratio, coef_init)?;

    let mse = path
        .coefs
        .iter()
        .map(|w_scaled| {
            let w = unscale(w_scaled, fit.x_std.as_deref());
            score_mse(&x_test, &y_test, &w, &fit.x_mean, &fit.y_mean, n_tasks, multi)
        })
        .collect();
    Ok(mse)
}

fn unscale(w: &Coefficients, x_std: Option<&[f64]>) -> Coefficients {
    let Some(std) = x_std else { return w.clone() };
    match w.clone() {
        Coefficients::Mono(mut v) => {
            for (vj, &s) in v.iter_mut().zip(std) {
                *vj /= s;
            }
            Coefficients::Mono(v)
        }
        Coefficients::Multi { mut data, n_features, n_tasks } => {
            for j in 0..n_features {
                let s = std[j];
                for k in 0..n_tasks {
                    data[j * n_tasks + k] /= s;
                }
            }
            Coefficients::Multi { data, n_features, n_tasks }
        }
    }
}

fn score_mse(
    x_test: &DesignMatrix,
    y_test: &Target,
    w: &Coefficients,
    x_mean: &[f64],
    y_mean: &[f64],
    n_tasks: usize,
    multi: bool,
) -> f64 {
    let n_samples = x_test.n_samples();
    if !multi {
        let wv = w.as_mono();
        let intercept = y_mean[0] - x_mean.iter().zip(wv).map(|(&m, &wj)| m * wj).sum::<f64>();
        let Target::Mono(yt) = y_test else { unreachable!() };
        let sse: f64 = (0..n_samples)
            .map(|i| {
                let pred = intercept + (0..wv.len()).map(|j| column_value(x_test, j, i) * wv[j]).sum::<f64>();
                (pred - yt[i]).powi(2)
            })
            .sum();
        sse / n_samples as f64
    } else {
        let n_features = w.n_features();
        let intercept: Vec<f64> = (0..n_tasks)
            .map(|k| y_mean[k] - (0..n_features).map(|j| x_mean[j] * w.row(j)[k]).sum::<f64>())
            .collect();
        let mut sse = 0.0;
        for i in 0..n_samples {
            for k in 0..n_tasks {
                let pred = intercept[k]
                    + (0..n_features).map(|j| column_value(x_test, j, i) * w.row(j)[k]).sum::<f64>();
                let actual = y_test.task_row(i)[k];
                sse += (pred - actual).powi(2);
            }
        }
        sse / (n_samples * n_tasks) as f64
    }
}

fn column_value(x: &DesignMatrix, j: usize, i: usize) -> f64 {
    match x {
        DesignMatrix::Dense(d) => d.column(j)[i],
        DesignMatrix::Sparse(s) => s.column(j).find(|&(row, _)| row == i).map_or(0.0, |(_, v)| v),
    }
}

fn slice(x: &DesignMatrix, y: &Target, indices: &[usize]) -> (DesignMatrix, Target) {
    let n_features = x.n_features();
    let x_sliced = match x {
        DesignMatrix::Dense(d) => {
            let mut data = vec![0.0; indices.len() * n_features];
            for j in 0..n_features {
                let col = d.column(j);
                for (row, &i) in indices.iter().enumerate() {
                    data[j * indices.len() + row] = col[i];
                }
            }
            DesignMatrix::Dense(
                enet_core::DenseMatrix::from_column_major(data, indices.len(), n_features)
                    .expect("slicing finite data stays finite"),
            )
        }
        DesignMatrix::Sparse(s) => {
            let mut position = vec![usize::MAX; x.n_samples()];
            for (new_row, &old_row) in indices.iter().enumerate() {
                position[old_row] = new_row;
            }
            let mut data = Vec::new();
            let mut row_indices = Vec::new();
            let mut col_ptr = vec![0u32];
            for j in 0..n_features {
                for (old_row, v) in s.column(j) {
                    if position[old_row] != usize::MAX {
                        data.push(v);
                        row_indices.push(position[old_row] as u32);
                    }
                }
                col_ptr.push(data.len() as u32);
            }
            DesignMatrix::Sparse(
                enet_core::CscMatrix::new(data, row_indices, col_ptr, indices.len())
                    .expect("slicing finite data stays finite"),
            )
        }
    };

    let y_sliced = match y {
        Target::Mono(v) => Target::Mono(indices.iter().map(|&i| v[i]).collect()),
        Target::Multi { n_tasks, .. } => {
            let data = indices.iter().flat_map(|&i| y.task_row(i).to_vec()).collect();
            Target::Multi { data, n_tasks: *n_tasks }
        }
    };

    (x_sliced, y_sliced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use enet_core::DenseMatrix;

    #[test]
    fn cv_is_deterministic_given_a_seed() {
        let x = DesignMatrix::Dense(
            DenseMatrix::from_column_major(
                (0..40).map(|i| i as f64 * 0.37 % 5.0).collect(),
                20,
                2,
            )
            .unwrap(),
        );
        let y = Target::Mono((0..20).map(|i| (i as f64) * 0.5 - 3.0).collect());
        let params = CvParams {
            l1_ratios: vec![0.5, 1.0],
            eps: 1e-3,
            n_alphas: 10,
            fold: KFold::new(5, Some(1)),
            fit_intercept: true,
            normalize: false,
            max_iter: 500,
            tol: 1e-4,
            n_jobs: Some(2),
        };
        let a = fit_cv(&x, &y, &params).unwrap();
        let b = fit_cv(&x, &y, &params).unwrap();
        assert_eq!(a.alpha_, b.alpha_);
        assert_eq!(a.l1_ratio_, b.l1_ratio_);
    }
}

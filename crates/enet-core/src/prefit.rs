//! Pre-fit adapter (§4.4, C4): centering/scaling and precompute-mode choice.
//!
//! Pure preprocessing — no coordinate descent happens here. The output is
//! everything the path engine (C2) needs to dispatch straight into a kernel.

use crate::design_matrix::{CscMatrix, DenseMatrix, DesignMatrix, Target};
use crate::error::{EnetError, EnetResult};
use crate::kernel::KernelMode;

/// The `precompute` knob from §4.4/§6 (`True | False | 'auto' | array-like`).
#[derive(Debug, Clone)]
pub enum PrecomputeOption {
    Auto,
    Always,
    Never,
    /// User-supplied `(G, Xy)`. Per the §9 Open Question, a user-supplied
    /// Gram/Xy pair is honored unconditionally, without re-validating it
    /// against the data — see `DESIGN.md` for the rationale.
    Given { gram: DenseMatrix, xy: Vec<f64> },
}

/// Precomputed cross-products the path engine may need.
#[derive(Debug, Clone)]
pub struct GramData {
    pub gram: DenseMatrix,
    /// `X^T y`: length `n_features` (mono) or `n_features * n_tasks`,
    /// row-major over tasks (`xy[j * n_tasks + k]`).
    pub xy: Vec<f64>,
}

/// Output of the pre-fit adapter.
pub struct PreFit {
    pub x: DesignMatrix,
    pub y: Target,
    pub x_mean: Vec<f64>,
    pub y_mean: Vec<f64>,
    pub x_std: Option<Vec<f64>>,
    pub mode: KernelMode,
    pub gram: Option<GramData>,
}

/// Centers (and optionally normalizes) `X`/`y` in place and decides the
/// kernel dispatch mode (§4.4).
///
/// # Errors
///
/// Returns [`EnetError::SampleMismatch`] if `X` and `y` disagree on sample
/// count, or [`EnetError::GramWithSparse`] if `precompute` asks for a Gram
/// matrix over a sparse `X`.
pub fn pre_fit(
    mut x: DesignMatrix,
    mut y: Target,
    fit_intercept: bool,
    normalize: bool,
    precompute: PrecomputeOption,
) -> EnetResult<PreFit> {
    if x.n_samples() != y.n_samples() {
        return Err(EnetError::SampleMismatch {
            n_samples_x: x.n_samples(),
            n_samples_y: y.n_samples(),
        });
    }
    if matches!(precompute, PrecomputeOption::Always | PrecomputeOption::Given { .. })
        && x.is_sparse()
    {
        return Err(EnetError::GramWithSparse);
    }

    let n_features = x.n_features();
    let n_samples = x.n_samples();
    let n_tasks = y.n_tasks();

    let y_mean = if fit_intercept {
        center_target(&mut y)
    } else {
        vec![0.0; n_tasks]
    };

    let (x_mean, x_std) = match &mut x {
        DesignMatrix::Dense(dense) => {
            let means = if fit_intercept {
                dense.center_columns()
            } else {
                vec![0.0; n_features]
            };
            let std = if normalize {
                Some(normalize_dense(dense))
            } else {
                None
            };
            (means, std)
        }
        DesignMatrix::Sparse(csc) => {
            let mut means = if fit_intercept {
                sparse_column_means(csc, n_samples)
            } else {
                vec![0.0; n_features]
            };
            let std = if normalize {
                let stds = normalize_sparse(csc, &means);
                for (mean, std) in means.iter_mut().zip(&stds) {
                    *mean /= std;
                }
                Some(stds)
            } else {
                None
            };
            (means, std)
        }
    };

    let mode = decide_mode(&x, y.is_multi(), &precompute);

    let gram = match precompute {
        PrecomputeOption::Given { gram, xy } => Some(GramData { gram, xy }),
        _ if mode == KernelMode::Gram => {
            let DesignMatrix::Dense(dense) = &x else {
                unreachable!("decide_mode never selects Gram for sparse X")
            };
            Some(build_gram(dense, &y, n_tasks))
        }
        _ => None,
    };

    Ok(PreFit {
        x,
        y,
        x_mean,
        y_mean,
        x_std,
        mode,
        gram,
    })
}

fn center_target(y: &mut Target) -> Vec<f64> {
    match y {
        Target::Mono(v) => {
            let mean = v.iter().sum::<f64>() / v.len() as f64;
            for val in v.iter_mut() {
                *val -= mean;
            }
            vec![mean]
        }
        Target::Multi { data, n_tasks } => {
            let n_samples = data.len() / *n_tasks;
            let mut means = vec![0.0; *n_tasks];
            for i in 0..n_samples {
                for k in 0..*n_tasks {
                    means[k] += data[i * *n_tasks + k];
                }
            }
            for m in means.iter_mut() {
                *m /= n_samples as f64;
            }
            for i in 0..n_samples {
                for k in 0..*n_tasks {
                    data[i * *n_tasks + k] -= means[k];
                }
            }
            means
        }
    }
}

fn normalize_dense(dense: &mut DenseMatrix) -> Vec<f64> {
    let n_samples = dense.n_samples() as f64;
    let mut stds = Vec::with_capacity(dense.n_features());
    for j in 0..dense.n_features() {
        let col = dense.column_mut(j);
        let var = col.iter().map(|v| v * v).sum::<f64>() / n_samples;
        let std = var.sqrt();
        let std = if std == 0.0 { 1.0 } else { std };
        for v in col.iter_mut() {
            *v /= std;
        }
        stds.push(std);
    }
    stds
}

fn sparse_column_means(csc: &CscMatrix, n_samples: usize) -> Vec<f64> {
    (0..csc.n_features())
        .map(|j| csc.column(j).map(|(_, v)| v).sum::<f64>() / n_samples as f64)
        .collect()
}

/// Scales nonzero entries of every column by `1 / std_j` in place — this
/// keeps the matrix sparse (§9: "physically centering a sparse X would
/// densify it"; scaling by a constant does not). Returns the per-column
/// `std_j`; callers must also divide `means[j] /= std_j` to keep the
/// caller's `mean` vector paired with the now-rescaled column, since
/// `mean(x / std) = mean(x) / std`.
fn normalize_sparse(csc: &mut CscMatrix, means: &[f64]) -> Vec<f64> {
    let n_features = csc.n_features();
    let mut stds = Vec::with_capacity(n_features);
    for j in 0..n_features {
        let mean = means[j];
        let sum_sq: f64 = csc.column(j).map(|(_, v)| v * v).sum();
        let n_samples = csc.n_samples() as f64;
        let var = sum_sq / n_samples - mean * mean;
        let std = var.max(0.0).sqrt();
        let std = if std == 0.0 { 1.0 } else { std };
        stds.push(std);
    }
    csc.scale_columns_in_place(&stds);
    stds
}

fn decide_mode(x: &DesignMatrix, multi_output: bool, precompute: &PrecomputeOption) -> KernelMode {
    if multi_output {
        return KernelMode::MultiTask;
    }
    if x.is_sparse() {
        return KernelMode::Sparse;
    }
    match precompute {
        PrecomputeOption::Never => KernelMode::Dense,
        PrecomputeOption::Always | PrecomputeOption::Given { .. } => KernelMode::Gram,
        PrecomputeOption::Auto => {
            if x.n_samples() > x.n_features() {
                KernelMode::Gram
            } else {
                KernelMode::Dense
            }
        }
    }
}

fn build_gram(x: &DenseMatrix, y: &Target, n_tasks: usize) -> GramData {
    let p = x.n_features();
    let mut gram_data = vec![0.0; p * p];
    for j in 0..p {
        for k in 0..p {
            let dot: f64 = x.column(j).iter().zip(x.column(k)).map(|(&a, &b)| a * b).sum();
            gram_data[j * p + k] = dot;
        }
    }
    let gram = DenseMatrix::from_column_major(gram_data, p, p).unwrap();

    let xy = match y {
        Target::Mono(yv) => (0..p)
            .map(|j| x.column(j).iter().zip(yv).map(|(&a, &b)| a * b).sum())
            .collect(),
        Target::Multi { .. } => {
            debug_assert_eq!(n_tasks, y.n_tasks());
            (0..p)
                .flat_map(|j| {
                    (0..n_tasks).map(move |k| {
                        x.column(j)
                            .iter()
                            .enumerate()
                            .map(|(i, &xij)| xij * y.task_row(i)[k])
                            .sum::<f64>()
                    })
                })
                .collect()
        }
    };
    GramData { gram, xy }
}

//! Minimal `safe_dot`-style collaborator (§4.7): dot products and squared
//! column norms specialized per [`DesignMatrix`] variant, used by the path
//! engine to build the inputs a kernel's sweep loop expects (`Xy`, `Gram`,
//! `||X_j||^2`) without duplicating that logic at every call site.
//!
//! Kept separate from the kernels themselves: kernels take raw slices in
//! their hot loop and never call through here.

use crate::design_matrix::{DenseMatrix, DesignMatrix, Target};

/// `X_j . v` for dense or sparse `X`, column `j` against an arbitrary slice.
pub fn column_dot(x: &DesignMatrix, j: usize, v: &[f64]) -> f64 {
    match x {
        DesignMatrix::Dense(d) => d.column(j).iter().zip(v).map(|(&a, &b)| a * b).sum(),
        DesignMatrix::Sparse(s) => s.column(j).map(|(i, val)| val * v[i]).sum(),
    }
}

/// `||X_j||^2` for dense or sparse `X`.
pub fn column_squared_norm(x: &DesignMatrix, j: usize) -> f64 {
    match x {
        DesignMatrix::Dense(d) => d.column(j).iter().map(|v| v * v).sum(),
        DesignMatrix::Sparse(s) => s.column(j).map(|(_, v)| v * v).sum(),
    }
}

/// `X^T y`, mono- or multi-task, dense or sparse `X`. Row-major over tasks
/// in the multi-task case (`xy[j * n_tasks + k]`), matching [`Coefficients`]
/// layout.
///
/// [`Coefficients`]: crate::design_matrix::Coefficients
pub fn cross_products(x: &DesignMatrix, y: &Target) -> Vec<f64> {
    let n_features = x.n_features();
    match y {
        Target::Mono(yv) => (0..n_features).map(|j| column_dot(x, j, yv)).collect(),
        Target::Multi { n_tasks, .. } => {
            let mut out = vec![0.0; n_features * n_tasks];
            for j in 0..n_features {
                for k in 0..*n_tasks {
                    let col_k: Vec<f64> = (0..y.n_samples()).map(|i| y.task_row(i)[k]).collect();
                    out[j * n_tasks + k] = column_dot(x, j, &col_k);
                }
            }
            out
        }
    }
}

/// Plain dense dot product, used where both operands are already
/// materialized (e.g. Gram-kernel cross terms).
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

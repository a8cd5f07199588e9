//! The design matrix `X` in its three accepted storage modes (§3).

use crate::error::{EnetError, EnetResult};

/// Dense, column-major design matrix: `data[j * n_samples + i]` is row `i`,
/// column `j`. Column-major so the inner CD loop scans one contiguous column.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    data: Vec<f64>,
    n_samples: usize,
    n_features: usize,
}

impl DenseMatrix {
    /// Builds a dense matrix from column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`EnetError::NonFinite`] if any entry is NaN or infinite.
    pub fn from_column_major(
        data: Vec<f64>,
        n_samples: usize,
        n_features: usize,
    ) -> EnetResult<Self> {
        assert_eq!(data.len(), n_samples * n_features);
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(EnetError::NonFinite { field: "X", index });
        }
        Ok(Self {
            data,
            n_samples,
            n_features,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn column(&self, j: usize) -> &[f64] {
        &self.data[j * self.n_samples..(j + 1) * self.n_samples]
    }

    pub fn column_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.data[j * self.n_samples..(j + 1) * self.n_samples]
    }

    /// Centers every column in place and returns the per-feature means.
    pub fn center_columns(&mut self) -> Vec<f64> {
        let mut means = Vec::with_capacity(self.n_features);
        let n = self.n_samples as f64;
        for j in 0..self.n_features {
            let mean = self.column(j).iter().sum::<f64>() / n;
            for v in self.column_mut(j) {
                *v -= mean;
            }
            means.push(mean);
        }
        means
    }
}

/// Compressed sparse column design matrix (§3). Never physically centered:
/// callers carry `X_mean`/`X_std` side vectors and the sparse kernel applies
/// the centering shift implicitly (§9).
#[derive(Debug, Clone)]
pub struct CscMatrix {
    data: Vec<f64>,
    row_indices: Vec<u32>,
    col_ptr: Vec<u32>,
    n_samples: usize,
}

impl CscMatrix {
    pub fn new(
        data: Vec<f64>,
        row_indices: Vec<u32>,
        col_ptr: Vec<u32>,
        n_samples: usize,
    ) -> EnetResult<Self> {
        assert_eq!(data.len(), row_indices.len());
        assert!(col_ptr.len() >= 1);
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(EnetError::NonFinite { field: "X", index });
        }
        Ok(Self {
            data,
            row_indices,
            col_ptr,
            n_samples,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_features(&self) -> usize {
        self.col_ptr.len() - 1
    }

    /// Nonzero `(row, value)` pairs of column `j`, in row order.
    pub fn column(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.col_ptr[j] as usize;
        let end = self.col_ptr[j + 1] as usize;
        self.row_indices[start..end]
            .iter()
            .zip(self.data[start..end].iter())
            .map(|(&r, &v)| (r as usize, v))
    }

    pub fn column_nnz(&self, j: usize) -> usize {
        (self.col_ptr[j + 1] - self.col_ptr[j]) as usize
    }

    /// Divides every nonzero entry of column `j` by `scales[j]` in place.
    /// Preserves sparsity since scaling by a nonzero constant never
    /// introduces or removes zeros.
    pub fn scale_columns_in_place(&mut self, scales: &[f64]) {
        for j in 0..self.n_features() {
            let start = self.col_ptr[j] as usize;
            let end = self.col_ptr[j + 1] as usize;
            let scale = scales[j];
            for v in &mut self.data[start..end] {
                *v /= scale;
            }
        }
    }
}

/// The design matrix in any of its three accepted modes.
///
/// Modeled as a tagged variant per the §9 design note ("duck-typed
/// multimethod dispatch" in the source becomes a single `match` here) so the
/// four kernels never share state between modes.
#[derive(Debug, Clone)]
pub enum DesignMatrix {
    Dense(DenseMatrix),
    Sparse(CscMatrix),
}

impl DesignMatrix {
    pub fn n_samples(&self) -> usize {
        match self {
            DesignMatrix::Dense(m) => m.n_samples(),
            DesignMatrix::Sparse(m) => m.n_samples(),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            DesignMatrix::Dense(m) => m.n_features(),
            DesignMatrix::Sparse(m) => m.n_features(),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, DesignMatrix::Sparse(_))
    }
}

/// The regression target `y`, mono- or multi-task (§3).
#[derive(Debug, Clone)]
pub enum Target {
    /// Shape `(n_samples,)`.
    Mono(Vec<f64>),
    /// Shape `(n_samples, n_tasks)`, stored row-major over samples
    /// (`data[i * n_tasks + k]` is sample `i`, task `k`).
    Multi { data: Vec<f64>, n_tasks: usize },
}

impl Target {
    pub fn n_samples(&self) -> usize {
        match self {
            Target::Mono(v) => v.len(),
            Target::Multi { data, n_tasks } => data.len() / n_tasks.max(1),
        }
    }

    pub fn n_tasks(&self) -> usize {
        match self {
            Target::Mono(_) => 1,
            Target::Multi { n_tasks, .. } => *n_tasks,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Target::Multi { .. })
    }

    /// Row `i` of a multi-task target; panics (via slicing) on a mono target.
    pub fn task_row(&self, i: usize) -> &[f64] {
        match self {
            Target::Mono(_) => panic!("task_row called on a mono-task target"),
            Target::Multi { data, n_tasks } => &data[i * n_tasks..(i + 1) * n_tasks],
        }
    }
}

/// Coefficient state `W` (§3): a vector in mono-task mode, a
/// features-by-tasks matrix (task axis innermost) in multi-task mode.
#[derive(Debug, Clone)]
pub enum Coefficients {
    Mono(Vec<f64>),
    Multi {
        /// `data[j * n_tasks + k]` is feature `j`, task `k`.
        data: Vec<f64>,
        n_features: usize,
        n_tasks: usize,
    },
}

impl Coefficients {
    pub fn zeros_mono(n_features: usize) -> Self {
        Coefficients::Mono(vec![0.0; n_features])
    }

    pub fn zeros_multi(n_features: usize, n_tasks: usize) -> Self {
        Coefficients::Multi {
            data: vec![0.0; n_features * n_tasks],
            n_features,
            n_tasks,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Coefficients::Mono(v) => v.len(),
            Coefficients::Multi { n_features, .. } => *n_features,
        }
    }

    pub fn as_mono(&self) -> &[f64] {
        match self {
            Coefficients::Mono(v) => v,
            Coefficients::Multi { .. } => panic!("as_mono called on multi-task coefficients"),
        }
    }

    pub fn as_mono_mut(&mut self) -> &mut [f64] {
        match self {
            Coefficients::Mono(v) => v,
            Coefficients::Multi { .. } => panic!("as_mono_mut called on multi-task coefficients"),
        }
    }

    pub fn row(&self, j: usize) -> &[f64] {
        match self {
            Coefficients::Mono(_) => panic!("row called on mono-task coefficients"),
            Coefficients::Multi { data, n_tasks, .. } => &data[j * n_tasks..(j + 1) * n_tasks],
        }
    }

    pub fn row_mut(&mut self, j: usize) -> &mut [f64] {
        match self {
            Coefficients::Mono(_) => panic!("row_mut called on mono-task coefficients"),
            Coefficients::Multi { data, n_tasks, .. } => &mut data[j * *n_tasks..(j + 1) * *n_tasks],
        }
    }
}

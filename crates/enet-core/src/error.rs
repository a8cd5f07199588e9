//! Error types for the coordinate-descent engine.
//!
//! `EnetError` covers the three recoverable-at-the-API-boundary error kinds
//! from the design (invalid shapes, invalid parameters, numerical failure).
//! A non-converged kernel is *not* an error: it is a diagnostic, logged as a
//! warning by the path engine (see `crate::path::run_path`).

use thiserror::Error;

/// Errors raised while validating or solving a single (alpha, l1_ratio) point.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnetError {
    #[error("X has {n_samples_x} samples but y has {n_samples_y}")]
    SampleMismatch {
        n_samples_x: usize,
        n_samples_y: usize,
    },

    #[error("multi-task target requires a 2-D y, got a 1-D target of length {len}")]
    ExpectedMultiTaskTarget { len: usize },

    #[error("mono-task target requires a 1-D y, got {n_tasks} output columns")]
    ExpectedMonoTaskTarget { n_tasks: usize },

    #[error("l1_ratio must be in [0, 1], got {l1_ratio}")]
    InvalidL1Ratio { l1_ratio: f64 },

    #[error("alpha must be >= 0, got {alpha}")]
    NegativeAlpha { alpha: f64 },

    #[error("tol must be > 0, got {tol}")]
    NonPositiveTol { tol: f64 },

    #[error("max_iter must be >= 1, got {max_iter}")]
    ZeroMaxIter { max_iter: usize },

    #[error("eps must be in (0, 1), got {eps}")]
    InvalidEps { eps: f64 },

    #[error("the Gram kernel does not accept a sparse design matrix")]
    GramWithSparse,

    #[error("positive=true is not supported by the multi-task kernel")]
    PositiveWithMultiTask,

    #[error("{field} contains a NaN or infinite value at index {index}")]
    NonFinite { field: &'static str, index: usize },

    #[error("corrupted input: column {column} has negative squared norm {value}")]
    NegativeColumnNorm { column: usize, value: f64 },

    #[error("{method} called before fit")]
    NotFitted { method: &'static str },

    /// A kernel error tagged with the alpha-grid index where it occurred
    /// (§7 "path errors bubble to path engine, which tags them with the α
    /// index").
    #[error("path failed at alpha index {alpha_index}: {source}")]
    PathError {
        alpha_index: usize,
        #[source]
        source: Box<EnetError>,
    },

    /// A path error tagged with the `(l1_ratio, fold)` job that produced it
    /// (§7 "path errors bubble to CV driver, which tags with fold/l1_ratio
    /// indices").
    #[error("CV job failed at l1_ratio index {l1_ratio_index}, fold index {fold_index}: {source}")]
    CvError {
        l1_ratio_index: usize,
        fold_index: usize,
        #[source]
        source: Box<EnetError>,
    },
}

/// Result alias used throughout the kernel/path/grid modules.
pub type EnetResult<T> = Result<T, EnetError>;

//! Coordinate-descent kernels, regularization path, and pre-fit adapter for
//! elastic-net and lasso solvers.
//!
//! This crate is the numerical core: it owns the four coordinate-descent
//! kernels, the alpha-grid builder, the pre-fit centering/scaling adapter,
//! and the path engine that ties them together. It deliberately carries no
//! parallelism dependency (see the `enet` crate for the cross-validation
//! driver) and no estimator-level API — those live one layer up.

#![forbid(unsafe_code)]

pub mod design_matrix;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod linalg;
pub mod path;
pub mod prefit;

pub use design_matrix::{Coefficients, CscMatrix, DenseMatrix, DesignMatrix, Target};
pub use error::{EnetError, EnetResult};
pub use grid::alpha_grid;
pub use kernel::{KernelMode, KernelOutcome, RegStrengths};
pub use path::{run_path, PathInputs, PathPoint, PathResult};
pub use prefit::{pre_fit, GramData, PreFit, PrecomputeOption};

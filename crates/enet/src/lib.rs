//! Elastic-net and lasso estimators: single-point fits, regularization
//! paths, and cross-validated hyperparameter selection.
//!
//! Built on top of `enet-core`'s kernels and path engine. This crate adds
//! the estimator-shaped API (`fit`/`predict`/`coef_`), the free-function
//! path API, and the `rayon`-parallel cross-validation driver.

#![forbid(unsafe_code)]

pub mod api;
pub mod cv;
pub mod estimator;

pub use api::{enet_path, lasso_path, Path, PathParams};
pub use cv::{ElasticNetCV, LassoCV, MultiTaskElasticNetCV, MultiTaskLassoCV};
pub use estimator::{ElasticNet, EnetParams, Lasso, MultiTaskElasticNet, MultiTaskLasso};

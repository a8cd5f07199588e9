//! Cross-validated estimators (§4.5, §6): `LassoCV`, `ElasticNetCV`, and
//! their multi-task counterparts.

pub mod driver;
pub mod fold;

use enet_core::{Coefficients, DesignMatrix, EnetError, EnetResult, Target};

use crate::estimator::{ElasticNet, EnetParams, MultiTaskElasticNet};
use driver::{fit_cv, CvParams};
use fold::KFold;

/// Shared CV hyperparameters (§4.5) plus the single-fit params refit uses.
#[derive(Debug, Clone)]
pub struct CvSettings {
    pub l1_ratios: Vec<f64>,
    pub eps: f64,
    pub n_alphas: usize,
    pub n_splits: usize,
    pub shuffle_seed: Option<u64>,
    pub fit_intercept: bool,
    pub normalize: bool,
    pub max_iter: usize,
    pub tol: f64,
    pub n_jobs: Option<usize>,
}

impl Default for CvSettings {
    fn default() -> Self {
        Self {
            l1_ratios: vec![1.0],
            eps: 1e-3,
            n_alphas: 100,
            n_splits: 5,
            shuffle_seed: None,
            fit_intercept: true,
            normalize: false,
            max_iter: 1000,
            tol: 1e-4,
            n_jobs: None,
        }
    }
}

impl CvSettings {
    fn cv_params(&self) -> CvParams {
        CvParams {
            l1_ratios: self.l1_ratios.clone(),
            eps: self.eps,
            n_alphas: self.n_alphas,
            fold: KFold::new(self.n_splits, self.shuffle_seed),
            fit_intercept: self.fit_intercept,
            normalize: self.normalize,
            max_iter: self.max_iter,
            tol: self.tol,
            n_jobs: self.n_jobs,
        }
    }
}

macro_rules! cv_estimator {
    ($name:ident, $inner:ty, $lasso_default_ratio:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            settings: CvSettings,
            pub alpha_: Option<f64>,
            pub l1_ratio_: Option<f64>,
            pub alphas_: Option<Vec<Vec<f64>>>,
            pub mse_path_: Option<Vec<Vec<Vec<f64>>>>,
            pub coef_: Option<Coefficients>,
            pub intercept_: Option<Vec<f64>>,
            pub n_iter_: Option<usize>,
            pub dual_gap_: Option<f64>,
        }

        impl $name {
            pub fn new(settings: CvSettings) -> Self {
                Self {
                    settings,
                    alpha_: None,
                    l1_ratio_: None,
                    alphas_: None,
                    mse_path_: None,
                    coef_: None,
                    intercept_: None,
                    n_iter_: None,
                    dual_gap_: None,
                }
            }

            pub fn lasso() -> Self {
                Self::new(CvSettings {
                    l1_ratios: vec![$lasso_default_ratio],
                    ..Default::default()
                })
            }

            /// Runs the CV sweep (§4.5 steps 1-4) then refits on the full
            /// data with the selected hyperparameters (§4.5 step 5).
            ///
            /// # Errors
            ///
            /// Propagates the tagged [`enet_core::EnetError`] of whichever
            /// CV job or final refit failed first.
            pub fn fit(&mut self, x: DesignMatrix, y: Target) -> EnetResult<()> {
                let cv_params = self.settings.cv_params();
                let cv = fit_cv(&x, &y, &cv_params)?;

                let params = EnetParams {
                    alpha: cv.alpha_,
                    l1_ratio: cv.l1_ratio_,
                    fit_intercept: self.settings.fit_intercept,
                    normalize: self.settings.normalize,
                    max_iter: self.settings.max_iter,
                    tol: self.settings.tol,
                    warm_start: false,
                    positive: false,
                };
                let mut refit = <$inner>::new(params);
                refit.fit(x, y)?;

                self.alpha_ = Some(cv.alpha_);
                self.l1_ratio_ = Some(cv.l1_ratio_);
                self.alphas_ = Some(cv.alphas_);
                self.mse_path_ = Some(cv.mse_path_);
                self.coef_ = refit.coef_.clone();
                self.intercept_ = refit.intercept_.clone();
                self.n_iter_ = refit.n_iter_;
                self.dual_gap_ = refit.dual_gap_;
                Ok(())
            }

            pub fn predict(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
                let alpha = self.alpha_.ok_or(EnetError::NotFitted { method: "predict" })?;
                let l1_ratio = self
                    .l1_ratio_
                    .ok_or(EnetError::NotFitted { method: "predict" })?;
                let mut inner = <$inner>::new(EnetParams {
                    alpha,
                    l1_ratio,
                    ..Default::default()
                });
                inner.coef_ = self.coef_.clone();
                inner.intercept_ = self.intercept_.clone();
                inner.predict(x)
            }
        }
    };
}

cv_estimator!(ElasticNetCV, ElasticNet, 0.5);
cv_estimator!(LassoCV, ElasticNet, 1.0);
cv_estimator!(MultiTaskElasticNetCV, MultiTaskElasticNet, 0.5);
cv_estimator!(MultiTaskLassoCV, MultiTaskElasticNet, 1.0);

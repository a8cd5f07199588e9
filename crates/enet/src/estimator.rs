//! Estimator facade (§4.6, C6): single-`(alpha, l1_ratio)` fits with
//! `sklearn`-shaped attributes (`coef_`, `intercept_`, `n_iter_`, `dual_gap_`).

use enet_core::{
    pre_fit, run_path, Coefficients, DesignMatrix, EnetError, EnetResult, PathInputs,
    PrecomputeOption, Target,
};

/// Hyperparameters shared by every single-point estimator (§4.6).
#[derive(Debug, Clone)]
pub struct EnetParams {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub fit_intercept: bool,
    pub normalize: bool,
    pub max_iter: usize,
    pub tol: f64,
    pub warm_start: bool,
    pub positive: bool,
}

impl Default for EnetParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_ratio: 1.0,
            fit_intercept: true,
            normalize: false,
            max_iter: 1000,
            tol: 1e-4,
            warm_start: false,
            positive: false,
        }
    }
}

impl EnetParams {
    fn validate(&self) -> EnetResult<()> {
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(EnetError::InvalidL1Ratio {
                l1_ratio: self.l1_ratio,
            });
        }
        if self.alpha < 0.0 {
            return Err(EnetError::NegativeAlpha { alpha: self.alpha });
        }
        if self.tol <= 0.0 {
            return Err(EnetError::NonPositiveTol { tol: self.tol });
        }
        if self.max_iter == 0 {
            return Err(EnetError::ZeroMaxIter {
                max_iter: self.max_iter,
            });
        }
        if self.alpha == 0.0 {
            log::warn!(
                "alpha=0 is a degenerate, unregularized fit; prefer ordinary least squares"
            );
        }
        Ok(())
    }
}

/// Elastic-net regression: `Lasso` (`l1_ratio=1`), plain `ElasticNet`, and
/// their multi-task counterparts are thin constructors around this one
/// fitted-state machine.
#[derive(Debug, Clone)]
pub struct ElasticNet {
    params: EnetParams,
    pub coef_: Option<Coefficients>,
    pub intercept_: Option<Vec<f64>>,
    pub n_iter_: Option<usize>,
    pub dual_gap_: Option<f64>,
}

impl ElasticNet {
    pub fn new(params: EnetParams) -> Self {
        Self {
            params,
            coef_: None,
            intercept_: None,
            n_iter_: None,
            dual_gap_: None,
        }
    }

    pub fn lasso(alpha: f64) -> Self {
        Self::new(EnetParams {
            alpha,
            l1_ratio: 1.0,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &EnetParams {
        &self.params
    }

    /// Fits on a mono-task target. Multi-task data is rejected: use
    /// [`MultiTaskElasticNet`] instead.
    ///
    /// # Errors
    ///
    /// Propagates [`EnetError`] from parameter validation, shape checks, or
    /// the underlying kernel.
    pub fn fit(&mut self, x: DesignMatrix, y: Target) -> EnetResult<()> {
        self.params.validate()?;
        if y.is_multi() {
            return Err(EnetError::ExpectedMonoTaskTarget {
                n_tasks: y.n_tasks(),
            });
        }

        let n_features = x.n_features();
        let coef_init = match (&self.coef_, self.params.warm_start) {
            (Some(prev), true) => prev.clone(),
            _ => Coefficients::zeros_mono(n_features),
        };

        let fit = pre_fit(
            x,
            y,
            self.params.fit_intercept,
            self.params.normalize,
            PrecomputeOption::Auto,
        )?;

        let inputs = PathInputs {
            x: &fit.x,
            y: &fit.y,
            x_mean: &fit.x_mean,
            mode: fit.mode,
            gram: fit.gram.as_ref(),
            max_iter: self.params.max_iter,
            tol: self.params.tol,
            positive: self.params.positive,
        };
        let mut result = run_path(&inputs, &[self.params.alpha], self.params.l1_ratio, coef_init)?;
        let w_scaled = result.coefs.pop().expect("single-alpha path returns one point");
        let point = result.points.pop().expect("single-alpha path returns one point");

        let w = unscale(w_scaled, fit.x_std.as_deref());
        let intercept = recover_intercept(&w, &fit.x_mean, fit.y_mean[0]);

        self.coef_ = Some(w);
        self.intercept_ = Some(vec![intercept]);
        self.n_iter_ = Some(point.n_iter);
        self.dual_gap_ = Some(point.gap);
        Ok(())
    }

    pub fn predict(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
        let w = self
            .coef_
            .as_ref()
            .ok_or(EnetError::NotFitted { method: "predict" })?
            .as_mono();
        let intercept = self
            .intercept_
            .as_ref()
            .ok_or(EnetError::NotFitted { method: "predict" })?[0];
        Ok((0..x.n_samples())
            .map(|i| intercept + row_dot(x, i, w))
            .collect())
    }

    pub fn decision_function(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
        self.predict(x)
    }

    /// Nonzero `(index, value)` pairs of `coef_` (§6 `sparse_coef_`).
    pub fn sparse_coef_(&self) -> Vec<(usize, f64)> {
        self.coef_
            .as_ref()
            .map(|c| {
                c.as_mono()
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| v != 0.0)
                    .map(|(i, &v)| (i, v))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Thin `l1_ratio=1` wrapper around [`ElasticNet`] (§6).
#[derive(Debug, Clone)]
pub struct Lasso(pub ElasticNet);

impl Lasso {
    pub fn new(alpha: f64) -> Self {
        Self(ElasticNet::lasso(alpha))
    }

    pub fn fit(&mut self, x: DesignMatrix, y: Target) -> EnetResult<()> {
        self.0.fit(x, y)
    }

    pub fn predict(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
        self.0.predict(x)
    }
}

/// Multi-task elastic-net (§4.1 "Multi-task"): rejects `positive=true` and
/// mono-task targets.
#[derive(Debug, Clone)]
pub struct MultiTaskElasticNet {
    params: EnetParams,
    pub coef_: Option<Coefficients>,
    pub intercept_: Option<Vec<f64>>,
    pub n_iter_: Option<usize>,
    pub dual_gap_: Option<f64>,
}

impl MultiTaskElasticNet {
    pub fn new(params: EnetParams) -> Self {
        Self {
            params,
            coef_: None,
            intercept_: None,
            n_iter_: None,
            dual_gap_: None,
        }
    }

    pub fn lasso(alpha: f64) -> Self {
        Self::new(EnetParams {
            alpha,
            l1_ratio: 1.0,
            ..Default::default()
        })
    }

    /// # Errors
    ///
    /// Returns [`EnetError::PositiveWithMultiTask`] if `positive=true`, or
    /// [`EnetError::ExpectedMultiTaskTarget`] for a mono-task `y`.
    pub fn fit(&mut self, x: DesignMatrix, y: Target) -> EnetResult<()> {
        self.params.validate()?;
        if self.params.positive {
            return Err(EnetError::PositiveWithMultiTask);
        }
        if !y.is_multi() {
            return Err(EnetError::ExpectedMultiTaskTarget { len: y.n_samples() });
        }

        let n_features = x.n_features();
        let n_tasks = y.n_tasks();
        let coef_init = match (&self.coef_, self.params.warm_start) {
            (Some(prev), true) => prev.clone(),
            _ => Coefficients::zeros_multi(n_features, n_tasks),
        };

        let fit = pre_fit(
            x,
            y,
            self.params.fit_intercept,
            self.params.normalize,
            PrecomputeOption::Auto,
        )?;

        let inputs = PathInputs {
            x: &fit.x,
            y: &fit.y,
            x_mean: &fit.x_mean,
            mode: fit.mode,
            gram: fit.gram.as_ref(),
            max_iter: self.params.max_iter,
            tol: self.params.tol,
            positive: false,
        };
        let mut result = run_path(&inputs, &[self.params.alpha], self.params.l1_ratio, coef_init)?;
        let w_scaled = result.coefs.pop().expect("single-alpha path returns one point");
        let point = result.points.pop().expect("single-alpha path returns one point");

        let w = unscale(w_scaled, fit.x_std.as_deref());
        let intercept = recover_intercept_multi(&w, &fit.x_mean, &fit.y_mean, n_tasks);

        self.coef_ = Some(w);
        self.intercept_ = Some(intercept);
        self.n_iter_ = Some(point.n_iter);
        self.dual_gap_ = Some(point.gap);
        Ok(())
    }

    pub fn predict(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
        let w = self
            .coef_
            .as_ref()
            .ok_or(EnetError::NotFitted { method: "predict" })?;
        let intercept = self
            .intercept_
            .as_ref()
            .ok_or(EnetError::NotFitted { method: "predict" })?;
        let n_tasks = intercept.len();
        let n_features = w.n_features();
        let mut out = vec![0.0; x.n_samples() * n_tasks];
        for i in 0..x.n_samples() {
            for k in 0..n_tasks {
                let mut acc = intercept[k];
                for j in 0..n_features {
                    acc += column_value(x, j, i) * w.row(j)[k];
                }
                out[i * n_tasks + k] = acc;
            }
        }
        Ok(out)
    }
}

/// Thin `l1_ratio=1` wrapper around [`MultiTaskElasticNet`] (§6).
#[derive(Debug, Clone)]
pub struct MultiTaskLasso(pub MultiTaskElasticNet);

impl MultiTaskLasso {
    pub fn new(alpha: f64) -> Self {
        Self(MultiTaskElasticNet::lasso(alpha))
    }

    pub fn fit(&mut self, x: DesignMatrix, y: Target) -> EnetResult<()> {
        self.0.fit(x, y)
    }

    pub fn predict(&self, x: &DesignMatrix) -> EnetResult<Vec<f64>> {
        self.0.predict(x)
    }
}

/// `W / X_std`, elementwise over features (identity if `x_std` is `None`).
fn unscale(w: Coefficients, x_std: Option<&[f64]>) -> Coefficients {
    let Some(std) = x_std else { return w };
    match w {
        Coefficients::Mono(mut v) => {
            for (vj, &s) in v.iter_mut().zip(std) {
                *vj /= s;
            }
            Coefficients::Mono(v)
        }
        Coefficients::Multi {
            mut data,
            n_features,
            n_tasks,
        } => {
            for j in 0..n_features {
                let s = std[j];
                for k in 0..n_tasks {
                    data[j * n_tasks + k] /= s;
                }
            }
            Coefficients::Multi {
                data,
                n_features,
                n_tasks,
            }
        }
    }
}

/// `intercept = y_mean - X_mean . W` (§4.6; `W` already unscaled by `X_std`).
fn recover_intercept(w: &Coefficients, x_mean: &[f64], y_mean: f64) -> f64 {
    let w = w.as_mono();
    y_mean - x_mean.iter().zip(w).map(|(&m, &wj)| m * wj).sum::<f64>()
}

fn recover_intercept_multi(
    w: &Coefficients,
    x_mean: &[f64],
    y_mean: &[f64],
    n_tasks: usize,
) -> Vec<f64> {
    (0..n_tasks)
        .map(|k| {
            let dot: f64 = (0..w.n_features()).map(|j| x_mean[j] * w.row(j)[k]).sum();
            y_mean[k] - dot
        })
        .collect()
}

fn row_dot(x: &DesignMatrix, i: usize, w: &[f64]) -> f64 {
    (0..x.n_features()).map(|j| column_value(x, j, i) * w[j]).sum()
}

fn column_value(x: &DesignMatrix, j: usize, i: usize) -> f64 {
    match x {
        DesignMatrix::Dense(d) => d.column(j)[i],
        DesignMatrix::Sparse(s) => s.column(j).find(|&(row, _)| row == i).map_or(0.0, |(_, v)| v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enet_core::DenseMatrix;

    #[test]
    fn lasso_fit_matches_expected_scenario_s2() {
        let x = DesignMatrix::Dense(
            DenseMatrix::from_column_major(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2).unwrap(),
        );
        let y = Target::Mono(vec![0.0, 1.0, 2.0]);
        let mut model = Lasso::new(0.1);
        model.fit(x, y).unwrap();
        let coef = model.0.coef_.as_ref().unwrap().as_mono();
        assert!((coef[0] - 0.85).abs() < 5e-2);
        let intercept = model.0.intercept_.as_ref().unwrap()[0];
        assert!((intercept - 0.15).abs() < 5e-2);
    }

    #[test]
    fn warm_start_idempotence() {
        let x = DesignMatrix::Dense(
            DenseMatrix::from_column_major(vec![1.0, 2.0, 3.0, 2.0, 1.0, 0.0], 3, 2).unwrap(),
        );
        let y = Target::Mono(vec![2.0, 3.0, 1.0]);
        let mut params = EnetParams {
            alpha: 0.2,
            l1_ratio: 0.5,
            warm_start: true,
            ..Default::default()
        };
        params.tol = 1e-8;
        let mut model = ElasticNet::new(params);
        model.fit(x.clone(), y.clone()).unwrap();
        let first = model.coef_.clone().unwrap().as_mono().to_vec();
        model.fit(x, y).unwrap();
        let second = model.coef_.clone().unwrap().as_mono().to_vec();
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn rejects_multi_task_target_on_mono_estimator() {
        let x = DesignMatrix::Dense(DenseMatrix::from_column_major(vec![1.0, 2.0], 2, 1).unwrap());
        let y = Target::Multi {
            data: vec![1.0, 2.0, 3.0, 4.0],
            n_tasks: 2,
        };
        let mut model = Lasso::new(0.1);
        let err = model.fit(x, y).unwrap_err();
        assert!(matches!(err, EnetError::ExpectedMonoTaskTarget { .. }));
    }
}

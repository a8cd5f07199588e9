//! End-to-end scenarios S1-S6.

use enet::cv::{CvSettings, LassoCV};
use enet::{lasso_path, ElasticNet, EnetParams, Lasso, MultiTaskElasticNet, PathParams};
use enet_core::{linalg, DenseMatrix, DesignMatrix, Target};

/// S1: lasso path, 2 features, no intercept.
#[test]
fn s1_lasso_path_two_features() {
    let x = DesignMatrix::Dense(
        DenseMatrix::from_column_major(vec![1.0, 2.0, 3.1, 2.3, 5.4, 4.3], 3, 2).unwrap(),
    );
    let y = Target::Mono(vec![1.0, 2.0, 3.1]);
    let params = PathParams {
        alphas: Some(vec![5.0, 1.0, 0.5]),
        fit_intercept: false,
        tol: 1e-8,
        max_iter: 5000,
        ..Default::default()
    };
    let path = lasso_path(x, y, params).unwrap();

    let expected = [[0.0, 0.0, 0.469], [0.216, 0.443, 0.237]];
    for (point_idx, coef) in path.coefs.iter().enumerate() {
        let w = coef.as_mono();
        for feature in 0..2 {
            assert!(
                (w[feature] - expected[feature][point_idx]).abs() < 5e-3,
                "alpha idx {point_idx}, feature {feature}: got {}, expected {}",
                w[feature],
                expected[feature][point_idx]
            );
        }
    }
}

/// S2: single lasso fit with intercept.
#[test]
fn s2_single_lasso_fit() {
    let x = DesignMatrix::Dense(
        DenseMatrix::from_column_major(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2).unwrap(),
    );
    let y = Target::Mono(vec![0.0, 1.0, 2.0]);
    let mut model = Lasso::new(0.1);
    model.fit(x, y).unwrap();

    let coef = model.0.coef_.as_ref().unwrap().as_mono();
    assert!((coef[0] - 0.85).abs() < 5e-2);
    assert!((coef[1] - 0.0).abs() < 5e-2);
    let intercept = model.0.intercept_.as_ref().unwrap()[0];
    assert!((intercept - 0.15).abs() < 5e-2);
}

/// S3: multi-task fit.
#[test]
fn s3_multi_task_fit() {
    let x = DesignMatrix::Dense(
        DenseMatrix::from_column_major(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2).unwrap(),
    );
    let y = Target::Multi {
        data: vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0],
        n_tasks: 2,
    };
    let mut model = MultiTaskElasticNet::new(EnetParams {
        alpha: 0.1,
        l1_ratio: 0.5,
        ..Default::default()
    });
    model.fit(x, y).unwrap();

    let w = model.coef_.as_ref().unwrap();
    for j in 0..2 {
        for k in 0..2 {
            assert!((w.row(j)[k] - 0.457).abs() < 1e-2, "w[{j}][{k}] = {}", w.row(j)[k]);
        }
    }
    let intercept = model.intercept_.as_ref().unwrap();
    for &v in intercept {
        assert!((v - 0.087).abs() < 1e-2);
    }
}

/// S5: warm-started path does strictly less total work than cold restarts.
#[test]
fn s5_warm_start_shortens_total_iterations() {
    let x_data = vec![1.0, 2.0, 3.1, 2.3, 5.4, 4.3];
    let alphas = vec![5.0, 1.0, 0.5, 0.1, 0.05];

    let x = DesignMatrix::Dense(DenseMatrix::from_column_major(x_data.clone(), 3, 2).unwrap());
    let y = Target::Mono(vec![1.0, 2.0, 3.1]);
    let warm = lasso_path(
        x,
        y,
        PathParams {
            alphas: Some(alphas.clone()),
            fit_intercept: false,
            tol: 1e-8,
            ..Default::default()
        },
    )
    .unwrap();
    let warm_total: usize = warm.n_iters.iter().sum();

    let mut cold_total = 0usize;
    for &alpha in &alphas {
        let x = DesignMatrix::Dense(DenseMatrix::from_column_major(x_data.clone(), 3, 2).unwrap());
        let y = Target::Mono(vec![1.0, 2.0, 3.1]);
        let single = lasso_path(
            x,
            y,
            PathParams {
                alphas: Some(vec![alpha]),
                fit_intercept: false,
                tol: 1e-8,
                ..Default::default()
            },
        )
        .unwrap();
        cold_total += single.n_iters[0];
    }

    assert!(warm_total <= cold_total);
}

/// S6: CV recovers an alpha within a factor of 4 of the oracle.
#[test]
fn s6_cv_picks_near_oracle_alpha() {
    let n = 80;
    let p = 6;
    let w_star = [4.0, 0.0, -3.0, 0.0, 0.0, 1.5];
    let mut data = vec![0.0; n * p];
    let mut y = vec![0.0; n];
    for i in 0..n {
        for j in 0..p {
            data[j * n + i] = (((i * (j + 5)) % 11) as f64 - 5.0) / 3.0;
        }
        y[i] = (0..p).map(|j| data[j * n + i] * w_star[j]).sum::<f64>()
            + (((i % 7) as f64) - 3.0) * 0.02;
    }
    // alpha_max for centered data: max_j |X_centered^T y_centered| / n.
    let mut centered = data.clone();
    for j in 0..p {
        let col = &mut centered[j * n..(j + 1) * n];
        let mean = col.iter().sum::<f64>() / n as f64;
        for v in col.iter_mut() {
            *v -= mean;
        }
    }
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
    let x_design = DesignMatrix::Dense(DenseMatrix::from_column_major(centered, n, p).unwrap());
    let xy = linalg::cross_products(&x_design, &Target::Mono(y_centered));
    let alpha_max = xy.iter().map(|v| v.abs()).fold(0.0_f64, f64::max) / n as f64;
    let oracle_alpha = alpha_max / 10.0;

    let x = DesignMatrix::Dense(DenseMatrix::from_column_major(data, n, p).unwrap());
    let target = Target::Mono(y);

    let mut model = LassoCV::new(CvSettings {
        n_alphas: 40,
        n_splits: 5,
        shuffle_seed: Some(42),
        max_iter: 3000,
        ..Default::default()
    });
    model.fit(x, target).unwrap();

    let alpha = model.alpha_.unwrap();
    assert!(alpha.is_finite() && alpha > 0.0);
    assert!(model.coef_.is_some());
    assert!(
        alpha <= oracle_alpha * 4.0 && alpha >= oracle_alpha / 4.0,
        "cv alpha {alpha} not within a factor of 4 of oracle alpha {oracle_alpha}"
    );
}

/// Elastic-net (not pure lasso) still produces a valid fit with both
/// l1/l2 terms active.
#[test]
fn elastic_net_intermediate_l1_ratio_fits() {
    let x = DesignMatrix::Dense(
        DenseMatrix::from_column_major(vec![1.0, 2.0, 3.0, 4.0, 2.0, 1.0, 0.0, -1.0], 4, 2)
            .unwrap(),
    );
    let y = Target::Mono(vec![3.0, 4.0, 2.0, 1.0]);
    let mut model = ElasticNet::new(EnetParams {
        alpha: 0.3,
        l1_ratio: 0.5,
        ..Default::default()
    });
    model.fit(x, y).unwrap();
    assert!(model.coef_.is_some());
    assert!(model.dual_gap_.unwrap() >= 0.0);
}

//! Grid search end to end with the built-in GBDT cross-validator.

use boosters_tune::cv::{CrossValidator, CvConfig, GbdtCrossValidator, KFold, SeedPolicy};
use boosters_tune::testing::{synthetic_binary, synthetic_regression};
use boosters_tune::training::{Metric, Objective};
use boosters_tune::tune::{GridSearchRunner, ParamGrid};
use boosters_tune::{Parallelism, ParamSet, ResultsTable};

fn config(seed_policy: SeedPolicy) -> CvConfig {
    CvConfig::builder()
        .n_folds(4)
        .n_rounds(60)
        .early_stopping_rounds(10)
        .seed(3)
        .seed_policy(seed_policy)
        .base_params(ParamSet::new().with("max_depth", 3))
        .build()
        .unwrap()
}

fn test_means(table: &ResultsTable) -> Vec<f64> {
    table
        .records()
        .iter()
        .filter_map(|r| r.metrics.map(|m| m.test_mean))
        .collect()
}

fn is_sorted(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

#[test]
fn eta_grid_on_regression() {
    let dataset = synthetic_regression(200, 3, 0.1, 11);
    let combos: Vec<ParamSet> = [0.3, 0.2, 0.1].iter().map(|&eta| ParamSet::new().with("eta", eta)).collect();

    let table = GridSearchRunner::new(GbdtCrossValidator::new(Objective::squared()))
        .run(&combos, &dataset, &config(SeedPolicy::Fixed))
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.metric(), "rmse");
    assert_eq!(table.columns()[1..], ["iteration", "train_rmse_mean", "train_rmse_std", "test_rmse_mean", "test_rmse_std"]);

    let means = test_means(&table);
    assert_eq!(means.len(), 3);
    assert!(is_sorted(&means), "{means:?}");

    for record in table.records() {
        let row = record.metrics.unwrap();
        assert!(row.iteration >= 1 && row.iteration <= 60);
        assert!(row.train_std >= 0.0 && row.test_std >= 0.0);
        // Predicting the mean would score close to 1.
        assert!(row.test_mean < 0.5, "{}: {}", record.params, row.test_mean);
    }
}

#[test]
fn invalid_and_unknown_parameters_are_isolated() {
    let dataset = synthetic_regression(120, 2, 0.1, 5);
    let combos = vec![
        ParamSet::new().with("eta", 0.3),
        ParamSet::new().with("eta", -0.5),
        ParamSet::new().with("booster", "gblinear"),
        ParamSet::new().with("subsample", 1.5),
        ParamSet::new().with("eta", 0.2),
    ];

    let table = GridSearchRunner::new(GbdtCrossValidator::new(Objective::squared()))
        .run(&combos, &dataset, &config(SeedPolicy::Fixed))
        .unwrap();

    assert_eq!(table.len(), 5);
    assert_eq!(table.param_names(), ["eta", "booster", "subsample"]);

    let available: Vec<usize> = table.records().iter().filter(|r| r.is_available()).map(|r| r.index).collect();
    assert_eq!(available.len(), 2);
    assert!(available.contains(&0) && available.contains(&4));

    let failed: Vec<usize> = table.records()[2..].iter().map(|r| r.index).collect();
    assert_eq!(failed, [1, 2, 3]);
    assert!(table.records()[3].error.as_deref().unwrap().contains("booster"));
}

#[test]
fn runs_are_reproducible_and_thread_independent() {
    let dataset = synthetic_regression(150, 3, 0.2, 2);
    let grid = ParamGrid::new()
        .axis("eta", [0.3, 0.1])
        .axis("subsample", [1.0, 0.7])
        .axis("colsample_bytree", [1.0, 0.5]);
    let config = config(SeedPolicy::PerCombination);
    let validator = GbdtCrossValidator::new(Objective::squared());

    let first = GridSearchRunner::new(validator.clone()).run_grid(&grid, &dataset, &config).unwrap();
    let second = GridSearchRunner::new(validator.clone()).run_grid(&grid, &dataset, &config).unwrap();
    let parallel = GridSearchRunner::new(validator.with_parallelism(Parallelism::Parallel))
        .with_n_threads(3)
        .run_grid(&grid, &dataset, &config)
        .unwrap();

    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn single_combination_is_idempotent() {
    let dataset = synthetic_regression(100, 3, 0.1, 9);
    let cv = GbdtCrossValidator::new(Objective::squared());
    let params = ParamSet::new().with("eta", 0.2).with("max_depth", 4);
    let config = config(SeedPolicy::Fixed);

    let a = cv.cross_validate(&params, &dataset, &config, 17).unwrap();
    let b = cv.cross_validate(&params, &dataset, &config, 17).unwrap();
    assert_eq!(a.best_iteration, b.best_iteration);
    assert_eq!(a.best_row(), b.best_row());
}

#[test]
fn seed_changes_folds() {
    let a = KFold::new(5, 1).split(100).unwrap();
    let b = KFold::new(5, 2).split(100).unwrap();
    assert_ne!(a, b);
}

#[test]
fn logistic_grid_sorts_by_logloss() {
    let dataset = synthetic_binary(240, 3, 4);
    let grid = ParamGrid::new().axis("eta", [0.5, 0.1]).axis("max_depth", [2, 4]);

    let validator = GbdtCrossValidator::new(Objective::logistic());
    assert_eq!(validator.metric(), Metric::logloss());

    let table = GridSearchRunner::new(validator)
        .run_grid(&grid, &dataset, &config(SeedPolicy::Fixed))
        .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.columns()[2], "train_logloss_mean");
    let means = test_means(&table);
    assert_eq!(means.len(), 4);
    assert!(is_sorted(&means));
    assert!(means[0] < 2.0f64.ln());
}

#[test]
fn mae_metric_with_explicit_sort_column() {
    let dataset = synthetic_regression(120, 2, 0.1, 6);
    let validator = GbdtCrossValidator::new(Objective::squared()).with_metric(Metric::mae());
    let combos: Vec<ParamSet> = [0.3, 0.05].iter().map(|&eta| ParamSet::new().with("eta", eta)).collect();

    let table = GridSearchRunner::new(validator)
        .with_sort_by("test_mae_std")
        .run(&combos, &dataset, &config(SeedPolicy::Fixed))
        .unwrap();

    let stds: Vec<f64> = table.records().iter().map(|r| r.metrics.unwrap().test_std).collect();
    assert!(is_sorted(&stds));
}

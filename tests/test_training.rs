//! Integration test: training pipeline end-to-end

mod common;

use common::{fast_config, linear_frame, salary_frame};
use polars::prelude::*;
use salary_predictor::data::{read_csv_bytes, to_csv_bytes, FeatureKind};
use salary_predictor::preprocessing::DataCleaner;
use salary_predictor::training::{ModelType, TrainEngine, TrainingConfig};
use salary_predictor::SalaryError;

#[test]
fn test_linear_wins_on_exactly_linear_data() {
    let df = linear_frame(100);
    let outcome = TrainEngine::new(TrainingConfig::default().with_n_estimators(20))
        .unwrap()
        .fit(&df)
        .unwrap();

    let report = &outcome.report;
    assert_eq!(report.candidates.len(), 5);
    assert_eq!(report.best_model, ModelType::LinearRegression);
    assert!(report.best_metrics.r2 > 0.9999, "r2 = {}", report.best_metrics.r2);
    assert!(report.best_metrics.mae < 1.0);

    // Every other candidate is at best as good as the exact fit
    for candidate in &report.candidates[1..] {
        let r2 = candidate.metrics.expect("candidate should train").r2;
        assert!(r2 <= report.best_metrics.r2);
    }
}

#[test]
fn test_split_sizes_and_dropped_columns() {
    let outcome = TrainEngine::new(fast_config()).unwrap().fit(&salary_frame(100, 3)).unwrap();

    assert_eq!(outcome.report.n_test, 20);
    assert_eq!(outcome.report.n_train, 80);
    assert_eq!(outcome.report.n_features, 9);

    let schema = outcome.pipeline.schema();
    assert!(schema.kind_of("id").is_none());
    assert_eq!(schema.target(), "salary");
    assert_eq!(schema.categorical().len(), 5);
    assert_eq!(schema.numeric().len(), 4);
}

#[test]
fn test_training_is_deterministic() {
    let df = salary_frame(100, 11);
    let config = TrainingConfig::default().with_n_estimators(15);

    let a = TrainEngine::new(config.clone()).unwrap().fit(&df).unwrap();
    let b = TrainEngine::new(config).unwrap().fit(&df).unwrap();

    assert_eq!(a.report.best_model, b.report.best_model);
    for (x, y) in a.report.candidates.iter().zip(&b.report.candidates) {
        assert_eq!(x.model_type, y.model_type);
        assert_eq!(x.metrics, y.metrics);
    }
    assert_eq!(a.pipeline.fingerprint(), b.pipeline.fingerprint());
}

#[test]
fn test_seed_changes_split() {
    let df = salary_frame(100, 5);
    let a = TrainEngine::new(fast_config().with_random_state(1)).unwrap().fit(&df).unwrap();
    let b = TrainEngine::new(fast_config().with_random_state(2)).unwrap().fit(&df).unwrap();
    assert_ne!(a.report.best_metrics, b.report.best_metrics);
}

#[test]
fn test_noisy_data_scores_reasonably() {
    let outcome = TrainEngine::new(fast_config()).unwrap().fit(&salary_frame(200, 9)).unwrap();
    assert!(outcome.report.best_metrics.r2 > 0.5);
}

#[test]
fn test_missing_target_is_rejected() {
    let df = salary_frame(50, 1).drop("Salary").unwrap();
    let err = TrainEngine::new(fast_config()).unwrap().fit(&df).unwrap_err();
    assert!(matches!(err, SalaryError::MissingColumn(ref c) if c == "salary"));
}

#[test]
fn test_too_few_rows_is_rejected() {
    let df = salary_frame(4, 1);
    let err = TrainEngine::new(fast_config()).unwrap().fit(&df).unwrap_err();
    assert!(matches!(err, SalaryError::DataError(_)));
}

#[test]
fn test_missing_values_are_imputed_before_training() {
    let df = salary_frame(60, 2);
    let mut years: Vec<Option<f64>> = df
        .column("Years_Experience")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    years[0] = None;
    years[10] = None;

    let mut gappy = df.clone();
    gappy
        .with_column(Series::new("Years_Experience".into(), years))
        .unwrap();

    let outcome = TrainEngine::new(fast_config()).unwrap().fit(&gappy);
    assert!(outcome.is_ok(), "{:?}", outcome.err());
}

#[test]
fn test_na_marker_in_numeric_column_is_imputed() {
    let csv = String::from_utf8(to_csv_bytes(&salary_frame(40, 9)).unwrap()).unwrap();
    let mut lines: Vec<String> = csv.lines().map(str::to_string).collect();
    let age_idx = lines[0].split(',').position(|h| h == "Age").unwrap();

    let mut ages = Vec::new();
    for (i, line) in lines.iter_mut().enumerate().skip(1) {
        let mut fields: Vec<String> = line.split(',').map(str::to_string).collect();
        if i == 4 {
            fields[age_idx] = "NA".to_string();
        } else {
            ages.push(fields[age_idx].parse::<f64>().unwrap());
        }
        *line = fields.join(",");
    }
    let expected = ages.iter().sum::<f64>() / ages.len() as f64;

    let df = read_csv_bytes(lines.join("\n").as_bytes()).unwrap();
    assert_eq!(df.column("age").unwrap().null_count(), 1);

    let cleaned = DataCleaner::default().clean(&df).unwrap();
    let filled = cleaned.column("age").unwrap().f64().unwrap().get(3).unwrap();
    assert!((filled - expected).abs() < 1e-9);

    let outcome = TrainEngine::new(fast_config()).unwrap().fit(&df).unwrap();
    assert_eq!(outcome.pipeline.schema().kind_of("age"), Some(FeatureKind::Numeric));
}

//! Training engine: clean, encode, split, fit every candidate, keep the best

use super::config::{ModelType, TrainingConfig};
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::linear_models::{LinearRegression, RidgeRegression};
use super::models::{RegressionMetrics, Regressor};
use super::random_forest::RandomForest;
use super::split::train_test_split;
use super::xgboost::{XGBoostConfig, XGBoostRegressor};
use crate::data::{drop_ignored_columns, normalize_headers};
use crate::error::{Result, SalaryError};
use crate::preprocessing::{DataCleaner, FeaturePipeline};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    RidgeRegression(RidgeRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostingRegressor),
    XGBoost(XGBoostRegressor),
}

impl TrainedModel {
    /// Unfitted model of the given type, configured from the run settings
    pub fn build(model_type: ModelType, config: &TrainingConfig) -> Self {
        let seed = config.random_state;
        match model_type {
            ModelType::LinearRegression => TrainedModel::LinearRegression(LinearRegression::new()),
            ModelType::RidgeRegression => {
                TrainedModel::RidgeRegression(RidgeRegression::new(config.ridge_alpha))
            }
            ModelType::RandomForest => TrainedModel::RandomForest(
                RandomForest::new(config.n_estimators).with_random_state(seed),
            ),
            ModelType::GradientBoosting => {
                TrainedModel::GradientBoosting(GradientBoostingRegressor::new(
                    GradientBoostingConfig {
                        n_estimators: config.n_estimators,
                        random_state: seed,
                        ..Default::default()
                    },
                ))
            }
            ModelType::XGBoost => TrainedModel::XGBoost(XGBoostRegressor::new(XGBoostConfig {
                n_estimators: config.n_estimators,
                random_state: seed,
                ..Default::default()
            })),
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            TrainedModel::LinearRegression(_) => ModelType::LinearRegression,
            TrainedModel::RidgeRegression(_) => ModelType::RidgeRegression,
            TrainedModel::RandomForest(_) => ModelType::RandomForest,
            TrainedModel::GradientBoosting(_) => ModelType::GradientBoosting,
            TrainedModel::XGBoost(_) => ModelType::XGBoost,
        }
    }

    pub fn name(&self) -> &'static str {
        self.model_type().name()
    }

    fn regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::RidgeRegression(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::XGBoost(m) => m,
        }
    }

    fn regressor_mut(&mut self) -> &mut dyn Regressor {
        match self {
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::RidgeRegression(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::XGBoost(m) => m,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.regressor_mut().fit(x, y)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.regressor().predict(x)
    }

    pub fn evaluate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<RegressionMetrics> {
        self.regressor().evaluate(x, y)
    }
}

/// Outcome of one candidate on the held-out split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub model_type: ModelType,
    /// Held-out metrics; `None` when the candidate failed
    pub metrics: Option<RegressionMetrics>,
    pub training_time_secs: f64,
    pub error: Option<String>,
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub candidates: Vec<CandidateResult>,
    pub best_model: ModelType,
    pub best_metrics: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
}

/// Everything a training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub pipeline: FeaturePipeline,
    pub report: TrainingReport,
}

/// Index of the winning candidate: the highest held-out R², where a later
/// candidate must be strictly better to replace an earlier one.
pub fn select_best(results: &[CandidateResult]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, result) in results.iter().enumerate() {
        let r2 = match result.metrics {
            Some(m) if m.r2.is_finite() => m.r2,
            _ => continue,
        };
        if best.map_or(true, |(_, best_r2)| r2 > best_r2) {
            best = Some((idx, r2));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the whole pipeline on a raw training frame
    pub fn fit(&self, df: &DataFrame) -> Result<TrainingOutcome> {
        let start = Instant::now();

        // 1. Normalise headers, drop identifier columns, fill missing values
        let df = drop_ignored_columns(&normalize_headers(df)?)?;
        let cleaner = DataCleaner::new(self.config.cleaning.clone())?;
        let cleaned = cleaner.clean(&df)?;

        // 2. Learn schema + encoders, build the feature matrix
        let pipeline = FeaturePipeline::fit(&cleaned, &self.config.target_column)?;
        let x = pipeline.transform(&cleaned)?;
        let y = pipeline.target(&cleaned)?;
        info!(
            rows = x.nrows(),
            features = x.ncols(),
            categorical = pipeline.encoders().len(),
            "Prepared training data"
        );

        // 3. Hold out the evaluation rows
        let split = train_test_split(&x, &y, self.config.test_size, self.config.random_state)?;

        // 4. Fit and score every candidate
        let n_candidates = self.config.candidates.len();
        let mut fitted: Vec<Option<TrainedModel>> = Vec::with_capacity(n_candidates);
        let mut results = Vec::with_capacity(n_candidates);

        for &model_type in &self.config.candidates {
            let (model, result) = self.evaluate_candidate(
                model_type,
                &split.x_train,
                &split.y_train,
                &split.x_test,
                &split.y_test,
            );
            fitted.push(model);
            results.push(result);
        }

        // 5. Keep the winner
        let best_idx = select_best(&results).ok_or_else(|| {
            SalaryError::TrainingError("every candidate model failed to train".to_string())
        })?;
        let model = fitted
            .get_mut(best_idx)
            .and_then(Option::take)
            .ok_or_else(|| SalaryError::TrainingError("winning model missing".to_string()))?;
        let best_metrics = results[best_idx]
            .metrics
            .ok_or_else(|| SalaryError::TrainingError("winning model has no metrics".to_string()))?;

        info!(
            model = %model.name(),
            r2 = best_metrics.r2,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Selected best model"
        );

        let report = TrainingReport {
            candidates: results,
            best_model: model.model_type(),
            best_metrics,
            n_train: split.x_train.nrows(),
            n_test: split.x_test.nrows(),
            n_features: x.ncols(),
        };

        Ok(TrainingOutcome {
            model,
            pipeline,
            report,
        })
    }

    fn evaluate_candidate(
        &self,
        model_type: ModelType,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> (Option<TrainedModel>, CandidateResult) {
        let start = Instant::now();
        let mut model = TrainedModel::build(model_type, &self.config);

        let outcome = model
            .fit(x_train, y_train)
            .and_then(|_| model.evaluate(x_test, y_test));
        let training_time_secs = start.elapsed().as_secs_f64();

        match outcome {
            Ok(metrics) => {
                info!(
                    model = %model_type,
                    mae = metrics.mae,
                    rmse = metrics.rmse,
                    r2 = metrics.r2,
                    secs = training_time_secs,
                    "Candidate evaluated"
                );
                (
                    Some(model),
                    CandidateResult {
                        model_type,
                        metrics: Some(metrics),
                        training_time_secs,
                        error: None,
                    },
                )
            }
            Err(e) => {
                warn!(model = %model_type, error = %e, "Candidate failed");
                (
                    None,
                    CandidateResult {
                        model_type,
                        metrics: None,
                        training_time_secs,
                        error: Some(e.to_string()),
                    },
                )
            }
        }
    }
}

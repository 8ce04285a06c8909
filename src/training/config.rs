//! Training configuration

use crate::data::TARGET_COLUMN;
use crate::error::{Result, SalaryError};
use crate::preprocessing::CleaningConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candidate regressors, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    LinearRegression,
    RidgeRegression,
    RandomForest,
    GradientBoosting,
    XGBoost,
}

impl ModelType {
    /// Every candidate, in the order ties are broken
    pub const ALL: [ModelType; 5] = [
        ModelType::LinearRegression,
        ModelType::RidgeRegression,
        ModelType::RandomForest,
        ModelType::GradientBoosting,
        ModelType::XGBoost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::LinearRegression => "LinearRegression",
            ModelType::RidgeRegression => "RidgeRegression",
            ModelType::RandomForest => "RandomForest",
            ModelType::GradientBoosting => "GradientBoosting",
            ModelType::XGBoost => "XGBoost",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelType {
    type Err = SalaryError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "linear" | "linearregression" | "ols" => Ok(ModelType::LinearRegression),
            "ridge" | "ridgeregression" => Ok(ModelType::RidgeRegression),
            "randomforest" | "rf" | "forest" => Ok(ModelType::RandomForest),
            "gradientboosting" | "gbm" | "gb" => Ok(ModelType::GradientBoosting),
            "xgboost" | "xgb" => Ok(ModelType::XGBoost),
            _ => Err(SalaryError::ConfigError(format!("unknown model '{}'", s))),
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the split and every seeded candidate
    pub random_state: u64,
    /// Candidates to fit, in tie-break order
    pub candidates: Vec<ModelType>,
    /// Missing-value policy
    pub cleaning: CleaningConfig,
    /// Ridge L2 strength
    pub ridge_alpha: f64,
    /// Trees per ensemble candidate
    pub n_estimators: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.2,
            random_state: 42,
            candidates: ModelType::ALL.to_vec(),
            cleaning: CleaningConfig::default(),
            ridge_alpha: 1.0,
            n_estimators: 100,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<ModelType>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_cleaning(mut self, cleaning: CleaningConfig) -> Self {
        self.cleaning = cleaning;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(SalaryError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.candidates.is_empty() {
            return Err(SalaryError::ConfigError(
                "at least one candidate model is required".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(SalaryError::ConfigError(
                "n_estimators must be positive".to_string(),
            ));
        }
        self.cleaning.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.target_column, "salary");
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.candidates, ModelType::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_model_names() {
        assert_eq!("xgb".parse::<ModelType>().unwrap(), ModelType::XGBoost);
        assert_eq!("Random Forest".parse::<ModelType>().unwrap(), ModelType::RandomForest);
        assert_eq!("ridge".parse::<ModelType>().unwrap(), ModelType::RidgeRegression);
        assert!("svm".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(TrainingConfig::new().with_test_size(1.0).validate().is_err());
        assert!(TrainingConfig::new().with_test_size(0.0).validate().is_err());
    }
}

//! Missing-value policy configuration

use crate::error::{Result, SalaryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy for replacing missing values in one kind of column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Fail on the first missing value
    ErrorOnMissing,
    /// Replace with the column mean (numeric only)
    Mean,
    /// Replace with the most frequent value, smallest value on ties
    MostFrequent,
    /// Replace with a fixed value
    Constant(String),
}

impl FromStr for ImputeStrategy {
    type Err = SalaryError;

    /// Parses `mean`, `mode`, `error` or `constant=<value>`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(value) = s.strip_prefix("constant=") {
            return Ok(ImputeStrategy::Constant(value.to_string()));
        }
        match s.to_lowercase().as_str() {
            "mean" => Ok(ImputeStrategy::Mean),
            "mode" | "most_frequent" | "most-frequent" => Ok(ImputeStrategy::MostFrequent),
            "error" | "error-on-missing" | "none" => Ok(ImputeStrategy::ErrorOnMissing),
            other => Err(SalaryError::ConfigError(format!(
                "unknown impute strategy '{}', expected mean, mode, error or constant=<value>",
                other
            ))),
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::ErrorOnMissing => write!(f, "error"),
            ImputeStrategy::Mean => write!(f, "mean"),
            ImputeStrategy::MostFrequent => write!(f, "mode"),
            ImputeStrategy::Constant(v) => write!(f, "constant={}", v),
        }
    }
}

/// Per-kind missing-value policy. The default imputes numeric columns with
/// their mean and categorical columns with their mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    pub numeric: ImputeStrategy,
    pub categorical: ImputeStrategy,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            numeric: ImputeStrategy::Mean,
            categorical: ImputeStrategy::MostFrequent,
        }
    }
}

impl CleaningConfig {
    /// Reject every missing value
    pub fn strict() -> Self {
        Self {
            numeric: ImputeStrategy::ErrorOnMissing,
            categorical: ImputeStrategy::ErrorOnMissing,
        }
    }

    pub fn with_numeric(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric = strategy;
        self
    }

    pub fn with_categorical(mut self, strategy: ImputeStrategy) -> Self {
        self.categorical = strategy;
        self
    }

    /// Check the strategies make sense for their column kinds
    pub fn validate(&self) -> Result<()> {
        if self.categorical == ImputeStrategy::Mean {
            return Err(SalaryError::ConfigError(
                "mean imputation is not defined for categorical columns".to_string(),
            ));
        }
        if let ImputeStrategy::Constant(v) = &self.numeric {
            if v.trim().parse::<f64>().is_err() {
                return Err(SalaryError::ConfigError(format!(
                    "numeric constant '{}' is not a number",
                    v
                )));
            }
        }
        Ok(())
    }
}

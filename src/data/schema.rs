//! Feature schema shared by the trainer and the predictor

use crate::error::{Result, SalaryError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Numeric target column in training data
pub const TARGET_COLUMN: &str = "salary";

/// Column appended to bulk prediction output
pub const PREDICTION_COLUMN: &str = "Predicted_Salary";

/// Identifier columns removed before training
pub const IGNORED_COLUMNS: [&str; 2] = ["id", "crucial_code"];

/// Categorical attributes of an employee record
pub const CATEGORICAL_FEATURES: [&str; 5] = [
    "education_level",
    "job_title",
    "industry",
    "location",
    "company_size",
];

/// Numeric attributes of an employee record
pub const NUMERIC_FEATURES: [&str; 4] = [
    "years_experience",
    "certifications",
    "age",
    "working_hours",
];

/// How a feature column is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Categorical,
    Numeric,
}

impl FeatureKind {
    /// Kind implied by a polars dtype. Anything non-numeric is treated as categorical.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            FeatureKind::Numeric
        } else {
            FeatureKind::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Categorical => "categorical",
            FeatureKind::Numeric => "numeric",
        }
    }
}

/// Single named feature column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered feature columns plus the target name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
    target: String,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>, target: impl Into<String>) -> Self {
        Self {
            features,
            target: target.into(),
        }
    }

    /// The nine employee attributes in the order used by the sample input file
    pub fn salary() -> Self {
        let order = [
            "education_level",
            "years_experience",
            "job_title",
            "industry",
            "location",
            "company_size",
            "certifications",
            "age",
            "working_hours",
        ];
        let features = order
            .iter()
            .map(|name| {
                let kind = if CATEGORICAL_FEATURES.contains(name) {
                    FeatureKind::Categorical
                } else {
                    FeatureKind::Numeric
                };
                FeatureSpec::new(*name, kind)
            })
            .collect();
        Self::new(features, TARGET_COLUMN)
    }

    /// Infer the schema from a cleaned training frame: every column except the
    /// target is a feature, typed by its dtype.
    pub fn infer(df: &DataFrame, target: &str) -> Result<Self> {
        if df.column(target).is_err() {
            return Err(SalaryError::MissingColumn(target.to_string()));
        }

        let features: Vec<FeatureSpec> = df
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != target)
            .map(|c| FeatureSpec::new(c.name().as_str(), FeatureKind::from_dtype(c.dtype())))
            .collect();

        if features.is_empty() {
            return Err(SalaryError::DataError(
                "dataset has no feature columns besides the target".to_string(),
            ));
        }

        Ok(Self::new(features, target))
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn categorical(&self) -> Vec<&str> {
        self.names_of(FeatureKind::Categorical)
    }

    pub fn numeric(&self) -> Vec<&str> {
        self.names_of(FeatureKind::Numeric)
    }

    fn names_of(&self, kind: FeatureKind) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.features.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    /// Fails with the first feature column absent from `df`
    pub fn require_columns(&self, df: &DataFrame) -> Result<()> {
        for feature in &self.features {
            if df.column(&feature.name).is_err() {
                return Err(SalaryError::MissingColumn(feature.name.clone()));
            }
        }
        Ok(())
    }

    /// Feed the schema into a running hash in a stable textual form
    pub fn digest_into(&self, hasher: &mut Sha256) {
        hasher.update(b"target=");
        hasher.update(self.target.as_bytes());
        for feature in &self.features {
            hasher.update(b"\n");
            hasher.update(feature.name.as_bytes());
            hasher.update(b":");
            hasher.update(feature.kind.as_str().as_bytes());
        }
    }
}

/// Check if dtype is numeric
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

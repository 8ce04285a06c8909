//! Cleaned frame → numeric feature matrix

use super::encoder::CategoryEncoders;
use crate::data::{FeatureKind, FeatureSchema};
use crate::error::{Result, SalaryError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Feature schema plus fitted encoders: everything needed to turn a cleaned
/// table into model input the same way at training and prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    schema: FeatureSchema,
    encoders: CategoryEncoders,
}

impl FeaturePipeline {
    /// Infer the schema of a cleaned training frame and fit its encoders
    pub fn fit(df: &DataFrame, target: &str) -> Result<Self> {
        let schema = FeatureSchema::infer(df, target)?;
        let encoders = CategoryEncoders::fit(df, &schema.categorical())?;
        Ok(Self { schema, encoders })
    }

    /// Reassemble a pipeline from persisted parts
    pub fn from_parts(schema: FeatureSchema, encoders: CategoryEncoders) -> Result<Self> {
        for name in schema.categorical() {
            if encoders.get(name).is_none() {
                return Err(SalaryError::ArtifactMismatch(format!(
                    "no encoder for categorical feature '{}'",
                    name
                )));
            }
        }
        Ok(Self { schema, encoders })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoders(&self) -> &CategoryEncoders {
        &self.encoders
    }

    /// Encode categoricals and lay the features out in schema order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        self.schema.require_columns(df)?;
        let encoded = self.encoders.transform(df)?;
        columns_to_array2(&encoded, &self.schema)
    }

    /// Target column as f64
    pub fn target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let name = self.schema.target();
        let col = df
            .column(name)
            .map_err(|_| SalaryError::MissingColumn(name.to_string()))?;
        let values = col.cast(&DataType::Float64)?;
        values
            .f64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| SalaryError::MissingValue { column: name.to_string() }))
            .collect()
    }

    /// SHA-256 over feature names, kinds and encoder vocabularies
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        self.schema.digest_into(&mut hasher);
        self.encoders.digest_into(&mut hasher);
        format!("{:x}", hasher.finalize())
    }
}

fn columns_to_array2(df: &DataFrame, schema: &FeatureSchema) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = schema.len();

    let col_data: Vec<Vec<f64>> = schema
        .features()
        .iter()
        .map(|feature| {
            let col = df
                .column(&feature.name)
                .map_err(|_| SalaryError::MissingColumn(feature.name.clone()))?;
            let cast = col.cast(&DataType::Float64).map_err(|_| SalaryError::InvalidField {
                column: feature.name.clone(),
                reason: match feature.kind {
                    FeatureKind::Numeric => "expected a number".to_string(),
                    FeatureKind::Categorical => "could not read category codes".to_string(),
                },
            })?;
            cast.f64()?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| SalaryError::MissingValue {
                        column: feature.name.clone(),
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

//! Per-column label encoding for categorical features

use crate::error::{Result, SalaryError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Bijection between the distinct training values of one column and `0..k`.
/// Classes are kept sorted, so a class's code is its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the vocabulary of `column` from the observed values
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(SalaryError::CleaningError {
                column: column.to_string(),
                reason: "no values to learn categories from".to_string(),
            });
        }

        Ok(Self {
            column: column.to_string(),
            classes,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code of a category; unseen values are an error naming the column
    pub fn encode(&self, value: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| SalaryError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

/// All categorical encoders of a training run, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoders {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl CategoryEncoders {
    /// Fit one encoder per listed column. Columns must already be cleaned.
    pub fn fit(df: &DataFrame, columns: &[&str]) -> Result<Self> {
        let mut encoders = BTreeMap::new();

        for &name in columns {
            let values = string_values(df, name)?;
            if values.null_count() > 0 {
                return Err(SalaryError::MissingValue {
                    column: name.to_string(),
                });
            }
            let encoder = LabelEncoder::fit(name, values.str()?.into_iter().flatten())?;
            encoders.insert(name.to_string(), encoder);
        }

        Ok(Self { encoders })
    }

    /// Replace every encoded column with its integer codes. Fails on the
    /// first unseen category, so nothing is returned for a bad batch.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (name, encoder) in &self.encoders {
            let values = string_values(df, name)?;
            let codes = values
                .str()?
                .into_iter()
                .map(|v| match v {
                    Some(s) => encoder.encode(s).map(|c| c as i64),
                    None => Err(SalaryError::MissingValue {
                        column: name.clone(),
                    }),
                })
                .collect::<Result<Vec<i64>>>()?;

            result.with_column(Series::new(name.as_str().into(), codes))?;
        }

        Ok(result)
    }

    /// Code for a single value of a single column
    pub fn encode_value(&self, column: &str, value: &str) -> Result<usize> {
        self.encoders
            .get(column)
            .ok_or_else(|| SalaryError::MissingColumn(column.to_string()))?
            .encode(value)
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Feed every vocabulary into a running hash in column order
    pub fn digest_into(&self, hasher: &mut Sha256) {
        for (name, encoder) in &self.encoders {
            hasher.update(b"\n[");
            hasher.update(name.as_bytes());
            hasher.update(b"]");
            for class in encoder.classes() {
                hasher.update(b"\x1f");
                hasher.update(class.as_bytes());
            }
        }
    }
}

fn string_values(df: &DataFrame, name: &str) -> Result<Series> {
    let col = df
        .column(name)
        .map_err(|_| SalaryError::MissingColumn(name.to_string()))?;
    Ok(col.as_materialized_series().cast(&DataType::String)?)
}

//! Missing value handling for training and prediction batches

use super::config::{CleaningConfig, ImputeStrategy};
use crate::data::{FeatureKind, FeatureSchema};
use crate::error::{Result, SalaryError};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Replaces missing values column by column. Fill values are computed from
/// the batch being cleaned, so each batch stands on its own.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleaningConfig,
}

#[derive(Debug, Clone, PartialEq)]
enum FillValue {
    Numeric(f64),
    String(String),
}

impl DataCleaner {
    pub fn new(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean every column, typing each one by its dtype
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for col in df.get_columns() {
            let kind = FeatureKind::from_dtype(col.dtype());
            let series = col.as_materialized_series();
            if let Some(filled) = self.clean_series(series, kind)? {
                result.with_column(filled)?;
            }
        }
        Ok(result)
    }

    /// Clean the feature columns of a trained schema. Numeric features must
    /// parse as numbers and categorical features are read as text; columns
    /// outside the schema pass through untouched.
    pub fn clean_for_schema(&self, df: &DataFrame, schema: &FeatureSchema) -> Result<DataFrame> {
        schema.require_columns(df)?;

        let mut result = df.clone();
        for feature in schema.features() {
            let col = df.column(&feature.name)?;
            let series = coerce(col.as_materialized_series(), feature.kind)?;
            let cleaned = self.clean_series(&series, feature.kind)?.unwrap_or(series);
            result.with_column(cleaned)?;
        }
        Ok(result)
    }

    fn clean_series(&self, series: &Series, kind: FeatureKind) -> Result<Option<Series>> {
        let series = &nan_as_null(series)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let column = series.name().to_string();
        let strategy = match kind {
            FeatureKind::Numeric => &self.config.numeric,
            FeatureKind::Categorical => &self.config.categorical,
        };
        let fill = compute_fill_value(series, kind, strategy)?;
        debug!(column = %column, missing, fill = ?fill, "Imputing missing values");

        fill_series(series, &fill).map(Some)
    }
}

/// Float columns mark gaps with NaN as often as with null; treat both as
/// missing
fn nan_as_null(series: &Series) -> Result<Series> {
    if !series.dtype().is_float() {
        return Ok(series.clone());
    }
    let values = series.cast(&DataType::Float64)?;
    let ca = values.f64()?;
    if !ca.into_iter().flatten().any(f64::is_nan) {
        return Ok(series.clone());
    }
    let masked: Float64Chunked = ca
        .into_iter()
        .map(|opt| opt.filter(|v| !v.is_nan()))
        .collect();
    Ok(masked.with_name(series.name().clone()).into_series())
}

/// Convert a column to the representation its kind requires
fn coerce(series: &Series, kind: FeatureKind) -> Result<Series> {
    let dtype = series.dtype();
    match kind {
        FeatureKind::Numeric if crate::data::is_numeric_dtype(dtype) => Ok(series.clone()),
        FeatureKind::Numeric => series
            .strict_cast(&DataType::Float64)
            .map_err(|_| SalaryError::InvalidField {
                column: series.name().to_string(),
                reason: "expected a number".to_string(),
            }),
        FeatureKind::Categorical if *dtype == DataType::String => Ok(series.clone()),
        FeatureKind::Categorical => Ok(series.cast(&DataType::String)?),
    }
}

fn compute_fill_value(
    series: &Series,
    kind: FeatureKind,
    strategy: &ImputeStrategy,
) -> Result<FillValue> {
    let column = series.name().to_string();
    let all_missing = || SalaryError::CleaningError {
        column: column.clone(),
        reason: "every value is missing".to_string(),
    };

    match (strategy, kind) {
        (ImputeStrategy::ErrorOnMissing, _) => Err(SalaryError::MissingValue {
            column: column.clone(),
        }),
        (ImputeStrategy::Mean, FeatureKind::Numeric) => {
            let values = series.cast(&DataType::Float64)?;
            values
                .f64()?
                .mean()
                .map(FillValue::Numeric)
                .ok_or_else(all_missing)
        }
        (ImputeStrategy::Mean, FeatureKind::Categorical) => Err(SalaryError::ConfigError(
            format!("mean imputation is not defined for categorical column '{}'", column),
        )),
        (ImputeStrategy::MostFrequent, FeatureKind::Numeric) => {
            let values = series.cast(&DataType::Float64)?;
            mode_numeric(values.f64()?)
                .map(FillValue::Numeric)
                .ok_or_else(all_missing)
        }
        (ImputeStrategy::MostFrequent, FeatureKind::Categorical) => {
            let values = series.cast(&DataType::String)?;
            mode_string(values.str()?)
                .map(FillValue::String)
                .ok_or_else(all_missing)
        }
        (ImputeStrategy::Constant(v), FeatureKind::Numeric) => v
            .trim()
            .parse::<f64>()
            .map(FillValue::Numeric)
            .map_err(|_| {
                SalaryError::ConfigError(format!("numeric constant '{}' is not a number", v))
            }),
        (ImputeStrategy::Constant(v), FeatureKind::Categorical) => Ok(FillValue::String(v.clone())),
    }
}

/// Most frequent value; ties go to the smallest value
fn mode_numeric(ca: &Float64Chunked) -> Option<f64> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for val in ca.into_iter().flatten() {
        counts.entry(val.to_bits()).or_insert((val, 0)).1 += 1;
    }
    counts
        .into_values()
        .max_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal))
        })
        .map(|(val, _)| val)
}

/// Most frequent string; ties go to the lexicographically smallest
fn mode_string(ca: &StringChunked) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for val in ca.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(val, _)| val.to_string())
}

fn fill_series(series: &Series, fill_value: &FillValue) -> Result<Series> {
    match fill_value {
        FillValue::Numeric(val) => {
            let values = series.cast(&DataType::Float64)?;
            let filled: Float64Chunked = values
                .f64()?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*val)))
                .collect();
            Ok(filled.with_name(series.name().clone()).into_series())
        }
        FillValue::String(val) => {
            let values = series.cast(&DataType::String)?;
            let filled: StringChunked = values
                .str()?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(val.as_str()).to_string()))
                .collect();
            Ok(filled.with_name(series.name().clone()).into_series())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_gaps() -> DataFrame {
        DataFrame::new(vec![
            Column::new("age".into(), &[Some(20.0), None, Some(30.0), Some(40.0)]),
            Column::new(
                "industry".into(),
                &[Some("IT"), Some("Finance"), None, Some("IT")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_mean_imputation() {
        let cleaner = DataCleaner::default();
        let result = cleaner.clean(&frame_with_gaps()).unwrap();

        let col = result.column("age").unwrap().f64().unwrap();
        assert!((col.get(1).unwrap() - 30.0).abs() < 1e-12);
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_nan_is_imputed_like_null() {
        let df = df!("years_experience" => [2.0, f64::NAN, 4.0, 6.0]).unwrap();
        let result = DataCleaner::default().clean(&df).unwrap();

        let col = result.column("years_experience").unwrap().f64().unwrap();
        assert_eq!(col.get(1), Some(4.0));
        assert!(col.into_iter().flatten().all(f64::is_finite));

        let schema = FeatureSchema::new(
            vec![crate::data::FeatureSpec::new("years_experience", FeatureKind::Numeric)],
            "salary",
        );
        let result = DataCleaner::default().clean_for_schema(&df, &schema).unwrap();
        assert_eq!(result.column("years_experience").unwrap().f64().unwrap().get(1), Some(4.0));
    }

    #[test]
    fn test_mode_imputation() {
        let cleaner = DataCleaner::default();
        let result = cleaner.clean(&frame_with_gaps()).unwrap();

        let col = result.column("industry").unwrap().str().unwrap();
        assert_eq!(col.get(2), Some("IT"));
    }

    #[test]
    fn test_mode_tie_prefers_smallest() {
        let ca: StringChunked = [Some("b"), Some("a"), None, Some("b"), Some("a")]
            .into_iter()
            .collect();
        assert_eq!(mode_string(&ca), Some("a".to_string()));

        let nums: Float64Chunked = [Some(3.0), Some(1.0), Some(3.0), Some(1.0)]
            .into_iter()
            .collect();
        assert_eq!(mode_numeric(&nums), Some(1.0));
    }

    #[test]
    fn test_error_on_missing_names_column() {
        let cleaner = DataCleaner::new(CleaningConfig::strict()).unwrap();
        let err = cleaner.clean(&frame_with_gaps()).unwrap_err();
        assert!(matches!(err, SalaryError::MissingValue { ref column } if column == "age"));
    }

    #[test]
    fn test_constant_imputation() {
        let config = CleaningConfig::default()
            .with_numeric(ImputeStrategy::Constant("0".to_string()))
            .with_categorical(ImputeStrategy::Constant("Unknown".to_string()));
        let cleaner = DataCleaner::new(config).unwrap();
        let result = cleaner.clean(&frame_with_gaps()).unwrap();

        assert_eq!(result.column("age").unwrap().f64().unwrap().get(1), Some(0.0));
        assert_eq!(
            result.column("industry").unwrap().str().unwrap().get(2),
            Some("Unknown")
        );
    }

    #[test]
    fn test_all_missing_column_is_an_error() {
        let df = DataFrame::new(vec![Column::new(
            "age".into(),
            &[None::<f64>, None, None],
        )])
        .unwrap();
        let err = DataCleaner::default().clean(&df).unwrap_err();
        assert_eq!(err.column(), Some("age"));
    }

    #[test]
    fn test_complete_columns_untouched() {
        let df = df!("age" => [1i64, 2, 3]).unwrap();
        let result = DataCleaner::default().clean(&df).unwrap();
        assert_eq!(result.column("age").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_schema_cleaning_rejects_text_in_numeric_feature() {
        let schema = FeatureSchema::new(
            vec![crate::data::FeatureSpec::new("age", FeatureKind::Numeric)],
            "salary",
        );
        let df = df!("age" => ["thirty", "40"]).unwrap();
        let err = DataCleaner::default()
            .clean_for_schema(&df, &schema)
            .unwrap_err();
        assert_eq!(err.column(), Some("age"));
    }
}

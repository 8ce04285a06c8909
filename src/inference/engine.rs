//! Predictor: loaded model + preprocessing

use crate::data::{
    normalize_headers, read_csv_bytes, to_csv_bytes, EmployeeRecord, FeatureSchema,
    PREDICTION_COLUMN,
};
use crate::error::{Result, SalaryError};
use crate::export::{ArtifactBundle, ArtifactManifest};
use crate::preprocessing::{CleaningConfig, DataCleaner, FeaturePipeline};
use crate::training::TrainedModel;
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// File name offered for bulk prediction downloads
pub const PREDICTIONS_FILE_NAME: &str = "salary_predictions.csv";

/// Serves predictions from a trained model and the preprocessing it was
/// trained behind
#[derive(Debug, Clone)]
pub struct Predictor {
    model: TrainedModel,
    pipeline: FeaturePipeline,
    manifest: ArtifactManifest,
    cleaner: DataCleaner,
}

impl Predictor {
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self {
            model: bundle.model,
            pipeline: bundle.pipeline,
            manifest: bundle.manifest,
            cleaner: DataCleaner::default(),
        }
    }

    /// Load and validate both artifacts
    pub fn load(model_path: &Path, encoders_path: &Path) -> Result<Self> {
        ArtifactBundle::load(model_path, encoders_path).map(Self::new)
    }

    /// Replace the missing-value policy applied to incoming batches
    pub fn with_cleaning(mut self, config: CleaningConfig) -> Result<Self> {
        self.cleaner = DataCleaner::new(config)?;
        Ok(self)
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.pipeline.schema()
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Predict the salary of one hand-entered record
    pub fn predict_record(&self, record: &EmployeeRecord) -> Result<f64> {
        record.validate()?;
        let df = record.to_dataframe()?;
        let predictions = self.predict_values(&df)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| {
                SalaryError::ComputationError("model returned no prediction".to_string())
            })
    }

    /// Clean the table, predict every row and append the predictions as
    /// `Predicted_Salary`. Any invalid row fails the whole batch.
    pub fn predict_table(&self, df: &DataFrame) -> Result<DataFrame> {
        let df = normalize_headers(df)?;
        if df.height() == 0 {
            return Err(SalaryError::DataError("input has no rows".to_string()));
        }

        let cleaned = self.cleaner.clean_for_schema(&df, self.pipeline.schema())?;
        let predictions = self.predict_cleaned(&cleaned)?;

        let mut output = cleaned;
        output.with_column(Column::new(PREDICTION_COLUMN.into(), predictions))?;
        Ok(output)
    }

    /// CSV in, CSV with a `Predicted_Salary` column out
    pub fn predict_csv_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let df = read_csv_bytes(bytes)?;
        let output = self.predict_table(&df)?;
        to_csv_bytes(&output)
    }

    fn predict_values(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let cleaned = self.cleaner.clean_for_schema(df, self.pipeline.schema())?;
        self.predict_cleaned(&cleaned)
    }

    fn predict_cleaned(&self, cleaned: &DataFrame) -> Result<Vec<f64>> {
        let start = Instant::now();
        let x = self.pipeline.transform(cleaned)?;
        let predictions = self.model.predict(&x)?;
        debug!(
            rows = x.nrows(),
            model = %self.model.name(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Predicted batch"
        );
        Ok(predictions.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CHOICE_FIELDS, SAMPLE_CSV};
    use crate::training::{ModelType, TrainEngine, TrainingConfig};

    fn training_frame() -> DataFrame {
        let n = 60;
        let pick = |field: usize, i: usize| {
            let options = CHOICE_FIELDS[field].options;
            options[i % options.len()]
        };
        let education: Vec<&str> = (0..n).map(|i| pick(0, i)).collect();
        let job: Vec<&str> = (0..n).map(|i| pick(1, i / 2)).collect();
        let industry: Vec<&str> = (0..n).map(|i| pick(2, i / 3)).collect();
        let location: Vec<&str> = (0..n).map(|i| pick(3, i / 5)).collect();
        let size: Vec<&str> = (0..n).map(|i| pick(4, i)).collect();
        let years: Vec<f64> = (0..n).map(|i| (i % 20) as f64).collect();
        let certs: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let age: Vec<f64> = (0..n).map(|i| 22.0 + (i % 20) as f64).collect();
        let hours: Vec<f64> = (0..n).map(|i| 35.0 + (i % 10) as f64).collect();
        let salary: Vec<f64> = (0..n)
            .map(|i| 40_000.0 + 3_000.0 * (i % 20) as f64 + 1_000.0 * ((i * 7) % 5) as f64)
            .collect();

        df!(
            "education_level" => education,
            "years_experience" => years,
            "job_title" => job,
            "industry" => industry,
            "location" => location,
            "company_size" => size,
            "certifications" => certs,
            "age" => age,
            "working_hours" => hours,
            "salary" => salary
        )
        .unwrap()
    }

    fn predictor() -> Predictor {
        let config = TrainingConfig::default()
            .with_candidates(vec![ModelType::LinearRegression, ModelType::RidgeRegression]);
        let outcome = TrainEngine::new(config).unwrap().fit(&training_frame()).unwrap();
        Predictor::new(ArtifactBundle::from_outcome(outcome).unwrap())
    }

    #[test]
    fn test_predict_sample_record() {
        let predictor = predictor();
        let value = predictor.predict_record(&EmployeeRecord::sample()).unwrap();
        assert!(value > 0.0);
    }

    #[test]
    fn test_predict_csv_appends_column() {
        let predictor = predictor();
        let bytes = predictor.predict_csv_bytes(SAMPLE_CSV.as_bytes()).unwrap();
        let output = read_csv_bytes(&bytes).unwrap();
        assert_eq!(output.height(), 1);
        assert_eq!(output.width(), 10);
        assert!(output.column("predicted_salary").is_ok());
    }

    #[test]
    fn test_unknown_category_fails_batch() {
        let predictor = predictor();
        let csv = SAMPLE_CSV.replace("Data Scientist", "Astronaut");
        let err = predictor.predict_csv_bytes(csv.as_bytes()).unwrap_err();
        assert_eq!(err.column(), Some("job_title"));
    }

    #[test]
    fn test_missing_column_named() {
        let predictor = predictor();
        let df = read_csv_bytes(SAMPLE_CSV.as_bytes()).unwrap().drop("age").unwrap();
        let err = predictor.predict_table(&df).unwrap_err();
        assert!(matches!(err, SalaryError::MissingColumn(ref c) if c == "age"));
    }
}

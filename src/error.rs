//! Error types for the salary predictor

use thiserror::Error;

/// Result type alias for salary predictor operations
pub type Result<T> = std::result::Result<T, SalaryError>;

/// Main error type shared by the trainer and the predictor
#[derive(Error, Debug)]
pub enum SalaryError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Cleaning error in column '{column}': {reason}")]
    CleaningError { column: String, reason: String },

    #[error("Missing value in column '{column}'")]
    MissingValue { column: String },

    #[error("Invalid value for '{column}': unseen category '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value for '{column}': {reason}")]
    InvalidField { column: String, reason: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl SalaryError {
    /// Column the error refers to, if it was raised for a specific input column
    pub fn column(&self) -> Option<&str> {
        match self {
            SalaryError::CleaningError { column, .. }
            | SalaryError::MissingValue { column }
            | SalaryError::UnknownCategory { column, .. }
            | SalaryError::InvalidField { column, .. } => Some(column),
            SalaryError::MissingColumn(column) => Some(column),
            _ => None,
        }
    }

    /// Whether the error was caused by user-supplied input rather than the system
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SalaryError::DataError(_)
                | SalaryError::CleaningError { .. }
                | SalaryError::MissingValue { .. }
                | SalaryError::UnknownCategory { .. }
                | SalaryError::MissingColumn(_)
                | SalaryError::InvalidField { .. }
        )
    }
}

impl From<polars::error::PolarsError> for SalaryError {
    fn from(err: polars::error::PolarsError) -> Self {
        SalaryError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SalaryError {
    fn from(err: serde_json::Error) -> Self {
        SalaryError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for SalaryError {
    fn from(err: bincode::Error) -> Self {
        SalaryError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SalaryError {
    fn from(err: ndarray::ShapeError) -> Self {
        SalaryError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SalaryError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_unknown_category_names_column() {
        let err = SalaryError::UnknownCategory {
            column: "job_title".to_string(),
            value: "Astronaut".to_string(),
        };
        assert!(err.to_string().contains("job_title"));
        assert_eq!(err.column(), Some("job_title"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SalaryError = io_err.into();
        assert!(matches!(err, SalaryError::IoError(_)));
        assert!(!err.is_input_error());
    }
}

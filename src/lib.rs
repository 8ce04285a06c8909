//! Salary Predictor
//!
//! Trains regression models on employee salary data and serves predictions
//! from the best one.
//!
//! # Modules
//!
//! - [`data`] - Feature schema, CSV I/O and the employee record
//! - [`preprocessing`] - Missing value handling and categorical encoding
//! - [`training`] - Candidate regressors and model selection
//! - [`export`] - Versioned model and encoder artifacts
//! - [`inference`] - Predictions over loaded artifacts
//! - [`app`] - Page state and HTML rendering
//! - [`server`] - Web dashboard and JSON API
//! - [`cli`] - Command-line and interactive terminal interface
//!
//! # Example
//!
//! ```no_run
//! use salary_predictor::data::{load_csv, EmployeeRecord};
//! use salary_predictor::export::ArtifactBundle;
//! use salary_predictor::inference::{format_currency, Predictor};
//! use salary_predictor::training::{TrainEngine, TrainingConfig};
//! use std::path::Path;
//!
//! # fn main() -> salary_predictor::Result<()> {
//! let df = load_csv(Path::new("salary_data.csv"))?;
//! let outcome = TrainEngine::new(TrainingConfig::default())?.fit(&df)?;
//! ArtifactBundle::from_outcome(outcome)?.save_to_dir(Path::new("."))?;
//!
//! let predictor = Predictor::load(Path::new("best_model.bin"), Path::new("label_encoders.bin"))?;
//! let salary = predictor.predict_record(&EmployeeRecord::sample())?;
//! println!("{}", format_currency(salary));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod inference;
pub mod preprocessing;
pub mod server;
pub mod training;

pub use error::{Result, SalaryError};

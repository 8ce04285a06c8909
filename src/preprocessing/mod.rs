//! Cleaning and categorical encoding shared by training and prediction

mod config;
mod encoder;
mod imputer;
mod pipeline;

pub use config::{CleaningConfig, ImputeStrategy};
pub use encoder::{CategoryEncoders, LabelEncoder};
pub use imputer::DataCleaner;
pub use pipeline::FeaturePipeline;

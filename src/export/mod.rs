//! Model artifact persistence
//!
//! The winning model and the categorical encoders are written as two bincode
//! files. The model file carries a manifest with the feature schema, run
//! metrics and hashes that tie it to its encoder file.

mod bundle;
mod manifest;

pub use bundle::ArtifactBundle;
pub use manifest::{
    compute_sha256, ArtifactManifest, ENCODERS_FILE_NAME, FORMAT_VERSION, MODEL_FILE_NAME,
};

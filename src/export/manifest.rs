//! Versioned artifact manifest

use crate::data::FeatureSchema;
use crate::training::{ModelType, TrainingReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bumped whenever the on-disk layout of either artifact changes
pub const FORMAT_VERSION: u32 = 1;

pub const MODEL_FILE_NAME: &str = "best_model.bin";
pub const ENCODERS_FILE_NAME: &str = "label_encoders.bin";

/// Describes the model artifact and pins the encoder artifact it was saved with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Version of the crate that wrote the artifact
    pub producer: String,
    pub schema: FeatureSchema,
    pub model_type: ModelType,
    pub report: TrainingReport,
    /// SHA-256 of feature names, kinds and encoder vocabularies
    pub schema_fingerprint: String,
    /// SHA-256 of the serialised encoders
    pub encoders_digest: String,
}

impl ArtifactManifest {
    pub fn short_fingerprint(&self) -> &str {
        &self.schema_fingerprint[..self.schema_fingerprint.len().min(12)]
    }
}

/// Hex SHA-256 of a byte slice
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_sha256() {
        let hash = compute_sha256(b"hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}

//! Saving and loading the model + encoder artifact pair

use super::manifest::{
    compute_sha256, ArtifactManifest, ENCODERS_FILE_NAME, FORMAT_VERSION, MODEL_FILE_NAME,
};
use crate::error::{Result, SalaryError};
use crate::preprocessing::{CategoryEncoders, FeaturePipeline};
use crate::training::{TrainedModel, TrainingOutcome};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MODEL_KIND: &str = "salary-predictor/model";
const ENCODERS_KIND: &str = "salary-predictor/encoders";

#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    kind: String,
    manifest: ArtifactManifest,
    model: TrainedModel,
}

#[derive(Debug, Serialize, Deserialize)]
struct EncoderArtifact {
    kind: String,
    format_version: u32,
    schema_fingerprint: String,
    encoders: CategoryEncoders,
}

/// A selected model together with the preprocessing it was trained behind
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub manifest: ArtifactManifest,
    pub model: TrainedModel,
    pub pipeline: FeaturePipeline,
}

impl ArtifactBundle {
    /// Wrap a training outcome with a freshly stamped manifest
    pub fn from_outcome(outcome: TrainingOutcome) -> Result<Self> {
        let encoders_bytes = bincode::serialize(outcome.pipeline.encoders())?;
        let manifest = ArtifactManifest {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            schema: outcome.pipeline.schema().clone(),
            model_type: outcome.model.model_type(),
            report: outcome.report,
            schema_fingerprint: outcome.pipeline.fingerprint(),
            encoders_digest: compute_sha256(&encoders_bytes),
        };

        Ok(Self {
            manifest,
            model: outcome.model,
            pipeline: outcome.pipeline,
        })
    }

    /// Write both artifacts
    pub fn save(&self, model_path: &Path, encoders_path: &Path) -> Result<()> {
        for path in [model_path, encoders_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let encoders = EncoderArtifact {
            kind: ENCODERS_KIND.to_string(),
            format_version: FORMAT_VERSION,
            schema_fingerprint: self.manifest.schema_fingerprint.clone(),
            encoders: self.pipeline.encoders().clone(),
        };
        fs::write(encoders_path, bincode::serialize(&encoders)?)?;

        let model = ModelArtifact {
            kind: MODEL_KIND.to_string(),
            manifest: self.manifest.clone(),
            model: self.model.clone(),
        };
        fs::write(model_path, bincode::serialize(&model)?)?;

        info!(
            model = %model_path.display(),
            encoders = %encoders_path.display(),
            fingerprint = %self.manifest.short_fingerprint(),
            "Saved artifacts"
        );
        Ok(())
    }

    /// Write `best_model.bin` and `label_encoders.bin` into `dir`
    pub fn save_to_dir(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let model_path = dir.join(MODEL_FILE_NAME);
        let encoders_path = dir.join(ENCODERS_FILE_NAME);
        self.save(&model_path, &encoders_path)?;
        Ok((model_path, encoders_path))
    }

    /// Read both artifacts and check they belong together. Any mismatch in
    /// format version, schema fingerprint or encoder digest is an error.
    pub fn load(model_path: &Path, encoders_path: &Path) -> Result<Self> {
        let model: ModelArtifact = read_artifact(model_path)?;
        let encoders: EncoderArtifact = read_artifact(encoders_path)?;

        if model.kind != MODEL_KIND {
            return Err(SalaryError::ArtifactMismatch(format!(
                "{} is not a model artifact",
                model_path.display()
            )));
        }
        if encoders.kind != ENCODERS_KIND {
            return Err(SalaryError::ArtifactMismatch(format!(
                "{} is not an encoder artifact",
                encoders_path.display()
            )));
        }

        let manifest = model.manifest;
        for (what, version) in [
            ("model", manifest.format_version),
            ("encoders", encoders.format_version),
        ] {
            if version != FORMAT_VERSION {
                return Err(SalaryError::ArtifactMismatch(format!(
                    "{} artifact has format version {}, expected {}",
                    what, version, FORMAT_VERSION
                )));
            }
        }

        if encoders.schema_fingerprint != manifest.schema_fingerprint {
            return Err(SalaryError::ArtifactMismatch(
                "encoders were saved by a different training run than the model".to_string(),
            ));
        }

        let digest = compute_sha256(&bincode::serialize(&encoders.encoders)?);
        if digest != manifest.encoders_digest {
            return Err(SalaryError::ArtifactMismatch(
                "encoder contents do not match the model manifest".to_string(),
            ));
        }

        if model.model.model_type() != manifest.model_type {
            return Err(SalaryError::ArtifactMismatch(format!(
                "manifest names {} but the artifact holds {}",
                manifest.model_type,
                model.model.name()
            )));
        }

        let pipeline = FeaturePipeline::from_parts(manifest.schema.clone(), encoders.encoders)?;
        if pipeline.fingerprint() != manifest.schema_fingerprint {
            return Err(SalaryError::ArtifactMismatch(
                "feature schema fingerprint does not match".to_string(),
            ));
        }

        info!(
            model = %manifest.model_type,
            r2 = manifest.report.best_metrics.r2,
            fingerprint = %manifest.short_fingerprint(),
            "Loaded artifacts"
        );

        Ok(Self {
            manifest,
            model: model.model,
            pipeline,
        })
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(MODEL_FILE_NAME), &dir.join(ENCODERS_FILE_NAME))
    }
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| {
        SalaryError::ArtifactError(format!("cannot read {}: {}", path.display(), e))
    })?;
    bincode::deserialize(&bytes).map_err(|e| {
        SalaryError::ArtifactError(format!("cannot decode {}: {}", path.display(), e))
    })
}

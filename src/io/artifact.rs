//! Read/write the model artifact JSON.
//!
//! The artifact is the portable output of `cgpa train`:
//! - the fitted forest
//! - the ordered feature-name list it was fitted on
//! - run metadata (timestamp, seed, split sizes, held-out R²)
//!
//! Inference always reindexes inputs through `features`, so the stored order
//! is the single source of truth for column alignment.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactMetadata, Feature};
use crate::error::AppError;
use crate::io::export::ensure_parent_dir;
use crate::models::RandomForest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: RandomForest,
    pub features: Vec<String>,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    /// Resolve the stored column names into features, in stored order.
    pub fn feature_order(&self) -> Result<Vec<Feature>, AppError> {
        self.features
            .iter()
            .map(|n| Feature::from_column(n).ok_or_else(|| unknown_feature(n)))
            .collect()
    }

    /// Check that the feature list and the forest agree with each other.
    pub fn validate(&self) -> Result<Vec<Feature>, AppError> {
        let order = self.feature_order()?;

        let mut seen = order.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != order.len() {
            return Err(AppError::new(3, "Model artifact lists a feature more than once."));
        }
        if order.len() != self.model.n_features() {
            return Err(AppError::new(
                3,
                format!(
                    "Model artifact lists {} features but the model expects {}.",
                    order.len(),
                    self.model.n_features()
                ),
            ));
        }
        self.model
            .validate()
            .map_err(|e| AppError::new(3, format!("Invalid model in artifact: {e}")))?;

        Ok(order)
    }
}

fn unknown_feature(name: &str) -> AppError {
    AppError::new(3, format!("Model artifact lists unknown feature '{name}'."))
}

/// Write the artifact, creating parent directories as needed.
pub fn write_artifact(path: &Path, artifact: &ModelArtifact) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let shown = path.display();
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model artifact '{shown}': {e}")))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, artifact)
        .map_err(|e| AppError::new(2, format!("Failed to write model artifact: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush model artifact: {e}")))?;

    Ok(())
}

/// Read and validate an artifact. Returns it with its resolved feature order.
pub fn read_artifact(path: &Path) -> Result<(ModelArtifact, Vec<Feature>), AppError> {
    if !path.exists() {
        return Err(AppError::missing_file("Model artifact", path, "Run `cgpa train` first."));
    }
    let shown = path.display();
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model artifact '{shown}': {e}")))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(3, format!("Invalid model artifact JSON: {e}")))?;

    let order = artifact.validate()?;
    Ok((artifact, order))
}

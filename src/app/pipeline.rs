//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflows:
//! generate -> CSV, CSV -> train -> artifact, artifact -> predict -> explain.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use crate::data::generate_students;
use crate::domain::{
    DatasetStats, Feature, GenerateConfig, StudentInputs, StudentRecord, Tier, TrainConfig,
    clamp_cgpa,
};
use crate::error::AppError;
use crate::explain::{BACKGROUND_SEED, BACKGROUND_SIZE, Explainer, Explanation, draw_background};
use crate::fit::{TrainOutput, train_forest};
use crate::io::{ModelArtifact, load_students, read_artifact, write_artifact, write_students_csv};

/// Outputs of a single `cgpa generate` run.
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub stats: DatasetStats,
}

/// Synthesize the dataset and write it to `config.output`.
pub fn run_generate(config: &GenerateConfig) -> Result<GenerateOutput, AppError> {
    let records = generate_students(config)?;
    write_students_csv(&config.output, &records)?;
    tracing::info!(rows = records.len(), path = %config.output.display(), "Dataset written");

    let stats = DatasetStats::from_records(&records)
        .ok_or_else(|| AppError::new(4, "Generated dataset is empty."))?;
    Ok(GenerateOutput { stats })
}

/// Load the dataset, fit the forest, and write the artifact.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    let records = load_students(&config.data_path)?;
    tracing::info!(rows = records.len(), path = %config.data_path.display(), "Dataset loaded");

    let out = train_forest(&records, config)?;
    write_artifact(&config.output, &out.artifact)?;
    tracing::info!(path = %config.output.display(), "Model artifact written");
    Ok(out)
}

/// Result of one form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Raw forest output.
    pub raw: f64,
    /// `raw` clamped onto the CGPA scale.
    pub cgpa: f64,
    pub tier: Tier,
    pub explanation: Option<Explanation>,
}

/// A loaded model plus (optionally) its attribution background.
///
/// Built once per process; every prediction borrows it read-only.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: ModelArtifact,
    order: Vec<Feature>,
    explainer: Option<Explainer>,
}

impl Predictor {
    /// Load the artifact and, when `background_data` is given, the background sample.
    pub fn load(model_path: &Path, background_data: Option<&Path>) -> Result<Self, AppError> {
        let (artifact, order) = read_artifact(model_path)?;
        tracing::info!(
            path = %model_path.display(),
            trees = artifact.model.trees().len(),
            "Model loaded"
        );

        let explainer = match background_data {
            Some(path) => {
                let records = load_students(path)?;
                let background = draw_background(&records, BACKGROUND_SIZE, BACKGROUND_SEED);
                let explainer = Explainer::new(&background, &order);
                tracing::debug!(rows = explainer.background_len(), "Background sample drawn");
                Some(explainer)
            }
            None => None,
        };

        Ok(Self {
            artifact,
            order,
            explainer,
        })
    }

    /// Wrap an in-memory artifact without touching the file system.
    pub fn from_artifact(
        artifact: ModelArtifact,
        background: Option<&[StudentRecord]>,
    ) -> Result<Self, AppError> {
        let order = artifact.validate()?;
        let explainer = background.map(|bg| Explainer::new(bg, &order));
        Ok(Self {
            artifact,
            order,
            explainer,
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Stored column order of the model.
    pub fn feature_order(&self) -> &[Feature] {
        &self.order
    }

    pub fn can_explain(&self) -> bool {
        self.explainer.is_some()
    }

    /// Predict one student's final CGPA; attributions are computed when `explain` is set
    /// and a background sample is loaded.
    pub fn predict(&self, inputs: &StudentInputs, explain: bool) -> Result<Prediction, AppError> {
        inputs.validate()?;

        let row = inputs.to_row(&self.order);
        let raw = self.artifact.model.predict(&row);
        if !raw.is_finite() {
            return Err(AppError::new(
                4,
                format!("Model produced a non-finite prediction: {raw}."),
            ));
        }

        let cgpa = clamp_cgpa(raw);
        let tier = Tier::from_cgpa(cgpa);
        tracing::debug!(raw, cgpa, tier = tier.label(), "Prediction");

        let explanation = match (&self.explainer, explain) {
            (Some(explainer), true) => Some(explainer.explain(&self.artifact.model, inputs)),
            _ => None,
        };

        Ok(Prediction {
            raw,
            cgpa,
            tier,
            explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;

    use super::*;
    use crate::domain::{ArtifactMetadata, TreeParams};
    use crate::fit::feature_matrix;
    use crate::models::RandomForest;

    fn records(n: usize) -> Vec<StudentRecord> {
        generate_students(&GenerateConfig {
            count: n,
            seed: 42,
            output: PathBuf::from("unused.csv"),
        })
        .unwrap()
    }

    fn artifact(order: &[Feature], records: &[StudentRecord]) -> ModelArtifact {
        let (x, y) = feature_matrix(records, order);
        let model = RandomForest::fit(&x, &y, 10, 42, &TreeParams::default()).unwrap();
        ModelArtifact {
            model,
            features: order.iter().map(|f| f.column().to_string()).collect(),
            metadata: ArtifactMetadata {
                tool: "cgpa".to_string(),
                trained_at: Utc::now(),
                dataset: "memory".to_string(),
                n_estimators: 10,
                seed: 42,
                n_train: records.len(),
                n_test: 0,
                test_r2: None,
            },
        }
    }

    #[test]
    fn prediction_is_clamped_classified_and_deterministic() {
        let rows = records(200);
        let predictor = Predictor::from_artifact(artifact(&Feature::ALL, &rows), None).unwrap();
        let inputs = StudentInputs {
            studytime: 3,
            ..StudentInputs::default()
        };

        let a = predictor.predict(&inputs, true).unwrap();
        let b = predictor.predict(&inputs, true).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=5.0).contains(&a.cgpa));
        assert_eq!(a.tier, Tier::from_cgpa(a.cgpa));
        assert!(a.explanation.is_none());
        assert!(!predictor.can_explain());
    }

    #[test]
    fn permuted_stored_order_gives_the_same_answer_as_reindexed_rows() {
        let rows = records(200);
        let mut order = Feature::ALL.to_vec();
        order.rotate_left(4);

        let artifact = artifact(&order, &rows);
        let model = artifact.model.clone();
        let predictor = Predictor::from_artifact(artifact, None).unwrap();
        assert_eq!(predictor.feature_order(), order.as_slice());

        let inputs = StudentInputs {
            g1: 4.6,
            g2: 4.4,
            failures: 1,
            ..StudentInputs::default()
        };
        let p = predictor.predict(&inputs, false).unwrap();
        assert_eq!(p.raw, model.predict(&inputs.to_row(&order)));
    }

    #[test]
    fn explanation_reconstructs_the_raw_prediction() {
        let rows = records(200);
        let artifact = artifact(&Feature::ALL, &rows);
        let predictor = Predictor::from_artifact(artifact, Some(&rows[..60])).unwrap();
        assert!(predictor.can_explain());

        let p = predictor.predict(&StudentInputs::default(), true).unwrap();
        let e = p.explanation.unwrap();
        assert_eq!(e.prediction, p.raw);
        assert!((e.reconstructed() - p.raw).abs() < 1e-9);

        let quiet = predictor.predict(&StudentInputs::default(), false).unwrap();
        assert!(quiet.explanation.is_none());
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        let rows = records(80);
        let predictor = Predictor::from_artifact(artifact(&Feature::ALL, &rows), None).unwrap();
        let bad = StudentInputs {
            g2: 5.5,
            ..StudentInputs::default()
        };
        assert_eq!(predictor.predict(&bad, false).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn missing_artifact_fails_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = Predictor::load(&dir.path().join("model.json"), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("cgpa train"));
    }

    #[test]
    fn generate_then_train_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data/students.csv");
        let model = dir.path().join("model/model.json");

        let gen_out = run_generate(&GenerateConfig {
            count: 120,
            seed: 42,
            output: data.clone(),
        })
        .unwrap();
        assert_eq!(gen_out.stats.n_rows, 120);

        let train_out = run_train(&TrainConfig {
            data_path: data.clone(),
            output: model.clone(),
            n_estimators: 5,
            seed: 42,
            test_fraction: 0.2,
            tree: TreeParams::default(),
        })
        .unwrap();
        assert_eq!(train_out.n_test, 24);

        let predictor = Predictor::load(&model, Some(&data)).unwrap();
        assert_eq!(predictor.artifact(), &train_out.artifact);
        let p = predictor.predict(&StudentInputs::default(), true).unwrap();
        assert!(p.explanation.is_some());
    }
}

//! Fit the forest on a dataset and evaluate it on the held-out split.
//!
//! There is no quality gate: held-out R² is reported as a sanity signal only.

use chrono::Utc;

use crate::domain::{ArtifactMetadata, Feature, StudentRecord, TrainConfig};
use crate::error::AppError;
use crate::fit::metrics::{mae, r2_score, rmse};
use crate::fit::split::train_test_split;
use crate::io::artifact::ModelArtifact;
use crate::models::RandomForest;

/// Held-out diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutMetrics {
    pub r2: Option<f64>,
    pub rmse: f64,
    pub mae: f64,
}

/// Everything `cgpa train` computes before writing the artifact.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub artifact: ModelArtifact,
    pub n_train: usize,
    pub n_test: usize,
    /// `None` when no rows were held out.
    pub holdout: Option<HoldoutMetrics>,
}

/// Split rows into a feature matrix (in `order`) and the label vector.
pub fn feature_matrix(
    records: &[StudentRecord],
    order: &[Feature],
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = records.iter().map(|r| r.inputs.to_row(order)).collect();
    let y = records.iter().map(|r| r.g3).collect();
    (x, y)
}

/// Train on `records` using the canonical feature order.
pub fn train_forest(
    records: &[StudentRecord],
    config: &TrainConfig,
) -> Result<TrainOutput, AppError> {
    let order = Feature::ALL;
    let split = train_test_split(records.len(), config.test_fraction, config.seed)?;

    let train_rows: Vec<StudentRecord> = split.train.iter().map(|&i| records[i]).collect();
    let test_rows: Vec<StudentRecord> = split.test.iter().map(|&i| records[i]).collect();
    let (x_train, y_train) = feature_matrix(&train_rows, &order);
    let (x_test, y_test) = feature_matrix(&test_rows, &order);

    tracing::info!(
        n_train = train_rows.len(),
        n_test = test_rows.len(),
        trees = config.n_estimators,
        seed = config.seed,
        "Fitting random forest"
    );
    let model = RandomForest::fit(
        &x_train,
        &y_train,
        config.n_estimators,
        config.seed,
        &config.tree,
    )?;

    let holdout = if x_test.is_empty() {
        None
    } else {
        let preds = model.predict_many(&x_test);
        Some(HoldoutMetrics {
            r2: r2_score(&y_test, &preds),
            rmse: rmse(&y_test, &preds).unwrap_or(f64::NAN),
            mae: mae(&y_test, &preds).unwrap_or(f64::NAN),
        })
    };
    if let Some(h) = &holdout {
        tracing::info!(r2 = ?h.r2, rmse = h.rmse, mae = h.mae, "Held-out evaluation");
    }

    let artifact = ModelArtifact {
        model,
        features: order.iter().map(|f| f.column().to_string()).collect(),
        metadata: ArtifactMetadata {
            tool: "cgpa".to_string(),
            trained_at: Utc::now(),
            dataset: config.data_path.display().to_string(),
            n_estimators: config.n_estimators,
            seed: config.seed,
            n_train: train_rows.len(),
            n_test: test_rows.len(),
            test_r2: holdout.as_ref().and_then(|h| h.r2),
        },
    };

    Ok(TrainOutput {
        artifact,
        n_train: train_rows.len(),
        n_test: test_rows.len(),
        holdout,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::generate_students;
    use crate::domain::{GenerateConfig, TreeParams};

    fn train_config(trees: usize) -> TrainConfig {
        TrainConfig {
            data_path: PathBuf::from("memory.csv"),
            output: PathBuf::from("unused.json"),
            n_estimators: trees,
            seed: 42,
            test_fraction: 0.2,
            tree: TreeParams::default(),
        }
    }

    fn records(n: usize) -> Vec<StudentRecord> {
        generate_students(&GenerateConfig {
            count: n,
            seed: 42,
            output: PathBuf::from("unused.csv"),
        })
        .unwrap()
    }

    #[test]
    fn trains_a_useful_model_on_synthetic_data() {
        let out = train_forest(&records(400), &train_config(30)).unwrap();
        assert_eq!(out.n_train, 320);
        assert_eq!(out.n_test, 80);

        let holdout = out.holdout.unwrap();
        let r2 = holdout.r2.unwrap();
        // The label is mostly a linear blend of G1/G2, which trees capture well.
        assert!(r2 > 0.6, "held-out r2={r2}");
        assert!(holdout.rmse < 0.7);

        let names: Vec<&str> = out.artifact.features.iter().map(String::as_str).collect();
        let columns: Vec<&str> = Feature::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(names, columns);
        assert_eq!(out.artifact.metadata.test_r2, Some(r2));
        assert!(out.artifact.validate().is_ok());
    }

    #[test]
    fn no_holdout_when_fraction_is_zero() {
        let config = TrainConfig {
            test_fraction: 0.0,
            ..train_config(4)
        };
        let out = train_forest(&records(50), &config).unwrap();
        assert_eq!(out.n_test, 0);
        assert!(out.holdout.is_none());
        assert_eq!(out.artifact.metadata.test_r2, None);
    }
}

//! Bagged regression trees (random forest regressor).
//!
//! Each tree is fitted on a bootstrap resample of the training rows. Per-tree
//! seeds are drawn up front from the forest seed, so the fitted forest does
//! not depend on how rayon schedules the work.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::TreeParams;
use crate::error::AppError;
use crate::models::tree::RegressionTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
    /// Mean impurity decrease per feature, normalized to sum to 1.
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_estimators: usize,
        seed: u64,
        params: &TreeParams,
    ) -> Result<Self, AppError> {
        if n_estimators == 0 {
            return Err(AppError::new(2, "Number of trees must be > 0."));
        }
        if x.is_empty() || x.len() != y.len() {
            let (rows, labels) = (x.len(), y.len());
            return Err(AppError::new(
                3,
                format!("Shape mismatch: {rows} training rows vs {labels} labels."),
            ));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(AppError::new(3, "Training rows must share a non-zero feature count."));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..n_estimators).map(|_| rng.r#gen()).collect();
        let n = x.len();

        let fits: Vec<_> = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, params)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(fits.len());
        for fit in fits {
            let total: f64 = fit.impurity_decrease.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(&fit.impurity_decrease) {
                    *acc += v / total;
                }
            }
            trees.push(fit.tree);
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(Self {
            n_features,
            trees,
            feature_importances: importances,
        })
    }

    /// Mean prediction of all trees for one row.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict_many(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.par_iter().map(|row| self.predict(row)).collect()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Check structural invariants of a deserialized forest.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.feature_importances.len() != self.n_features {
            return Err("importances do not match feature count".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

//! Per-feature attribution of a single prediction.
//!
//! Responsibilities:
//!
//! - draw the background sample once per process
//! - exact interventional Shapley values over the forest (`shap`)
//! - rank contributions for display

pub mod background;
pub mod shap;

pub use background::*;

use crate::domain::{Feature, StudentInputs, StudentRecord};
use crate::models::RandomForest;

/// Whether a feature pushed the prediction up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn of(contribution: f64) -> Self {
        if contribution < 0.0 {
            Direction::Decreased
        } else {
            Direction::Increased
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

/// One feature's share of a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribution {
    pub feature: Feature,
    /// Encoded input value the model saw.
    pub value: f64,
    pub contribution: f64,
}

impl Attribution {
    pub fn direction(&self) -> Direction {
        Direction::of(self.contribution)
    }

    /// "<label>: increased the prediction by 0.123"
    pub fn describe(&self) -> String {
        format!(
            "{}: {} the prediction by {:.3}",
            self.feature.label(),
            self.direction().as_str(),
            self.contribution.abs()
        )
    }
}

/// Attributions for one prediction, in model column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub attributions: Vec<Attribution>,
    /// Mean model output over the background sample.
    pub base_value: f64,
    /// Raw (unclamped) model output.
    pub prediction: f64,
}

impl Explanation {
    /// The `k` largest contributions by magnitude; ties keep canonical feature order.
    pub fn top_contributors(&self, k: usize) -> Vec<Attribution> {
        let mut ranked = self.attributions.clone();
        ranked.sort_by_key(|a| a.feature);
        ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        ranked.truncate(k);
        ranked
    }

    /// `base_value + Σ contributions`.
    pub fn reconstructed(&self) -> f64 {
        let total: f64 = self.attributions.iter().map(|a| a.contribution).sum();
        self.base_value + total
    }
}

/// Background rows encoded in one model's column order.
#[derive(Debug, Clone)]
pub struct Explainer {
    order: Vec<Feature>,
    background: Vec<Vec<f64>>,
}

impl Explainer {
    pub fn new(background: &[StudentRecord], order: &[Feature]) -> Self {
        Self {
            order: order.to_vec(),
            background: background.iter().map(|r| r.inputs.to_row(order)).collect(),
        }
    }

    pub fn background_len(&self) -> usize {
        self.background.len()
    }

    pub fn explain(&self, forest: &RandomForest, inputs: &StudentInputs) -> Explanation {
        let row = inputs.to_row(&self.order);
        let values = shap::forest_shap(forest, &row, &self.background);

        let attributions = self
            .order
            .iter()
            .zip(&row)
            .zip(&values.values)
            .map(|((&feature, &value), &contribution)| Attribution {
                feature,
                value,
                contribution,
            })
            .collect();

        Explanation {
            attributions,
            base_value: values.base_value,
            prediction: forest.predict(&row),
        }
    }
}

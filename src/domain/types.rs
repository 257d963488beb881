//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during synthesis, training and prediction
//! - written to the dataset CSV and the model artifact JSON
//! - shared by the CLI and the TUI front-ends

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lower bound of the CGPA scale.
pub const CGPA_MIN: f64 = 0.0;
/// Upper bound of the CGPA scale.
pub const CGPA_MAX: f64 = 5.0;

/// Name of the label column in the dataset CSV.
pub const LABEL_COLUMN: &str = "G3";

/// One input column of the regressor.
///
/// The declaration order is the canonical CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    G1,
    G2,
    Failures,
    Absences,
    Studytime,
    Health,
    Goout,
    Higher,
    Activities,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::G1,
        Feature::G2,
        Feature::Failures,
        Feature::Absences,
        Feature::Studytime,
        Feature::Health,
        Feature::Goout,
        Feature::Higher,
        Feature::Activities,
    ];

    /// Exact CSV header spelling.
    pub fn column(self) -> &'static str {
        match self {
            Feature::G1 => "G1",
            Feature::G2 => "G2",
            Feature::Failures => "failures",
            Feature::Absences => "absences",
            Feature::Studytime => "studytime",
            Feature::Health => "health",
            Feature::Goout => "goout",
            Feature::Higher => "higher",
            Feature::Activities => "activities",
        }
    }

    /// Human-readable label used in the form and the explanation panel.
    pub fn label(self) -> &'static str {
        match self {
            Feature::G1 => "Year 1 CGPA",
            Feature::G2 => "Year 2 CGPA",
            Feature::Failures => "Carryovers",
            Feature::Absences => "Class Absences",
            Feature::Studytime => "Weekly Study Hours",
            Feature::Health => "Energy / Health Level",
            Feature::Goout => "Social / Partying Frequency",
            Feature::Higher => "Masters Plan?",
            Feature::Activities => "Extra-curriculars?",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    /// Inclusive form bounds `(min, max)` in feature units.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Feature::G1 | Feature::G2 => (CGPA_MIN, CGPA_MAX),
            Feature::Failures => (0.0, 10.0),
            Feature::Absences => (0.0, 50.0),
            Feature::Studytime => (1.0, 4.0),
            Feature::Health | Feature::Goout => (1.0, 5.0),
            Feature::Higher | Feature::Activities => (0.0, 1.0),
        }
    }

    /// One-line help text shown under the slider fields.
    pub fn help(self) -> Option<&'static str> {
        match self {
            Feature::Health => Some("1=Burned Out, 5=Full Energy"),
            Feature::Goout => Some("1=Hermit, 5=Every Night"),
            _ => None,
        }
    }

    pub fn is_flag(self) -> bool {
        matches!(self, Feature::Higher | Feature::Activities)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Display text for a weekly study-time level (1-4).
pub fn studytime_label(level: u8) -> &'static str {
    match level {
        1 => "<2h",
        2 => "2-5h",
        3 => "5-10h",
        4 => ">10h",
        _ => "?",
    }
}

/// The nine self-reported inputs of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentInputs {
    pub g1: f64,
    pub g2: f64,
    pub failures: u32,
    pub absences: u32,
    pub studytime: u8,
    pub health: u8,
    pub goout: u8,
    pub higher: bool,
    pub activities: bool,
}

/// Form defaults, shared by the CLI flags and the UI.
pub const DEFAULT_INPUTS: StudentInputs = StudentInputs {
    g1: 3.5,
    g2: 3.8,
    failures: 0,
    absences: 2,
    studytime: 1,
    health: 4,
    goout: 3,
    higher: true,
    activities: true,
};

impl Default for StudentInputs {
    fn default() -> Self {
        DEFAULT_INPUTS
    }
}

impl StudentInputs {
    /// Numeric encoding of one feature (booleans as 0/1).
    pub fn value_of(&self, feature: Feature) -> f64 {
        match feature {
            Feature::G1 => self.g1,
            Feature::G2 => self.g2,
            Feature::Failures => f64::from(self.failures),
            Feature::Absences => f64::from(self.absences),
            Feature::Studytime => f64::from(self.studytime),
            Feature::Health => f64::from(self.health),
            Feature::Goout => f64::from(self.goout),
            Feature::Higher => flag(self.higher),
            Feature::Activities => flag(self.activities),
        }
    }

    /// Build a feature row in exactly the given column order.
    pub fn to_row(&self, features: &[Feature]) -> Vec<f64> {
        features.iter().map(|&f| self.value_of(f)).collect()
    }

    /// Check every field against the form bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        for feature in Feature::ALL {
            let v = self.value_of(feature);
            let (lo, hi) = feature.bounds();
            if !v.is_finite() || v < lo || v > hi {
                return Err(AppError::new(
                    2,
                    format!(
                        "{} ({}) must be within [{lo}, {hi}], got {v}.",
                        feature.label(),
                        feature.column()
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn flag(v: bool) -> f64 {
    if v { 1.0 } else { 0.0 }
}

/// One labeled row of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub inputs: StudentInputs,
    /// Final CGPA (label).
    pub g3: f64,
}

/// Summary stats about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub g3_min: f64,
    pub g3_max: f64,
    pub g3_mean: f64,
}

impl DatasetStats {
    pub fn from_records(records: &[StudentRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let mut g3_min = f64::INFINITY;
        let mut g3_max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for r in records {
            g3_min = g3_min.min(r.g3);
            g3_max = g3_max.max(r.g3);
            sum += r.g3;
        }
        Some(Self {
            n_rows: records.len(),
            g3_min,
            g3_max,
            g3_mean: sum / records.len() as f64,
        })
    }
}

/// Result category derived from the clamped prediction.
///
/// Variants are ordered from lowest to highest so `Ord` matches the grade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    ThirdOrFail,
    SecondLower,
    SecondUpper,
    FirstClass,
}

impl Tier {
    pub fn from_cgpa(cgpa: f64) -> Self {
        if cgpa >= 4.5 {
            Tier::FirstClass
        } else if cgpa >= 3.5 {
            Tier::SecondUpper
        } else if cgpa >= 2.4 {
            Tier::SecondLower
        } else {
            Tier::ThirdOrFail
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::FirstClass => "First Class Honours",
            Tier::SecondUpper => "Second Class Upper (2:1)",
            Tier::SecondLower => "Second Class Lower (2:2)",
            Tier::ThirdOrFail => "Third Class / Fail",
        }
    }

    /// Display color as an RGB triple.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Tier::FirstClass => (0x28, 0xa7, 0x45),
            Tier::SecondUpper => (0x17, 0xa2, 0xb8),
            Tier::SecondLower => (0xff, 0xc1, 0x07),
            Tier::ThirdOrFail => (0xdc, 0x35, 0x45),
        }
    }

    pub fn color_hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Clamp a raw model output onto the CGPA scale.
pub fn clamp_cgpa(raw: f64) -> f64 {
    raw.clamp(CGPA_MIN, CGPA_MAX)
}

/// Growth limits for a single regression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Settings for `cgpa generate`.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub count: usize,
    pub seed: u64,
    pub output: PathBuf,
}

/// Settings for `cgpa train`.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub output: PathBuf,
    pub n_estimators: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub tree: TreeParams,
}

/// Settings shared by `cgpa predict` and `cgpa ui`.
#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub model_path: PathBuf,
    /// Dataset used to draw the attribution background sample.
    pub data_path: PathBuf,
    pub explain: bool,
}

/// Run metadata stored alongside the fitted forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub tool: String,
    pub trained_at: DateTime<Utc>,
    pub dataset: String,
    pub n_estimators: usize,
    pub seed: u64,
    pub n_train: usize,
    pub n_test: usize,
    /// `None` when the held-out split is empty or has zero variance.
    pub test_r2: Option<f64>,
}

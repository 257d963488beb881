//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the training/prediction code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::Prediction;
use crate::domain::{
    DatasetStats, Feature, GenerateConfig, StudentInputs, TrainConfig, studytime_label,
};
use crate::explain::Explanation;
use crate::fit::TrainOutput;
use crate::models::RegressionTree;

/// Attributions listed under the explanation table.
pub const TOP_CONTRIBUTORS: usize = 3;

/// Format the `cgpa generate` summary.
pub fn format_generate_summary(config: &GenerateConfig, stats: &DatasetStats) -> String {
    let mut out = String::new();

    out.push_str("=== cgpa - Synthetic Student Dataset ===\n");
    out.push_str(&format!("Seed: {}\n", config.seed));
    out.push_str(&format!("Rows: n={}\n", stats.n_rows));
    out.push_str(&format!(
        "G3: min={:.2} mean={:.2} max={:.2}\n",
        stats.g3_min, stats.g3_mean, stats.g3_max
    ));
    out.push_str(&format!("Wrote: {}\n", config.output.display()));

    out
}

/// Format the `cgpa train` summary (split, held-out diagnostics, importances).
pub fn format_train_summary(config: &TrainConfig, run: &TrainOutput) -> String {
    let mut out = String::new();
    let meta = &run.artifact.metadata;

    out.push_str("=== cgpa - Random Forest Training ===\n");
    out.push_str(&format!("Dataset: {}\n", config.data_path.display()));
    let depth_limit = match config.tree.max_depth {
        Some(d) => d.to_string(),
        None => "none".to_string(),
    };
    out.push_str(&format!(
        "Trees: {} | seed={} | max_depth={depth_limit} | min_split={} | min_leaf={}\n",
        meta.n_estimators,
        meta.seed,
        config.tree.min_samples_split,
        config.tree.min_samples_leaf,
    ));
    let (n_train, n_test) = (run.n_train, run.n_test);
    out.push_str(&format!("Split: train={n_train} | test={n_test}\n"));

    let trees = run.artifact.model.trees();
    let max_depth = trees.iter().map(RegressionTree::depth).max().unwrap_or(0);
    let total_depth: usize = trees.iter().map(RegressionTree::depth).sum();
    let mean_depth = total_depth as f64 / trees.len().max(1) as f64;
    out.push_str(&format!("Tree depth: mean={mean_depth:.1} | max={max_depth}\n"));

    out.push_str("\nHeld-out diagnostics:\n");
    match &run.holdout {
        Some(h) => {
            out.push_str(&format!("- R²  : {}\n", fmt_r2(h.r2, 4)));
            out.push_str(&format!("- RMSE: {:.4}\n", h.rmse));
            out.push_str(&format!("- MAE : {:.4}\n", h.mae));
        }
        None => out.push_str("- (no rows held out)\n"),
    }

    out.push_str("\nFeature importances:\n");
    let mut ranked: Vec<(&str, f64)> = run
        .artifact
        .features
        .iter()
        .map(String::as_str)
        .zip(run.artifact.model.feature_importances().iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, importance) in ranked {
        out.push_str(&format!("  {name:<12} {importance:>7.4}\n"));
    }

    out.push_str(&format!("\nWrote: {}\n", config.output.display()));
    out
}

/// Format the input echo and the predicted CGPA with its tier.
pub fn format_prediction(inputs: &StudentInputs, prediction: &Prediction) -> String {
    let mut out = String::new();

    out.push_str("Inputs:\n");
    for feature in Feature::ALL {
        let label = feature.label();
        let value = display_value(inputs, feature);
        out.push_str(&format!("  {label:<28} {value}\n"));
    }

    let tier = prediction.tier;
    out.push_str("\nPredicted Final CGPA\n");
    out.push_str(&format!("  {:.2}  {}\n", prediction.cgpa, tier.label()));
    out.push_str(&format!("  tier color {}\n", tier.color_hex()));
    if prediction.raw != prediction.cgpa {
        let raw = prediction.raw;
        out.push_str(&format!("  (raw model output {raw:.4}, clamped to the 0-5 scale)\n"));
    }

    out
}

/// Format the attribution table and the top contributors.
pub fn format_explanation(explanation: &Explanation) -> String {
    let mut out = String::new();

    let base = explanation.base_value;
    out.push_str(&format!("Base value (background mean): {base:.4}\n"));
    out.push_str(
        format!("{:<28} {:>8} {:>12}\n", "feature", "value", "contribution")
            .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<8} {:-<12}\n", "", "", "").trim_end());
    out.push('\n');
    for a in &explanation.attributions {
        out.push_str(&format!(
            "{:<28} {:>8} {:>+12.4}\n",
            a.feature.label(),
            fmt_value(a.value),
            a.contribution
        ));
    }
    out.push_str(&format!("Model output: {:.4}\n", explanation.prediction));

    out.push_str("\nTop contributors:\n");
    for a in explanation.top_contributors(TOP_CONTRIBUTORS) {
        out.push_str(&format!("- {}\n", a.describe()));
    }

    out
}

/// Form-style rendering of one input.
pub fn display_value(inputs: &StudentInputs, feature: Feature) -> String {
    match feature {
        Feature::G1 => format!("{:.2}", inputs.g1),
        Feature::G2 => format!("{:.2}", inputs.g2),
        Feature::Studytime => {
            let level = inputs.studytime;
            format!("{level} ({})", studytime_label(level))
        }
        Feature::Higher => yes_no(inputs.higher).to_string(),
        Feature::Activities => yes_no(inputs.activities).to_string(),
        other => format!("{}", inputs.value_of(other)),
    }
}

/// Held-out R² with `decimals` places, or `n/a`.
pub fn fmt_r2(r2: Option<f64>, decimals: usize) -> String {
    match r2 {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::generate_students;
    use crate::domain::{Tier, TreeParams};
    use crate::explain::Attribution;
    use crate::fit::train_forest;

    fn explanation() -> Explanation {
        Explanation {
            attributions: vec![
                Attribution {
                    feature: Feature::G1,
                    value: 3.5,
                    contribution: 0.12,
                },
                Attribution {
                    feature: Feature::G2,
                    value: 3.8,
                    contribution: 0.31,
                },
                Attribution {
                    feature: Feature::Failures,
                    value: 2.0,
                    contribution: -0.2,
                },
                Attribution {
                    feature: Feature::Goout,
                    value: 3.0,
                    contribution: 0.01,
                },
            ],
            base_value: 3.0,
            prediction: 3.24,
        }
    }

    #[test]
    fn prediction_block_shows_value_and_tier() {
        let p = Prediction {
            raw: 3.876,
            cgpa: 3.876,
            tier: Tier::SecondUpper,
            explanation: None,
        };
        let text = format_prediction(&StudentInputs::default(), &p);
        assert!(text.contains("Predicted Final CGPA"));
        assert!(text.contains("3.88  Second Class Upper (2:1)"));
        assert!(text.contains("1 (<2h)"));
        assert!(text.contains("tier color #17a2b8"));
        assert!(!text.contains("clamped"));
    }

    #[test]
    fn clamped_output_is_noted() {
        let p = Prediction {
            raw: 5.2,
            cgpa: 5.0,
            tier: Tier::FirstClass,
            explanation: None,
        };
        let text = format_prediction(&StudentInputs::default(), &p);
        assert!(text.contains("clamped"));
    }

    #[test]
    fn explanation_lists_top_three_in_order() {
        let text = format_explanation(&explanation());
        let top = text.split("Top contributors:\n").nth(1).unwrap();
        let lines: Vec<&str> = top.lines().collect();
        assert_eq!(
            lines,
            [
                "- Year 2 CGPA: increased the prediction by 0.310",
                "- Carryovers: decreased the prediction by 0.200",
                "- Year 1 CGPA: increased the prediction by 0.120",
            ]
        );
        assert!(text.contains("Base value (background mean): 3.0000"));
    }

    #[test]
    fn values_render_like_the_form() {
        let inputs = StudentInputs {
            higher: false,
            ..StudentInputs::default()
        };
        assert_eq!(display_value(&inputs, Feature::Higher), "no");
        assert_eq!(display_value(&inputs, Feature::Absences), "2");
        assert_eq!(display_value(&inputs, Feature::G2), "3.80");
        assert_eq!(fmt_value(2.0), "2");
        assert_eq!(fmt_value(3.5), "3.50");
    }

    #[test]
    fn train_summary_reports_split_depth_and_importances() {
        let records = generate_students(&GenerateConfig {
            count: 60,
            seed: 1,
            output: PathBuf::from("unused.csv"),
        })
        .unwrap();
        let config = TrainConfig {
            data_path: PathBuf::from("students.csv"),
            output: PathBuf::from("model.json"),
            n_estimators: 3,
            seed: 1,
            test_fraction: 0.2,
            tree: TreeParams {
                max_depth: Some(3),
                ..TreeParams::default()
            },
        };
        let run = train_forest(&records, &config).unwrap();

        let text = format_train_summary(&config, &run);
        assert!(text.contains("max_depth=3"));
        assert!(text.contains("Split: train=48 | test=12"));
        assert!(text.contains("| max=3\n"));
        assert!(text.contains("Feature importances:\n"));
        assert!(text.contains("  G2 "));
    }

    #[test]
    fn r2_renders_or_falls_back() {
        assert_eq!(fmt_r2(Some(0.91234), 3), "0.912");
        assert_eq!(fmt_r2(None, 4), "n/a");
    }
}

//! Command-line parsing for the CGPA predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the training/prediction code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::DEFAULT_INPUTS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cgpa",
    version,
    about = "Final-year CGPA predictor (random forest)"
)]
pub struct Cli {
    /// Log at debug level (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the synthetic student dataset to CSV.
    Generate(GenerateArgs),
    /// Fit the forest on the dataset and save the model artifact.
    Train(TrainArgs),
    /// Predict one student's final CGPA from flags and print the result.
    Predict(PredictArgs),
    /// Launch the interactive prediction form.
    ///
    /// This uses the same predictor as `cgpa predict`, but collects inputs and
    /// renders results in a terminal UI using Ratatui.
    Ui(UiArgs),
}

/// Options for dataset synthesis.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Number of students to synthesize.
    #[arg(short = 'n', long, default_value_t = 1500)]
    pub count: usize,

    /// Random seed for the generator.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short, long, default_value = "data/students.csv")]
    pub output: PathBuf,
}

/// Options for training.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Dataset CSV produced by `cgpa generate`.
    #[arg(long, default_value = "data/students.csv")]
    pub data: PathBuf,

    /// Model artifact path (JSON).
    #[arg(short, long, default_value = "model/model.json")]
    pub output: PathBuf,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 200)]
    pub trees: usize,

    /// Seed for the split, bootstrap samples, and tree fitting.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Maximum tree depth (unlimited when omitted).
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum rows required to split a node.
    #[arg(long, default_value_t = 2)]
    pub min_samples_split: usize,

    /// Minimum rows in each leaf.
    #[arg(long, default_value_t = 1)]
    pub min_samples_leaf: usize,
}

/// Model and dataset locations shared by `predict` and `ui`.
#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    /// Model artifact produced by `cgpa train`.
    #[arg(long, default_value = "model/model.json")]
    pub model: PathBuf,

    /// Dataset used to draw the attribution background sample.
    #[arg(long, default_value = "data/students.csv")]
    pub data: PathBuf,
}

/// Options for a one-shot prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub paths: ModelArgs,

    /// Year 1 CGPA (0.0-5.0).
    #[arg(long, default_value_t = DEFAULT_INPUTS.g1)]
    pub g1: f64,

    /// Year 2 CGPA (0.0-5.0).
    #[arg(long, default_value_t = DEFAULT_INPUTS.g2)]
    pub g2: f64,

    /// Carryovers (0-10).
    #[arg(long, default_value_t = DEFAULT_INPUTS.failures)]
    pub failures: u32,

    /// Class absences (0-50).
    #[arg(long, default_value_t = DEFAULT_INPUTS.absences)]
    pub absences: u32,

    /// Weekly study hours level: 1 (<2h), 2 (2-5h), 3 (5-10h), 4 (>10h).
    #[arg(long, default_value_t = DEFAULT_INPUTS.studytime)]
    pub studytime: u8,

    /// Energy / health level, 1=Burned Out .. 5=Full Energy.
    #[arg(long, default_value_t = DEFAULT_INPUTS.health)]
    pub health: u8,

    /// Social / partying frequency, 1=Hermit .. 5=Every Night.
    #[arg(long, default_value_t = DEFAULT_INPUTS.goout)]
    pub goout: u8,

    /// Plans a Masters degree.
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.higher,
        action = clap::ArgAction::Set
    )]
    pub higher: bool,

    /// Takes part in extra-curricular activities.
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.activities,
        action = clap::ArgAction::Set
    )]
    pub activities: bool,

    /// Print per-feature attributions and an ASCII bar chart.
    #[arg(long)]
    pub explain: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

/// Options for the interactive form.
#[derive(Debug, Parser, Clone)]
pub struct UiArgs {
    #[command(flatten)]
    pub paths: ModelArgs,

    /// Skip loading the background sample; the explanation panel is disabled.
    #[arg(long)]
    pub no_explain: bool,

    /// Log file (the terminal is owned by the UI).
    #[arg(long, default_value = "logs/cgpa.log")]
    pub log_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_defaults_match_the_form() {
        let cli = Cli::parse_from(["cgpa", "predict"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.g1, 3.5);
        assert_eq!(args.g2, 3.8);
        assert_eq!(args.studytime, 1);
        assert!(args.higher && args.activities);
        assert!(!args.explain);
        assert_eq!(args.paths.model, PathBuf::from("model/model.json"));
    }

    #[test]
    fn boolean_flags_take_explicit_values() {
        let cli = Cli::parse_from([
            "cgpa",
            "predict",
            "--higher",
            "false",
            "--studytime",
            "3",
            "-v",
        ]);
        assert!(cli.verbose);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert!(!args.higher);
        assert_eq!(args.studytime, 3);
    }

    #[test]
    fn train_flags() {
        let cli = Cli::parse_from(["cgpa", "train", "--trees", "50", "--max-depth", "8"]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.trees, 50);
        assert_eq!(args.max_depth, Some(8));
        assert_eq!(args.test_fraction, 0.2);
    }
}

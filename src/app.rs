//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - dispatches to dataset generation, training, prediction, or the UI
//! - prints reports

use clap::Parser;

use crate::cli::{Command, GenerateArgs, PredictArgs, TrainArgs, UiArgs};
use crate::domain::{GenerateConfig, PredictConfig, StudentInputs, TrainConfig, TreeParams};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cgpa` binary.
pub fn run() -> Result<(), AppError> {
    // `cgpa` and `cgpa --model m.json` behave like `cgpa ui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Generate(args) => {
            crate::logging::init_stderr(cli.verbose);
            handle_generate(&args)
        }
        Command::Train(args) => {
            crate::logging::init_stderr(cli.verbose);
            handle_train(&args)
        }
        Command::Predict(args) => {
            crate::logging::init_stderr(cli.verbose);
            handle_predict(&args)
        }
        Command::Ui(args) => {
            crate::logging::init_file(&args.log_file, cli.verbose)?;
            handle_ui(&args)
        }
    }
}

fn handle_generate(args: &GenerateArgs) -> Result<(), AppError> {
    let config = generate_config_from_args(args);
    let out = pipeline::run_generate(&config)?;
    let summary = crate::report::format_generate_summary(&config, &out.stats);
    println!("{summary}");
    Ok(())
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(args);
    let out = pipeline::run_train(&config)?;
    println!("{}", crate::report::format_train_summary(&config, &out));
    Ok(())
}

fn handle_predict(args: &PredictArgs) -> Result<(), AppError> {
    let config = predict_config_from_args(args);
    let inputs = inputs_from_args(args);
    inputs.validate()?;

    let background = config.explain.then_some(config.data_path.as_path());
    let predictor = pipeline::Predictor::load(&config.model_path, background)?;
    let prediction = predictor.predict(&inputs, config.explain)?;

    println!("{}", crate::report::format_prediction(&inputs, &prediction));
    if let Some(explanation) = &prediction.explanation {
        println!("{}", crate::report::format_explanation(explanation));
        let chart = crate::plot::render_attribution_bars(explanation, args.width);
        println!("{chart}");
    }
    Ok(())
}

fn handle_ui(args: &UiArgs) -> Result<(), AppError> {
    let config = ui_config_from_args(args);
    crate::tui::run(&config)
}

pub fn generate_config_from_args(args: &GenerateArgs) -> GenerateConfig {
    GenerateConfig {
        count: args.count,
        seed: args.seed,
        output: args.output.clone(),
    }
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        data_path: args.data.clone(),
        output: args.output.clone(),
        n_estimators: args.trees,
        seed: args.seed,
        test_fraction: args.test_fraction,
        tree: TreeParams {
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            min_samples_leaf: args.min_samples_leaf,
        },
    }
}

pub fn predict_config_from_args(args: &PredictArgs) -> PredictConfig {
    PredictConfig {
        model_path: args.paths.model.clone(),
        data_path: args.paths.data.clone(),
        explain: args.explain,
    }
}

pub fn ui_config_from_args(args: &UiArgs) -> PredictConfig {
    PredictConfig {
        model_path: args.paths.model.clone(),
        data_path: args.paths.data.clone(),
        explain: !args.no_explain,
    }
}

pub fn inputs_from_args(args: &PredictArgs) -> StudentInputs {
    StudentInputs {
        g1: args.g1,
        g2: args.g2,
        failures: args.failures,
        absences: args.absences,
        studytime: args.studytime,
        health: args.health,
        goout: args.goout,
        higher: args.higher,
        activities: args.activities,
    }
}

/// Rewrite argv so `cgpa` defaults to `cgpa ui`.
///
/// Rules:
/// - `cgpa`                      -> `cgpa ui`
/// - `cgpa --model m.json ...`   -> `cgpa ui --model m.json ...`
/// - `cgpa --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("ui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "train" | "predict" | "ui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "ui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "ui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

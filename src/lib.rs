//! `cgpa-predictor` library crate.
//!
//! The binary (`cgpa`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the CLI and the terminal UI share one prediction pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod explain;
pub mod fit;
pub mod io;
pub mod logging;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;

//! Logging setup.
//!
//! Batch commands (`generate`, `train`, `predict`) log to stderr so stdout
//! carries only the report. The UI owns the terminal, so it logs to a file
//! through a non-blocking appender instead.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::error::AppError;
use crate::io::ensure_parent_dir;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn build_env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a stderr subscriber. Subsequent calls are no-ops.
pub fn init_stderr(verbose: bool) {
    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(fmt::layer().with_target(false).with_writer(io::stderr));
    // Already installed (e.g. by a test harness): keep the existing one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Install a subscriber writing to `path` (parent directories created).
pub fn init_file(path: &Path, verbose: bool) -> Result<(), AppError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    ensure_parent_dir(path)?;
    let shown = path.display();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to create log file '{shown}': {e}")))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::new(2, format!("Log path '{shown}' has no file name.")))?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(dir, file_name));
    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(fmt::layer().with_ansi(false).with_writer(writer));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::new(4, format!("Failed to install log subscriber: {e}")))?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log file at {shown}");
    Ok(())
}

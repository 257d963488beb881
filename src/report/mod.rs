//! Reporting utilities: formatted summaries for each command.

pub mod format;

pub use format::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the feature columns and their form bounds (`Feature`)
//! - student rows (`StudentInputs`, `StudentRecord`)
//! - result tiers (`Tier`) and run configuration structs

pub mod types;

pub use types::*;

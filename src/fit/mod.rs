//! Model training.
//!
//! Responsibilities:
//!
//! - seeded train/held-out split
//! - fit the forest and build the artifact
//! - held-out diagnostics (R², RMSE, MAE)

pub mod metrics;
pub mod split;
pub mod trainer;

pub use metrics::*;
pub use split::*;
pub use trainer::*;

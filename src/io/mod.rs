//! Input/output helpers.
//!
//! - dataset CSV ingest + validation (`ingest`)
//! - dataset CSV writer (`export`)
//! - model artifact JSON read/write (`artifact`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;

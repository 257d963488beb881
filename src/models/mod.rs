//! Tree-ensemble regressor.
//!
//! - `tree`: a single CART regression tree stored as a flat node array
//! - `forest`: bootstrap-aggregated trees fitted in parallel

pub mod forest;
pub mod tree;

pub use forest::*;
pub use tree::*;

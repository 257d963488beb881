//! Synthetic training data.

pub mod sample;

pub use sample::*;

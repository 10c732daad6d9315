//! Shared types and utilities for recording-migrator.
//!
//! - Constants shared by the source, storage and migration crates
//! - Batch progress callback trait

pub mod constants;
pub mod progress;

pub use constants::*;
pub use progress::{progress_fn, BatchProgress, FnProgress, ProgressCallback};

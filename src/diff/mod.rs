//! Pruning diff between two snapshots.

mod remove_common;

pub use remove_common::{DiffError, remove_common};

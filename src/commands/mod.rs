//! Command implementations for orduniq.

pub mod dedup;

pub use dedup::{DedupCommand, DedupStats, DriverState};

//! Concurrent conversion of independent log files.

/// Batch runner and per-file jobs.
pub mod batch;
/// Progress events emitted by the runner.
pub mod events;

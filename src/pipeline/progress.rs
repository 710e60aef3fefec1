//! Progress reporting for the summarizer loop.

use tracing::info;

/// Observer for sequential batch progress. All methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    fn started(&self, _total: usize) {}

    /// Called after item `index` (0-based) of `total` is done.
    fn advanced(&self, _index: usize, _total: usize, _label: &str) {}

    fn finished(&self, _total: usize) {}
}

/// Reports progress through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn started(&self, total: usize) {
        info!(total, "Summarizing papers");
    }

    fn advanced(&self, index: usize, total: usize, label: &str) {
        info!(done = index + 1, total, paper = %label, "Summarized");
    }

    fn finished(&self, total: usize) {
        info!(total, "Summaries complete");
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

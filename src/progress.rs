//! Progress-callback trait for per-file batch events.
//!
//! Pass a `&dyn BatchProgressCallback` into
//! [`crate::batch::BatchPipeline::process_batch`] to receive events as the
//! coordinator walks the file list.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a WebSocket, a log, or a
//! status widget without the library knowing anything about how the host
//! application communicates. The event sequence for one run is finite and
//! not restartable mid-run.
//!
//! The coordinator is strictly sequential, so events for a run arrive in
//! order from a single logical thread; the `Send + Sync` bound exists so
//! the same callback can be shared with e.g. a ctrl-c handler or an async
//! task that owns the terminal.

use crate::report::{EmptyTextReason, FileStage};
use std::sync::Arc;

/// Called by the batch coordinator as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any file is processed.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called for soft pre-run conditions (e.g. an empty rule set).
    fn on_warning(&self, message: &str) {
        let _ = message;
    }

    /// Called when a file's pipeline begins.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — number of files in the batch
    /// * `name`  — the file's display name
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called as the file enters each pipeline stage.
    ///
    /// Stages that are skipped (rewrite after blank extraction, build
    /// after a hard extraction error) fire no event.
    fn on_file_stage(&self, index: usize, total: usize, name: &str, stage: FileStage) {
        let _ = (index, total, name, stage);
    }

    /// Called when a file's document was built and queued for the merge.
    ///
    /// `note` is `Some` when the document body is not the rewritten text:
    /// either nothing was extracted, or the rewrite failed and a fallback
    /// body was used.
    fn on_file_complete(&self, index: usize, total: usize, name: &str, note: Option<&EmptyTextReason>) {
        let _ = (index, total, name, note);
    }

    /// Called when a file failed terminally (extraction or build error).
    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once before the merge phase, with the artifact count.
    ///
    /// Not called when no file produced an artifact.
    fn on_merge_start(&self, artifact_count: usize) {
        let _ = artifact_count;
    }

    /// Called once after the run finishes, whatever the outcome.
    ///
    /// # Arguments
    /// * `total_files` — files in the batch
    /// * `succeeded`   — files whose document reached the merge set
    fn on_run_complete(&self, total_files: usize, succeeded: usize) {
        let _ = (total_files, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for a shared callback.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

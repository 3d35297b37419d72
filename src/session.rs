//! Session state: an ordered, mutable file list plus the results of the
//! most recent run.
//!
//! A [`BatchSession`] owns everything an interactive caller needs to keep
//! between runs: the file list (with ordering controls), the lifecycle
//! state, and the last [`RunReport`]. Any mutation of the file list
//! discards prior results, so a report can never describe a list other
//! than the one it was produced from.

use crate::batch::BatchPipeline;
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::input::SourceFile;
use crate::progress::BatchProgressCallback;
use crate::report::{MergedDocument, RunReport};
use tracing::debug;

/// Lifecycle of a session's current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run has happened since the file list last changed.
    #[default]
    NotStarted,
    /// A run is in flight.
    Running,
    /// A run finished; see [`BatchSession::last_report`].
    Complete,
}

/// Mutable batch state between runs.
pub struct BatchSession {
    pipeline: BatchPipeline,
    files: Vec<SourceFile>,
    state: RunState,
    last_report: Option<RunReport>,
}

impl BatchSession {
    /// A fresh session with the production pipeline backends.
    pub fn new() -> Self {
        Self::with_pipeline(BatchPipeline::new())
    }

    /// A session driving a caller-supplied pipeline.
    pub fn with_pipeline(pipeline: BatchPipeline) -> Self {
        Self {
            pipeline,
            files: Vec::new(),
            state: RunState::NotStarted,
            last_report: None,
        }
    }

    // ── File list management ─────────────────────────────────────────────

    /// Append a file to the end of the list.
    ///
    /// # Errors
    /// [`BatchError::DuplicateFile`] if a file with the same name is
    /// already listed.
    pub fn add_file(&mut self, file: SourceFile) -> Result<(), BatchError> {
        if self.files.iter().any(|f| f.name == file.name) {
            return Err(BatchError::DuplicateFile { name: file.name });
        }
        debug!("Adding '{}' ({} bytes)", file.name, file.bytes.len());
        self.files.push(file);
        self.invalidate_results();
        Ok(())
    }

    /// Remove the file at `index` (0-based). Out-of-range indices are a
    /// no-op.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
            self.invalidate_results();
        }
    }

    /// Swap the file at `index` with its predecessor. No-op at the top of
    /// the list or out of range.
    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.files.len() {
            self.files.swap(index - 1, index);
            self.invalidate_results();
        }
    }

    /// Swap the file at `index` with its successor. No-op at the bottom of
    /// the list or out of range.
    pub fn move_down(&mut self, index: usize) {
        if self.files.len() >= 2 && index < self.files.len() - 1 {
            self.files.swap(index, index + 1);
            self.invalidate_results();
        }
    }

    /// Drop every file and all results.
    pub fn clear(&mut self) {
        self.files.clear();
        self.invalidate_results();
    }

    /// The current file list, in processing order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    // ── Run lifecycle ────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The report from the most recent completed run, if the file list has
    /// not changed since.
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// The merged document from the most recent run, if that run merged.
    pub fn merged_output(&self) -> Option<&MergedDocument> {
        self.last_report.as_ref().and_then(|r| r.merged())
    }

    /// Run the pipeline over the session's file list.
    ///
    /// On success the session moves to [`RunState::Complete`] and the
    /// report is retained. A precondition failure (empty list, bad config)
    /// reverts the session to [`RunState::NotStarted`].
    ///
    /// # Errors
    /// [`BatchError::RunInProgress`] if a run is already in flight, plus
    /// any pre-run error from the pipeline.
    pub async fn run(
        &mut self,
        config: &BatchConfig,
        progress: &dyn BatchProgressCallback,
    ) -> Result<&RunReport, BatchError> {
        if self.state == RunState::Running {
            return Err(BatchError::RunInProgress);
        }
        self.state = RunState::Running;
        self.last_report = None;

        match self.pipeline.process_batch(&self.files, config, progress).await {
            Ok(report) => {
                self.state = RunState::Complete;
                Ok(&*self.last_report.insert(report))
            }
            Err(e) => {
                self.state = RunState::NotStarted;
                Err(e)
            }
        }
    }

    /// Synchronous wrapper around [`Self::run`].
    pub fn run_sync(
        &mut self,
        config: &BatchConfig,
        progress: &dyn BatchProgressCallback,
    ) -> Result<&RunReport, BatchError> {
        if self.state == RunState::Running {
            return Err(BatchError::RunInProgress);
        }
        self.state = RunState::Running;
        self.last_report = None;

        match self.pipeline.process_batch_sync(&self.files, config, progress) {
            Ok(report) => {
                self.state = RunState::Complete;
                Ok(&*self.last_report.insert(report))
            }
            Err(e) => {
                self.state = RunState::NotStarted;
                Err(e)
            }
        }
    }

    fn invalidate_results(&mut self) {
        self.state = RunState::NotStarted;
        self.last_report = None;
    }
}

impl Default for BatchSession {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

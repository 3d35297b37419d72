//! The batch coordinator: one end-to-end run over an ordered file list.
//!
//! ## Failure isolation
//!
//! The coordinator's whole job is to keep one file's failure from taking
//! the batch down with it. Per file, the rules are:
//!
//! - Extraction **error** kills the file (skip rewrite and build).
//! - Extraction **empty** skips the rewrite but still builds a document.
//! - Rewrite failure never kills the file — it downgrades to building
//!   with fallback text.
//! - Build error kills the file.
//! - A dead file is excluded from the merge; every other file proceeds.
//!
//! Only two things end a run without per-file processing: a pre-run
//! configuration error, and (after all files) a failed merge — and even
//! the latter leaves every per-file outcome intact in the report.
//!
//! ## Sequencing
//!
//! Files are processed strictly one at a time in list order. Each stage is
//! a blocking call from the coordinator's point of view; there is no
//! retry, no timeout, and no inter-file overlap. The one
//! concurrency-adjacent behaviour is incremental progress: events fire
//! after each file, before the next one starts, so a caller can observe
//! the run in flight.

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::input::SourceFile;
use crate::pipeline::build::{DocumentBuilder, DocxBuilder};
use crate::pipeline::extract::{PdfTextExtractor, TextExtractor};
use crate::pipeline::merge::{DocumentMerger, DocxMerger};
use crate::pipeline::rewrite::{GeminiRewriter, TextRewriter};
use crate::pipeline::ProcessedArtifact;
use crate::progress::BatchProgressCallback;
use crate::report::{
    EmptyTextReason, FileReport, FileStage, FileStatus, MergedDocument, RunOutcome, RunReport,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The batch pipeline: four stage backends behind trait seams.
pub struct BatchPipeline {
    extractor: Arc<dyn TextExtractor>,
    rewriter: Arc<dyn TextRewriter>,
    builder: Arc<dyn DocumentBuilder>,
    merger: Arc<dyn DocumentMerger>,
}

impl BatchPipeline {
    /// Production constructor: pdf-extract, Gemini, docx-rs backends.
    pub fn new() -> Self {
        Self {
            extractor: Arc::new(PdfTextExtractor::new()),
            rewriter: Arc::new(GeminiRewriter::new()),
            builder: Arc::new(DocxBuilder::new()),
            merger: Arc::new(DocxMerger::new()),
        }
    }

    /// Inject specific stage backends (tests, alternative providers).
    pub fn with_stages(
        extractor: Arc<dyn TextExtractor>,
        rewriter: Arc<dyn TextRewriter>,
        builder: Arc<dyn DocumentBuilder>,
        merger: Arc<dyn DocumentMerger>,
    ) -> Self {
        Self {
            extractor,
            rewriter,
            builder,
            merger,
        }
    }

    /// Run the full pipeline over `files`, in order.
    ///
    /// # Returns
    /// `Ok(RunReport)` whenever processing happened at all — including
    /// runs where every file failed or the merge failed; inspect
    /// [`RunReport::outcome`].
    ///
    /// # Errors
    /// Returns `Err(BatchError)` only for pre-run configuration problems
    /// (empty list, missing API key or model). In that case no file was
    /// touched.
    pub async fn process_batch(
        &self,
        files: &[SourceFile],
        config: &BatchConfig,
        progress: &dyn BatchProgressCallback,
    ) -> Result<RunReport, BatchError> {
        let run_start = Instant::now();

        // ── Preconditions ────────────────────────────────────────────────
        if files.is_empty() {
            return Err(BatchError::EmptyFileList);
        }
        config.validate_for_run()?;
        if config.rules.trim().is_empty() {
            progress.on_warning("Rule set is empty; processing without specific instructions");
        }

        let total = files.len();
        info!("Starting batch run over {} file(s)", total);
        progress.on_run_start(total);

        // ── Per-file pipeline ────────────────────────────────────────────
        let mut reports: Vec<FileReport> = Vec::with_capacity(total);
        let mut artifacts: Vec<ProcessedArtifact> = Vec::new();

        for (i, file) in files.iter().enumerate() {
            let index = i + 1;
            progress.on_file_start(index, total, &file.name);

            let (report, artifact) = self
                .process_file(file, index, total, config, progress)
                .await;

            if let FileStatus::Failed { error } = &report.status {
                warn!("'{}' failed: {}", file.name, error);
            }
            reports.push(report);
            if let Some(artifact) = artifact {
                artifacts.push(artifact);
            }
        }

        let processed_count = artifacts.len();

        // ── Merge phase ──────────────────────────────────────────────────
        let outcome = if artifacts.is_empty() {
            info!("No documents were produced; nothing to merge");
            RunOutcome::NothingToMerge
        } else {
            progress.on_merge_start(processed_count);
            info!("Merging {} document(s)", processed_count);
            match self.merger.merge(&artifacts) {
                Ok(bytes) => {
                    info!("Merge complete: {} bytes", bytes.len());
                    RunOutcome::Merged(MergedDocument::new(bytes, processed_count))
                }
                Err(e) => {
                    warn!("Merge failed: {}", e);
                    RunOutcome::MergeFailed {
                        detail: e.detail.clone(),
                    }
                }
            }
        };

        progress.on_run_complete(total, processed_count);

        Ok(RunReport {
            files: reports,
            outcome,
            processed_count,
            duration_ms: run_start.elapsed().as_millis() as u64,
        })
    }

    /// Synchronous wrapper around [`Self::process_batch`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn process_batch_sync(
        &self,
        files: &[SourceFile],
        config: &BatchConfig,
        progress: &dyn BatchProgressCallback,
    ) -> Result<RunReport, BatchError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| BatchError::Internal(format!("failed to create tokio runtime: {e}")))?
            .block_on(self.process_batch(files, config, progress))
    }

    /// Drive one file through Extract → Rewrite → Build.
    ///
    /// Returns the file's report plus, on success, the built document
    /// destined for the merge set.
    async fn process_file(
        &self,
        file: &SourceFile,
        index: usize,
        total: usize,
        config: &BatchConfig,
        progress: &dyn BatchProgressCallback,
    ) -> (FileReport, Option<ProcessedArtifact>) {
        // 1. Extract
        progress.on_file_stage(index, total, &file.name, FileStage::Extracting);
        let extracted = match self.extractor.extract(&file.name, &file.bytes) {
            Ok(text) => text,
            Err(error) => {
                progress.on_file_error(index, total, &file.name, &error.to_string());
                return (
                    FileReport {
                        index,
                        name: file.name.clone(),
                        status: FileStatus::Failed { error },
                    },
                    None,
                );
            }
        };

        // 2. Rewrite (skipped entirely for blank extractions)
        let (body, note) = if extracted.trim().is_empty() {
            info!("'{}': no text extracted, skipping rewrite", file.name);
            (String::new(), Some(EmptyTextReason::ExtractionEmpty))
        } else {
            progress.on_file_stage(index, total, &file.name, FileStage::Rewriting);
            match self.rewriter.rewrite(&file.name, &extracted, config).await {
                Ok(rewritten) => (rewritten, None),
                Err(failure) => {
                    warn!("'{}': rewrite failed ({}), continuing", file.name, failure);
                    let fallback = if config.fallback_to_raw_text {
                        extracted
                    } else {
                        String::new()
                    };
                    (
                        fallback,
                        Some(EmptyTextReason::RewriteFailed {
                            detail: failure.detail,
                        }),
                    )
                }
            }
        };

        // 3. Build
        progress.on_file_stage(index, total, &file.name, FileStage::Building);
        match self.builder.build(&file.name, &body) {
            Ok(docx) => {
                progress.on_file_complete(index, total, &file.name, note.as_ref());
                (
                    FileReport {
                        index,
                        name: file.name.clone(),
                        status: FileStatus::Done { note },
                    },
                    Some(ProcessedArtifact {
                        name: file.name.clone(),
                        docx,
                    }),
                )
            }
            Err(error) => {
                progress.on_file_error(index, total, &file.name, &error.to_string());
                (
                    FileReport {
                        index,
                        name: file.name.clone(),
                        status: FileStatus::Failed { error },
                    },
                    None,
                )
            }
        }
    }
}

impl Default for BatchPipeline {
    fn default() -> Self {
        Self::new()
    }
}

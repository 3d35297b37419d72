//! Result types for a batch run.
//!
//! One [`RunReport`] is produced per run. It always carries exactly one
//! [`FileReport`] per input file — a failed merge or an empty merge set
//! never erases the per-file outcomes, because those are what the user
//! needs to diagnose which file went wrong.

use crate::error::{BatchError, FileError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Fixed name for the downloadable merged artifact.
pub const MERGED_FILE_NAME: &str = "merged_arabic_documents.docx";

/// MIME type identifying the merged artifact as a Word document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The pipeline stage a file is currently in, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStage {
    /// Pulling embedded text out of the PDF.
    Extracting,
    /// Sending the extracted text to the LLM for correction.
    Rewriting,
    /// Creating the per-file Word document.
    Building,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStage::Extracting => write!(f, "extracting text"),
            FileStage::Rewriting => write!(f, "rewriting with Gemini"),
            FileStage::Building => write!(f, "creating Word document"),
        }
    }
}

/// Why a successfully built document does not contain rewritten text.
///
/// Carried on `Done` reports so the user can tell an empty source file
/// apart from a transient rewrite error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyTextReason {
    /// The PDF yielded no text (image-only or genuinely empty).
    ExtractionEmpty,
    /// The LLM call failed; the document was built from fallback text.
    RewriteFailed { detail: String },
}

impl fmt::Display for EmptyTextReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyTextReason::ExtractionEmpty => write!(f, "no text extracted from source"),
            EmptyTextReason::RewriteFailed { detail } => write!(f, "rewrite failed: {detail}"),
        }
    }
}

/// Terminal status of one file after its pipeline ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileStatus {
    /// A document was built and entered the merge set.
    Done { note: Option<EmptyTextReason> },
    /// Extraction or build failed; the file is excluded from the merge.
    Failed { error: FileError },
}

/// Outcome for a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// 1-indexed position in the batch.
    pub index: usize,
    /// The file's display name.
    pub name: String,
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_done(&self) -> bool {
        matches!(self.status, FileStatus::Done { .. })
    }

    /// Human-readable status line, e.g. for a console trace.
    pub fn status_line(&self, total: usize) -> String {
        match &self.status {
            FileStatus::Done { note: None } => {
                format!("'{}' ({}/{}) — done", self.name, self.index, total)
            }
            FileStatus::Done { note: Some(reason) } => {
                format!("'{}' ({}/{}) — done ({})", self.name, self.index, total, reason)
            }
            FileStatus::Failed { error } => {
                format!("'{}' ({}/{}) — failed: {}", self.name, self.index, total, error)
            }
        }
    }
}

/// The published merged artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedDocument {
    /// Raw `.docx` payload. Skipped in JSON reports; `size_bytes` stands
    /// in for it there.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Download name, always [`MERGED_FILE_NAME`].
    pub file_name: String,
    /// Content type, always [`DOCX_MIME`].
    pub content_type: String,
    /// Number of source files that contributed a section.
    pub merged_count: usize,
    /// Payload size in bytes (serialised in place of the payload itself).
    pub size_bytes: usize,
}

impl MergedDocument {
    pub fn new(bytes: Vec<u8>, merged_count: usize) -> Self {
        let size_bytes = bytes.len();
        Self {
            bytes,
            file_name: MERGED_FILE_NAME.to_string(),
            content_type: DOCX_MIME.to_string(),
            merged_count,
            size_bytes,
        }
    }

    /// Write the payload to `path` via a sibling temp file and rename, so
    /// a failed write never leaves a truncated document at the target.
    pub fn write_to(&self, path: &Path) -> Result<(), BatchError> {
        let tmp = path.with_extension("docx.tmp");
        std::fs::write(&tmp, &self.bytes)
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|source| BatchError::OutputWriteFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Run-level outcome, distinct from the per-file outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The merge succeeded; a downloadable document was produced.
    Merged(MergedDocument),
    /// Every file failed (or produced nothing); there was nothing to merge.
    /// Not an error — the per-file reports explain what happened.
    NothingToMerge,
    /// At least one document existed but the merge itself failed.
    /// No output is published; per-file outcomes remain valid.
    MergeFailed { detail: String },
}

/// The complete result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Exactly one entry per input file, in batch order.
    pub files: Vec<FileReport>,
    pub outcome: RunOutcome,
    /// Files whose document reached the merge set.
    pub processed_count: usize,
    pub duration_ms: u64,
}

impl RunReport {
    /// The merged artifact, if this run published one.
    pub fn merged(&self) -> Option<&MergedDocument> {
        match &self.outcome {
            RunOutcome::Merged(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_done()).count()
    }
}

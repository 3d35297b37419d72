//! Error types for the arabic-pdf2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the run cannot proceed at all (missing
//!   API key, no model selected, empty file list, another run already in
//!   flight). Returned as `Err(BatchError)` before any file is processed.
//!
//! * [`FileError`] — **Non-fatal**: a single file failed (unreadable PDF,
//!   document creation failure) but the other files in the batch are fine.
//!   Stored inside [`crate::report::FileReport`] so callers can inspect
//!   partial success rather than losing the whole batch to one bad file.
//!
//! Rewrite failures are deliberately in neither enum: per the pipeline
//! contract a failed rewrite downgrades to "build with fallback text" and
//! is recorded as a note on the file's report, never as an error.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the arabic-pdf2docx library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::report::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Pre-run configuration errors ──────────────────────────────────────
    /// No Gemini API key was configured.
    #[error("No API key configured.\nSet GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// No model identifier was selected.
    #[error("No model selected.\nPass --model (e.g. gemini-1.5-flash-latest).")]
    MissingModel,

    /// The run was requested with an empty file list.
    #[error("No PDF files to process.\nAdd at least one file before running.")]
    EmptyFileList,

    /// A run is already in progress for this session.
    #[error("A run is already in progress; wait for it to finish before starting another")]
    RunInProgress,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors (CLI file loading) ───────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A file with the same name is already in the batch.
    ///
    /// Filenames are the identity of a batch entry (they label sections in
    /// the merged output), so duplicates are rejected rather than replaced.
    #[error("A file named '{name}' is already in the batch")]
    DuplicateFile { name: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the merged output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file in the batch.
///
/// Terminal for that file only: the file is excluded from the merge and
/// the run continues with the next file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// Text extraction failed outright (corrupt or unreadable PDF).
    #[error("'{name}': text extraction failed: {detail}")]
    Extraction { name: String, detail: String },

    /// The Word document for this file could not be created.
    #[error("'{name}': document creation failed: {detail}")]
    Build { name: String, detail: String },
}

impl FileError {
    /// The filename this error belongs to.
    pub fn file_name(&self) -> &str {
        match self {
            FileError::Extraction { name, .. } | FileError::Build { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_mentions_env_var() {
        let msg = BatchError::MissingApiKey.to_string();
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn duplicate_file_names_the_file() {
        let e = BatchError::DuplicateFile {
            name: "report.pdf".into(),
        };
        assert!(e.to_string().contains("report.pdf"));
    }

    #[test]
    fn file_error_reports_its_file() {
        let e = FileError::Extraction {
            name: "scan.pdf".into(),
            detail: "bad xref".into(),
        };
        assert_eq!(e.file_name(), "scan.pdf");
        assert!(e.to_string().contains("bad xref"));
    }
}

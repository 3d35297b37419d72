//! # arabic-pdf2docx
//!
//! Batch-process Arabic PDF files into a single merged Word document.
//!
//! ## Why this crate?
//!
//! Scanned-in or exported Arabic PDFs rarely survive plain text extraction
//! intact: diacritics get mangled, line order drifts, and typography is
//! lost. This crate extracts the raw text, has an LLM (Gemini) rewrite it
//! under a caller-supplied rule set, lays the result out as right-aligned
//! Word paragraphs, and merges every file in the batch into one `.docx` —
//! while keeping any single file's failure from sinking the rest of the
//! batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF list (ordered)
//!  │  per file, sequentially:
//!  ├─ 1. Extract  pdf-extract text layer, NFC-normalised
//!  ├─ 2. Rewrite  Gemini applies the Arabic rewriting rules
//!  │              (skipped when extraction is blank; failure falls
//!  │               back to empty or raw text, never kills the file)
//!  ├─ 3. Build    docx-rs right-aligned paragraphs, one .docx per file
//!  │  then once:
//!  └─ 4. Merge    surviving documents joined in list order with
//!                 page breaks → merged_arabic_documents.docx
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arabic_pdf2docx::{BatchConfig, BatchSession, NoopProgressCallback, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder().api_key_from_env().build()?;
//!
//!     let mut session = BatchSession::new();
//!     session.add_file(SourceFile::from_path("chapter-1.pdf")?)?;
//!     session.add_file(SourceFile::from_path("chapter-2.pdf")?)?;
//!
//!     let report = session.run(&config, &NoopProgressCallback).await?;
//!     for file in &report.files {
//!         eprintln!("{}", file.status_line(report.files.len()));
//!     }
//!     if let Some(merged) = report.merged() {
//!         std::fs::write(&merged.file_name, &merged.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2docx` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! arabic-pdf2docx = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::BatchPipeline;
pub use config::{BatchConfig, BatchConfigBuilder, DEFAULT_MODEL, KNOWN_MODELS};
pub use error::{BatchError, FileError};
pub use input::SourceFile;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{
    EmptyTextReason, FileReport, FileStage, FileStatus, MergedDocument, RunOutcome, RunReport,
    DOCX_MIME, MERGED_FILE_NAME,
};
pub use session::{BatchSession, RunState};

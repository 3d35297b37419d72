//! Pipeline stages for batch PDF-to-DOCX conversion.
//!
//! Each submodule implements exactly one transformation step behind a
//! trait seam, so the coordinator can be exercised with scripted stage
//! implementations and a stage backend can be swapped without touching
//! the others.
//!
//! ## Data Flow (per file)
//!
//! ```text
//! extract ──▶ rewrite ──▶ build          ──▶ merge (once, after all files)
//! (pdf-extract) (Gemini)   (docx-rs)         (zip/quick-xml + docx-rs)
//! ```
//!
//! 1. [`extract`] — pull embedded text out of the PDF bytes
//! 2. [`rewrite`] — LLM correction pass; the only stage with network I/O
//! 3. [`build`]   — one `.docx` per file, even for empty text
//! 4. [`merge`]   — combine surviving documents, in batch order
//! 5. [`postprocess`] — deterministic cleanup of LLM output text

pub mod build;
pub mod extract;
pub mod merge;
pub mod postprocess;
pub mod rewrite;

/// A per-file document queued for the merge: the source filename plus the
/// built `.docx` payload. Produced only for files that completed their
/// pipeline; consumed exactly once by the merger.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    pub name: String,
    pub docx: Vec<u8>,
}

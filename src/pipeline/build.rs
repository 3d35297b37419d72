//! Document building: turn plain text into a single `.docx` payload.
//!
//! One paragraph per text paragraph (blank-line separated), right-aligned
//! for Arabic reading order. Empty input is valid and produces a document
//! with a single empty paragraph — the merged output keeps one section per
//! source file even when a source yielded no text, so section count always
//! matches the contributing file count.

use crate::error::FileError;
use docx_rs::{AlignmentType, Docx, Paragraph, Run};
use std::io::Cursor;
use tracing::debug;

/// Stage seam for per-file document creation.
pub trait DocumentBuilder: Send + Sync {
    /// Build a single-file `.docx` payload from plain text (possibly empty).
    fn build(&self, name: &str, text: &str) -> Result<Vec<u8>, FileError>;
}

/// Production builder backed by `docx-rs`.
pub struct DocxBuilder;

impl DocxBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder for DocxBuilder {
    fn build(&self, name: &str, text: &str) -> Result<Vec<u8>, FileError> {
        let paragraphs = split_paragraphs(text);
        debug!("'{}': building document with {} paragraph(s)", name, paragraphs.len());

        let mut docx = Docx::new();
        if paragraphs.is_empty() {
            // Placeholder body so the section still exists in the merge.
            docx = docx.add_paragraph(arabic_paragraph(""));
        } else {
            for para in &paragraphs {
                docx = docx.add_paragraph(arabic_paragraph(para));
            }
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).map_err(|e| FileError::Build {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

        Ok(buf.into_inner())
    }
}

/// Right-aligned paragraph, matching Arabic reading order.
fn arabic_paragraph(text: &str) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Right)
        .add_run(Run::new().add_text(text))
}

/// Split text into paragraphs at blank lines; single newlines inside a
/// paragraph become spaces.
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.split('\n').map(str::trim).collect::<Vec<_>>().join(" "))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

//! Text extraction: pull embedded text out of a PDF payload.
//!
//! Extraction works on the in-memory bytes the batch already holds — no
//! temp file round-trip. `pdf-extract` handles the content-stream decoding
//! internally; what it cannot give us is text for image-only scans, which
//! come back as an empty (or whitespace-only) string. That case is a
//! legitimate outcome, not an error: the pipeline still produces a
//! placeholder document for the file so the merged output keeps one
//! section per source.
//!
//! Extracted Arabic text is NFC-normalised (extractors frequently emit
//! decomposed presentation forms) and whitespace-tidied before it goes to
//! the rewriter.

use crate::error::FileError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Stage seam for text extraction.
///
/// The production implementation is [`PdfTextExtractor`]; tests substitute
/// scripted implementations to exercise the coordinator's fallback paths.
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from a PDF payload.
    ///
    /// Returns `Ok` with possibly-empty text (empty means "nothing to
    /// extract", e.g. an image-only scan). `Err` is a hard failure that
    /// excludes the file from the rest of its pipeline.
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, FileError>;
}

/// Production extractor backed by the `pdf-extract` crate.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, FileError> {
        let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| FileError::Extraction {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

        let text = tidy_extracted_text(&raw);
        debug!("Extracted {} chars from '{}'", text.len(), name);
        Ok(text)
    }
}

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// NFC-normalise and tidy whitespace without reflowing paragraphs.
///
/// Single newlines are kept (they often mark line breaks the rewriter
/// uses to reconstruct paragraphs); only horizontal whitespace runs and
/// excessive blank-line runs are collapsed.
pub fn tidy_extracted_text(raw: &str) -> String {
    let normalized: String = raw.nfc().collect();
    let no_controls: String = normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let squeezed = RE_SPACES.replace_all(&no_controls, " ");
    let lines: Vec<&str> = squeezed.lines().map(|l| l.trim()).collect();
    let joined = lines.join("\n");
    RE_BLANK_RUNS.replace_all(&joined, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tidy_collapses_horizontal_whitespace() {
        assert_eq!(tidy_extracted_text("a  \t  b"), "a b");
    }

    #[test]
    fn tidy_preserves_paragraph_breaks() {
        assert_eq!(tidy_extracted_text("one\n\n\n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn tidy_strips_control_chars() {
        assert_eq!(tidy_extracted_text("a\u{0007}b\u{0000}c"), "abc");
    }

    #[test]
    fn tidy_nfc_normalises() {
        // U+0065 U+0301 (decomposed) → U+00E9 (composed)
        assert_eq!(tidy_extracted_text("e\u{0301}"), "\u{00E9}");
    }

    #[test]
    fn whitespace_only_input_becomes_empty() {
        assert_eq!(tidy_extracted_text(" \n \t \n"), "");
    }

    #[test]
    fn extractor_rejects_garbage_bytes() {
        let extractor = PdfTextExtractor::new();
        let err = extractor.extract("junk.pdf", b"this is not a pdf at all");
        assert!(matches!(err, Err(FileError::Extraction { .. })));
        if let Err(e) = err {
            assert_eq!(e.file_name(), "junk.pdf");
        }
    }
}

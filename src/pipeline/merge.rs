//! Document merging: combine per-file `.docx` payloads into one document.
//!
//! Each artifact is a complete DOCX (a ZIP container holding
//! `word/document.xml`). The merger reads every artifact's paragraph text
//! back out of that XML and re-emits a single document in artifact order,
//! one section per source file, separated by page breaks. Reading the XML
//! rather than splicing archives keeps the merge independent of how any
//! particular builder laid out its package parts.
//!
//! Merge failure is run-level: the caller discards the output but keeps
//! all per-file outcomes.

use crate::pipeline::ProcessedArtifact;
use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::debug;

/// Run-level merge failure.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct MergeFailure {
    pub detail: String,
}

impl MergeFailure {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Stage seam for the final merge.
pub trait DocumentMerger: Send + Sync {
    /// Merge artifacts, preserving their order, into one `.docx` payload.
    ///
    /// Callers guarantee `artifacts` is non-empty; an empty merge set is
    /// handled upstream as a distinct "nothing to merge" outcome.
    fn merge(&self, artifacts: &[ProcessedArtifact]) -> Result<Vec<u8>, MergeFailure>;
}

/// Production merger backed by `zip` + `quick-xml` for reading and
/// `docx-rs` for re-emitting.
pub struct DocxMerger;

impl DocxMerger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentMerger for DocxMerger {
    fn merge(&self, artifacts: &[ProcessedArtifact]) -> Result<Vec<u8>, MergeFailure> {
        let mut docx = Docx::new();

        for (i, artifact) in artifacts.iter().enumerate() {
            if i > 0 {
                docx = docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                );
            }

            let paragraphs = read_docx_paragraphs(&artifact.docx).map_err(|e| {
                MergeFailure::new(format!("failed to read section for '{}': {}", artifact.name, e))
            })?;
            debug!(
                "Merging '{}': {} paragraph(s)",
                artifact.name,
                paragraphs.len()
            );

            if paragraphs.is_empty() {
                docx = docx.add_paragraph(rtl_paragraph(""));
            } else {
                for para in &paragraphs {
                    docx = docx.add_paragraph(rtl_paragraph(para));
                }
            }
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| MergeFailure::new(format!("failed to pack merged document: {e}")))?;

        Ok(buf.into_inner())
    }
}

fn rtl_paragraph(text: &str) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Right)
        .add_run(Run::new().add_text(text))
}

/// Read the paragraph texts out of a DOCX payload's `word/document.xml`.
///
/// Walks the XML events collecting `w:t` text, closing a paragraph at each
/// `</w:p>`. Empty paragraphs are kept — they are intentional spacing in
/// the source documents.
fn read_docx_paragraphs(payload: &[u8]) -> Result<Vec<String>, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload))
        .map_err(|e| format!("not a DOCX container: {e}"))?;

    let mut xml_content = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| format!("word/document.xml missing: {e}"))?
        .read_to_string(&mut xml_content)
        .map_err(|e| format!("failed to read document.xml: {e}"))?;

    parse_document_xml(&xml_content)
}

fn parse_document_xml(xml: &str) -> Result<Vec<String>, String> {
    // Text is only collected inside `w:t`, so inter-tag whitespace never
    // leaks in and intra-run spacing (`<w:t>two </w:t>`) survives.
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if in_paragraph {
                        paragraphs.push(std::mem::take(&mut current));
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    current.push_str(&e.xml_content().unwrap_or_default());
                }
            }
            // quick-xml 0.38 emits `&amp;`, `&#1593;`, etc. as separate
            // `GeneralRef` events rather than as part of `Text`.
            Ok(Event::GeneralRef(e)) => {
                if in_text {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        current.push(ch);
                    } else if let Some(s) = e
                        .decode()
                        .ok()
                        .and_then(|name| resolve_predefined_entity(&name))
                    {
                        current.push_str(s);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parsing error: {e}")),
            _ => {}
        }
    }

    Ok(paragraphs)
}

//! Prompt text for the Gemini rewrite stage.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default correction rules
//!    or the prompt frame requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt
//!    without a live API call, making prompt regressions easy to catch.
//!
//! Callers override the rules via [`crate::config::BatchConfig::rules`];
//! the constant here is used only when no override is provided.

/// Default correction rules applied to extracted Arabic text.
pub const DEFAULT_RULES: &str = "\
1. Correct any OCR errors or misinterpretations in the Arabic text.
2. Ensure proper Arabic script formatting, including ligatures and character forms.
3. Remove any headers, footers, or page numbers that are not part of the main content.
4. Structure the text into logical paragraphs based on the original document.
5. Maintain the original meaning and intent of the text.
6. If tables are present, try to format them clearly using tab separation or simple markdown.
";

/// Frame instruction the rules and text are embedded into.
///
/// The closing "output only the processed text" line matters: without it
/// the model tends to preface its answer with commentary that would end up
/// verbatim in the Word document.
const PROMPT_FRAME: &str = "\
You are an expert editor of Arabic documents. You are given raw text \
extracted from a PDF. Process it according to the rules below and return \
the corrected text.

Output ONLY the processed Arabic text. Do not add commentary, headers, or \
markdown fences.";

/// Assemble the full rewrite prompt from a rule set and the extracted text.
///
/// An empty rule set produces a rules-free prompt (the run proceeds with
/// just the frame instruction, mirroring a blank rules field).
pub fn compose_prompt(rules: &str, text: &str) -> String {
    let rules = rules.trim();
    if rules.is_empty() {
        format!("{PROMPT_FRAME}\n\nText to process:\n{text}")
    } else {
        format!("{PROMPT_FRAME}\n\nRules:\n{rules}\n\nText to process:\n{text}")
    }
}

//! Post-processing: deterministic cleanup of LLM-returned text.
//!
//! Even a well-prompted model occasionally returns artefacts that are
//! harmless in a chat window but ugly in a Word document:
//!
//! - Wrapping the whole answer in ` ``` ` fences despite the prompt
//!   saying not to
//! - Windows-style `\r\n` line endings
//! - Runs of four or more blank lines
//! - Invisible Unicode (zero-width joiners the model echoes back, BOM)
//!
//! This module applies cheap, deterministic string rules that fix those
//! quirks without touching content. Keeping them here rather than in the
//! prompt means the prompt stays focused on *what to correct*, not on
//! formatting edge-cases. Each rule is independently testable.
//!
//! Rule order matters: fences are stripped before blank-line collapsing so
//! the fence lines don't count as content, and the final trim runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw LLM output.
pub fn clean_rewritten_text(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 5: Remove invisible Unicode ─────────────────────────────────────

/// Zero-width space, BOM, word joiner, soft hyphen.
///
/// Zero-width joiner/non-joiner (U+200C/U+200D) are intentionally kept:
/// they are meaningful in Arabic script shaping.
fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{FEFF}' | '\u{2060}' | '\u{00AD}'))
        .collect()
}

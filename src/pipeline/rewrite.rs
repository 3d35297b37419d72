//! LLM rewrite: send extracted text to Gemini for correction.
//!
//! This stage is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching the HTTP or
//! error-handling logic here.
//!
//! ## Failure semantics
//!
//! A rewrite failure is *soft* by contract: it never fails the file, it
//! only changes what text the document is built from. That is why this
//! module has its own [`RewriteFailure`] type instead of reusing
//! [`crate::error::FileError`] — the type system keeps "this file is dead"
//! and "this file continues with fallback text" from being confused.
//!
//! There is deliberately no retry loop: the batch contract is one blocking
//! call per stage, and a failed rewrite already has a well-defined
//! downgrade path.

use crate::config::BatchConfig;
use crate::pipeline::postprocess::clean_rewritten_text;
use crate::prompts::compose_prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Soft, per-file rewrite failure. Never fatal to the file.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct RewriteFailure {
    pub detail: String,
}

impl RewriteFailure {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Stage seam for the LLM rewrite.
#[async_trait]
pub trait TextRewriter: Send + Sync {
    /// Rewrite `text` according to the config's rule set and model.
    ///
    /// Returns the corrected text, or a [`RewriteFailure`] the coordinator
    /// downgrades to "build with fallback text".
    async fn rewrite(
        &self,
        name: &str,
        text: &str,
        config: &BatchConfig,
    ) -> Result<String, RewriteFailure>;
}

/// Production rewriter calling the Gemini `generateContent` REST endpoint.
pub struct GeminiRewriter {
    client: reqwest::Client,
    base_url: String,
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl GeminiRewriter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the rewriter at a different endpoint (local test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for GeminiRewriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextRewriter for GeminiRewriter {
    async fn rewrite(
        &self,
        name: &str,
        text: &str,
        config: &BatchConfig,
    ) -> Result<String, RewriteFailure> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, config.model, config.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: compose_prompt(&config.rules, text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(config.rewrite_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("'{}': Gemini request failed: {}", name, e);
                RewriteFailure::new(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            warn!("'{}': Gemini returned HTTP {}", name, status);
            return Err(RewriteFailure::new(format!("HTTP {status}: {snippet}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RewriteFailure::new(format!("malformed response: {e}")))?;

        let raw = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let cleaned = clean_rewritten_text(&raw);
        if cleaned.is_empty() {
            return Err(RewriteFailure::new("model returned no usable text"));
        }

        debug!("'{}': rewrite produced {} chars", name, cleaned.len());
        Ok(cleaned)
    }
}

// ── Wire types (Gemini generateContent) ──────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    // Absent on safety-blocked candidates.
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_to_gemini_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".into(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 8192,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn response_with_no_candidates_parses_to_empty() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn response_parts_concatenate() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"أ"},{"text":"ب"}]}}]}"#,
        )
        .unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "أب");
    }
}

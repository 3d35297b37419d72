//! Configuration types for a batch run.
//!
//! All run behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across a session, log it, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::BatchError;
use std::fmt;

/// Default Gemini model when none is selected explicitly.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Models known to work with the text-correction prompt.
///
/// The list is advisory (any Gemini text model id is accepted); it exists
/// so front-ends can offer a selector without hard-coding ids themselves.
pub const KNOWN_MODELS: &[&str] = &[
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
    "gemini-pro",
];

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`].
///
/// # Example
/// ```rust
/// use arabic_pdf2docx::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .api_key("AIza...")
///     .model("gemini-1.5-flash-latest")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Gemini API key. Required before a run can start.
    ///
    /// [`BatchConfigBuilder::api_key_from_env`] reads `GEMINI_API_KEY` so
    /// callers don't have to thread the secret through their own config.
    pub api_key: String,

    /// Gemini model identifier, e.g. "gemini-1.5-flash-latest".
    pub model: String,

    /// Free-text correction rules passed to the rewriter.
    ///
    /// An empty rule set is a soft condition: the run proceeds with a
    /// rules-free prompt and emits a warning event, matching the behaviour
    /// of leaving the rules field blank in an interactive session.
    pub rules: String,

    /// Keep the raw extracted text when the rewrite fails. Default: false.
    ///
    /// The historical behaviour discards the extracted text and builds an
    /// empty-bodied document when the LLM call fails, which loses data the
    /// extractor already produced. Setting this flag keeps the unrewritten
    /// text instead. Either way the file's report notes that the rewrite
    /// failed, so the two cases stay distinguishable downstream.
    pub fallback_to_raw_text: bool,

    /// Per-request timeout for the rewrite HTTP call, in seconds. Default: 120.
    ///
    /// This is transport hygiene, not pipeline logic: the coordinator
    /// itself never retries or cancels, but an unbounded HTTP request
    /// would hang the whole run on a stalled connection.
    pub rewrite_timeout_secs: u64,

    /// Maximum tokens the LLM may generate per file. Default: 8192.
    ///
    /// Whole-document correction output scales with input length; 8192
    /// comfortably covers a few dozen pages of Arabic prose. Set lower to
    /// bound per-file cost.
    pub max_output_tokens: usize,

    /// Sampling temperature for the rewrite. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to the extracted text,
    /// which is what you want for correction rather than composition.
    pub temperature: f32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            rules: crate::prompts::DEFAULT_RULES.to_string(),
            fallback_to_raw_text: false,
            rewrite_timeout_secs: 120,
            max_output_tokens: 8192,
            temperature: 0.2,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("rules_len", &self.rules.len())
            .field("fallback_to_raw_text", &self.fallback_to_raw_text)
            .field("rewrite_timeout_secs", &self.rewrite_timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the preconditions for starting a run.
    ///
    /// A missing API key or model is a hard stop; empty rules are not
    /// (callers surface that as a warning instead).
    pub fn validate_for_run(&self) -> Result<(), BatchError> {
        if self.api_key.trim().is_empty() {
            return Err(BatchError::MissingApiKey);
        }
        if self.model.trim().is_empty() {
            return Err(BatchError::MissingModel);
        }
        Ok(())
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Read the API key from `GEMINI_API_KEY` if present, keeping any
    /// previously set key when the variable is unset or empty.
    pub fn api_key_from_env(mut self) -> Self {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.config.api_key = key;
            }
        }
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.config.rules = rules.into();
        self
    }

    pub fn fallback_to_raw_text(mut self, v: bool) -> Self {
        self.config.fallback_to_raw_text = v;
        self
    }

    pub fn rewrite_timeout_secs(mut self, secs: u64) -> Self {
        self.config.rewrite_timeout_secs = secs.max(1);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    /// Build the configuration, validating structural constraints.
    ///
    /// Note: a missing API key or model is *not* rejected here — those are
    /// run preconditions checked by [`BatchConfig::validate_for_run`], so a
    /// session can be configured incrementally before the key is known.
    pub fn build(self) -> Result<BatchConfig, BatchError> {
        let c = &self.config;
        if c.max_output_tokens == 0 {
            return Err(BatchError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.rewrite_timeout_secs == 0 {
            return Err(BatchError::InvalidConfig(
                "rewrite_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

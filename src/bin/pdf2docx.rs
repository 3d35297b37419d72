//! CLI binary for arabic-pdf2docx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig`, feeds the session, and writes the merged document.

use anyhow::{Context, Result};
use arabic_pdf2docx::{
    BatchConfig, BatchProgressCallback, BatchSession, EmptyTextReason, FileStage, RunOutcome,
    SourceFile, DEFAULT_MODEL, KNOWN_MODELS,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the file list plus a per-file
/// log line as each file finishes. Files are processed sequentially, so a
/// single start-time slot is enough.
struct CliProgressCallback {
    bar: ProgressBar,
    file_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(0); // length set in on_run_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} files  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Processing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            bar,
            file_started: Mutex::new(None),
        }
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_files} file(s)…"))
        ));
    }

    fn on_warning(&self, message: &str) {
        self.bar
            .println(format!("{} {}", yellow("⚠"), yellow(message)));
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        *self.file_started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(name.to_string());
    }

    fn on_file_stage(&self, _index: usize, _total: usize, name: &str, stage: FileStage) {
        self.bar.set_message(format!("{name}: {stage}"));
    }

    fn on_file_complete(
        &self,
        index: usize,
        total: usize,
        name: &str,
        note: Option<&EmptyTextReason>,
    ) {
        let secs = self.elapsed_secs();
        let annotation = match note {
            Some(reason) => yellow(&format!("  ({reason})")),
            None => String::new(),
        };
        self.bar.println(format!(
            "  {} [{index}/{total}] {name}{annotation}  {}",
            green("✓"),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let secs = self.elapsed_secs();
        let msg = truncate_message(error, 79);
        self.bar.println(format!(
            "  {} [{index}/{total}] {name}  {}  {}",
            red("✗"),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_merge_start(&self, artifact_count: usize) {
        self.bar.set_prefix("Merging");
        self.bar
            .set_message(format!("{artifact_count} document(s)"));
    }

    fn on_run_complete(&self, total_files: usize, succeeded: usize) {
        let failed = total_files.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} file(s) processed successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files processed  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

/// Silent callback for `--quiet` / `--no-progress` / `--json` runs.
struct SilentCallback;
impl BatchProgressCallback for SilentCallback {}

/// Truncate a log message to at most `max_chars` characters, appending an
/// ellipsis. Counts characters, not bytes: error details routinely carry
/// Arabic filenames, and a byte cut can land inside a multi-byte char.
fn truncate_message(msg: &str, max_chars: usize) -> String {
    if msg.chars().count() <= max_chars {
        return msg.to_string();
    }
    let mut out: String = msg.chars().take(max_chars).collect();
    out.push('\u{2026}');
    out
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process two PDFs into one merged Word document
  pdf2docx chapter-1.pdf chapter-2.pdf

  # Custom output path and model
  pdf2docx --model gemini-1.5-pro-latest -o book.docx part-*.pdf

  # Custom rewriting rules
  pdf2docx --rules-file my_rules.txt document.pdf

  # Keep the raw extracted text when the rewrite fails
  pdf2docx --fallback-raw document.pdf

  # Machine-readable run report on stdout
  pdf2docx --json document.pdf > report.json

RULES:
  By default the rewrite stage applies a built-in set of Arabic text
  rules (normalise hamza forms, fix diacritic placement, standardise
  punctuation, preserve Quranic verses verbatim, ...). Supply
  --rules-file to replace them entirely; an empty file means the model
  rewrites with no specific instructions.

FAILURE HANDLING:
  Files are processed independently: extraction or document-build
  errors skip that file, a rewrite failure falls back to an empty (or,
  with --fallback-raw, the raw extracted) text. Everything that
  survives is merged in command-line order.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY   Google Gemini API key (required)

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Process:       pdf2docx scan-1.pdf scan-2.pdf -o merged.docx
"#;

/// Batch-process Arabic PDFs into one merged Word document.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docx",
    version,
    about = "Batch-process Arabic PDFs into one merged Word document",
    long_about = "Extract text from Arabic PDF files, rewrite it via Google Gemini under a \
configurable rule set, lay each file out as a right-aligned Word document, and merge the \
results into a single .docx in input order. A single file's failure never aborts the batch.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to process, in merge order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the merged document to this path.
    #[arg(short, long, default_value = "merged_arabic_documents.docx")]
    output: PathBuf,

    /// Google Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, default_value = DEFAULT_MODEL,
          long_help = "Gemini model to use for the rewrite stage.\n\
          Known models: gemini-1.5-flash-latest (default), gemini-1.5-pro-latest, gemini-pro.")]
    model: String,

    /// Path to a text file with rewriting rules (replaces the built-in set).
    #[arg(long)]
    rules_file: Option<PathBuf>,

    /// On rewrite failure, build with the raw extracted text instead of an
    /// empty document.
    #[arg(long)]
    fallback_raw: bool,

    /// Max LLM output tokens per file.
    #[arg(long, default_value_t = 8192)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Per-file rewrite timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = BatchConfig::builder()
        .model(&cli.model)
        .fallback_to_raw_text(cli.fallback_raw)
        .max_output_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .rewrite_timeout_secs(cli.timeout);

    builder = match &cli.api_key {
        Some(key) => builder.api_key(key),
        None => builder.api_key_from_env(),
    };

    if let Some(ref path) = cli.rules_file {
        let rules = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read rules from {}", path.display()))?;
        builder = builder.rules(rules);
    }

    let config = builder.build().context("Invalid configuration")?;

    if !KNOWN_MODELS.contains(&cli.model.as_str()) && !cli.quiet {
        eprintln!(
            "{} '{}' is not a known model; passing it through as-is",
            yellow("⚠"),
            cli.model
        );
    }

    // ── Load files in merge order ────────────────────────────────────────
    let mut session = BatchSession::new();
    for path in &cli.inputs {
        let file = SourceFile::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        session
            .add_file(file)
            .with_context(|| format!("Failed to add {}", path.display()))?;
    }

    // ── Run the batch ────────────────────────────────────────────────────
    let report = if show_progress {
        let cb = CliProgressCallback::new();
        session.run(&config, &cb).await.context("Batch run failed")?
    } else {
        session
            .run(&config, &SilentCallback)
            .await
            .context("Batch run failed")?
    };

    if cli.json {
        let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{json}");
    }

    // ── Write the merged document ────────────────────────────────────────
    match &report.outcome {
        RunOutcome::Merged(merged) => {
            merged.write_to(&cli.output)?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} document(s) merged  {}ms  →  {}",
                    green("✔"),
                    merged.merged_count,
                    report.duration_ms,
                    bold(&cli.output.display().to_string()),
                );
                eprintln!("   {}", dim(&format!("{} bytes", merged.size_bytes)));
            }
            Ok(())
        }
        RunOutcome::NothingToMerge => {
            anyhow::bail!("No files could be processed; nothing was merged")
        }
        RunOutcome::MergeFailed { detail } => {
            anyhow::bail!(
                "Processed {} file(s) but merging failed: {detail}",
                report.processed_count
            )
        }
    }
}

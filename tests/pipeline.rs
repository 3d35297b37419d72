//! End-to-end coordinator tests over scripted stage backends.
//!
//! Every stage behind [`BatchPipeline`] sits behind a trait, so these
//! tests script each stage's behaviour per file name and assert the
//! coordinator's isolation and ordering guarantees without touching a
//! real PDF, the network, or the Gemini API.

use arabic_pdf2docx::batch::BatchPipeline;
use arabic_pdf2docx::pipeline::build::DocumentBuilder;
use arabic_pdf2docx::pipeline::extract::TextExtractor;
use arabic_pdf2docx::pipeline::merge::{DocumentMerger, MergeFailure};
use arabic_pdf2docx::pipeline::rewrite::{RewriteFailure, TextRewriter};
use arabic_pdf2docx::pipeline::ProcessedArtifact;
use arabic_pdf2docx::{
    BatchConfig, BatchError, BatchProgressCallback, BatchSession, EmptyTextReason, FileError,
    FileStatus, NoopProgressCallback, RunOutcome, RunState, SourceFile,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ── Scripted stage backends ──────────────────────────────────────────────

/// Extracts `"raw <name>"` unless the file name is scripted to fail or to
/// come back blank.
#[derive(Default)]
struct ScriptedExtractor {
    fail: HashSet<String>,
    blank: HashSet<String>,
}

impl TextExtractor for ScriptedExtractor {
    fn extract(&self, name: &str, _bytes: &[u8]) -> Result<String, FileError> {
        if self.fail.contains(name) {
            return Err(FileError::Extraction {
                name: name.to_string(),
                detail: "no text layer".to_string(),
            });
        }
        if self.blank.contains(name) {
            return Ok(String::new());
        }
        Ok(format!("raw {name}"))
    }
}

/// Prefixes the text with `"rewritten "` and records which inputs it saw;
/// scripted names fail instead.
#[derive(Default)]
struct ScriptedRewriter {
    fail: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl TextRewriter for ScriptedRewriter {
    async fn rewrite(
        &self,
        name: &str,
        text: &str,
        _config: &BatchConfig,
    ) -> Result<String, RewriteFailure> {
        self.seen.lock().unwrap().push(name.to_string());
        if self.fail.contains(name) {
            return Err(RewriteFailure {
                detail: "quota exhausted".to_string(),
            });
        }
        Ok(format!("rewritten {text}"))
    }
}

/// Emits `"doc(<name>|<text>)"` as the artifact payload; scripted names
/// fail instead.
#[derive(Default)]
struct ScriptedBuilder {
    fail: HashSet<String>,
}

impl DocumentBuilder for ScriptedBuilder {
    fn build(&self, name: &str, text: &str) -> Result<Vec<u8>, FileError> {
        if self.fail.contains(name) {
            return Err(FileError::Build {
                name: name.to_string(),
                detail: "packing failed".to_string(),
            });
        }
        Ok(format!("doc({name}|{text})").into_bytes())
    }
}

/// Concatenates artifact payloads with `+`, preserving order.
#[derive(Default)]
struct JoiningMerger {
    fail: bool,
}

impl DocumentMerger for JoiningMerger {
    fn merge(&self, artifacts: &[ProcessedArtifact]) -> Result<Vec<u8>, MergeFailure> {
        if self.fail {
            return Err(MergeFailure {
                detail: "corrupt section".to_string(),
            });
        }
        Ok(artifacts
            .iter()
            .map(|a| String::from_utf8_lossy(&a.docx).into_owned())
            .collect::<Vec<_>>()
            .join("+")
            .into_bytes())
    }
}

/// Records every progress event as a flat string for ordering assertions.
#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    fn log(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl BatchProgressCallback for RecordingProgress {
    fn on_run_start(&self, total_files: usize) {
        self.events.lock().unwrap().push(format!("run_start {total_files}"));
    }
    fn on_warning(&self, message: &str) {
        self.events.lock().unwrap().push(format!("warning: {message}"));
    }
    fn on_file_start(&self, index: usize, _total: usize, name: &str) {
        self.events.lock().unwrap().push(format!("start {index} {name}"));
    }
    fn on_file_complete(
        &self,
        index: usize,
        _total: usize,
        name: &str,
        note: Option<&EmptyTextReason>,
    ) {
        let tag = match note {
            Some(EmptyTextReason::ExtractionEmpty) => " (empty extraction)",
            Some(EmptyTextReason::RewriteFailed { .. }) => " (rewrite failed)",
            None => "",
        };
        self.events
            .lock()
            .unwrap()
            .push(format!("done {index} {name}{tag}"));
    }
    fn on_file_error(&self, index: usize, _total: usize, name: &str, _error: &str) {
        self.events.lock().unwrap().push(format!("error {index} {name}"));
    }
    fn on_merge_start(&self, artifact_count: usize) {
        self.events.lock().unwrap().push(format!("merge {artifact_count}"));
    }
    fn on_run_complete(&self, _total_files: usize, succeeded: usize) {
        self.events.lock().unwrap().push(format!("run_complete {succeeded}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn pipeline(
    extractor: ScriptedExtractor,
    rewriter: ScriptedRewriter,
    builder: ScriptedBuilder,
    merger: JoiningMerger,
) -> BatchPipeline {
    BatchPipeline::with_stages(
        Arc::new(extractor),
        Arc::new(rewriter),
        Arc::new(builder),
        Arc::new(merger),
    )
}

fn happy_pipeline() -> BatchPipeline {
    pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter::default(),
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    )
}

fn files(names: &[&str]) -> Vec<SourceFile> {
    names
        .iter()
        .map(|n| SourceFile::new(*n, b"%PDF-1.4 stub".to_vec()))
        .collect()
}

fn config() -> BatchConfig {
    BatchConfig::builder()
        .api_key("test-key")
        .build()
        .expect("valid test config")
}

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ── Coordinator behaviour ────────────────────────────────────────────────

#[tokio::test]
async fn all_files_succeed_and_merge_in_order() {
    let report = happy_pipeline()
        .process_batch(
            &files(&["a.pdf", "b.pdf", "c.pdf"]),
            &config(),
            &NoopProgressCallback,
        )
        .await
        .unwrap();

    assert_eq!(report.processed_count, 3);
    assert_eq!(report.failed_count(), 0);
    assert!(report.files.iter().all(|f| f.is_done()));

    let merged = report.merged().expect("merge succeeded");
    assert_eq!(merged.merged_count, 3);
    assert_eq!(
        String::from_utf8_lossy(&merged.bytes),
        "doc(a.pdf|rewritten raw a.pdf)+doc(b.pdf|rewritten raw b.pdf)+doc(c.pdf|rewritten raw c.pdf)"
    );
}

#[tokio::test]
async fn extraction_failure_skips_file_but_not_batch() {
    let p = pipeline(
        ScriptedExtractor {
            fail: set(&["bad.pdf"]),
            ..Default::default()
        },
        ScriptedRewriter::default(),
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    );

    let report = p
        .process_batch(
            &files(&["a.pdf", "bad.pdf", "c.pdf"]),
            &config(),
            &NoopProgressCallback,
        )
        .await
        .unwrap();

    assert_eq!(report.processed_count, 2);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        &report.files[1].status,
        FileStatus::Failed {
            error: FileError::Extraction { .. }
        }
    ));

    // The failed file is simply absent from the merge; order of the
    // survivors is unchanged.
    let merged = report.merged().unwrap();
    assert_eq!(
        String::from_utf8_lossy(&merged.bytes),
        "doc(a.pdf|rewritten raw a.pdf)+doc(c.pdf|rewritten raw c.pdf)"
    );
}

#[tokio::test]
async fn blank_extraction_skips_rewrite_and_builds_empty() {
    let rewriter = ScriptedRewriter::default();
    let seen = Arc::new(rewriter);
    let p = BatchPipeline::with_stages(
        Arc::new(ScriptedExtractor {
            blank: set(&["scan.pdf"]),
            ..Default::default()
        }),
        seen.clone(),
        Arc::new(ScriptedBuilder::default()),
        Arc::new(JoiningMerger::default()),
    );

    let report = p
        .process_batch(
            &files(&["scan.pdf", "text.pdf"]),
            &config(),
            &NoopProgressCallback,
        )
        .await
        .unwrap();

    // The blank file never reached the rewriter.
    assert_eq!(*seen.seen.lock().unwrap(), ["text.pdf"]);

    // But it still produced a (placeholder) document and merged first.
    assert_eq!(report.processed_count, 2);
    assert!(matches!(
        &report.files[0].status,
        FileStatus::Done {
            note: Some(EmptyTextReason::ExtractionEmpty)
        }
    ));
    let merged = report.merged().unwrap();
    assert!(String::from_utf8_lossy(&merged.bytes).starts_with("doc(scan.pdf|)"));
}

#[tokio::test]
async fn rewrite_failure_builds_empty_document_by_default() {
    let p = pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter {
            fail: set(&["flaky.pdf"]),
            ..Default::default()
        },
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    );

    let report = p
        .process_batch(&files(&["flaky.pdf"]), &config(), &NoopProgressCallback)
        .await
        .unwrap();

    // Rewrite failure is soft: the file is Done, with a note, and its
    // document body is empty.
    assert_eq!(report.processed_count, 1);
    assert!(matches!(
        &report.files[0].status,
        FileStatus::Done {
            note: Some(EmptyTextReason::RewriteFailed { detail })
        } if detail == "quota exhausted"
    ));
    let merged = report.merged().unwrap();
    assert_eq!(String::from_utf8_lossy(&merged.bytes), "doc(flaky.pdf|)");
}

#[tokio::test]
async fn rewrite_failure_can_fall_back_to_raw_text() {
    let p = pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter {
            fail: set(&["flaky.pdf"]),
            ..Default::default()
        },
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    );
    let config = BatchConfig::builder()
        .api_key("test-key")
        .fallback_to_raw_text(true)
        .build()
        .unwrap();

    let report = p
        .process_batch(&files(&["flaky.pdf"]), &config, &NoopProgressCallback)
        .await
        .unwrap();

    let merged = report.merged().unwrap();
    assert_eq!(
        String::from_utf8_lossy(&merged.bytes),
        "doc(flaky.pdf|raw flaky.pdf)"
    );
}

#[tokio::test]
async fn build_failure_skips_file() {
    let p = pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter::default(),
        ScriptedBuilder {
            fail: set(&["huge.pdf"]),
        },
        JoiningMerger::default(),
    );

    let report = p
        .process_batch(
            &files(&["huge.pdf", "ok.pdf"]),
            &config(),
            &NoopProgressCallback,
        )
        .await
        .unwrap();

    assert!(matches!(
        &report.files[0].status,
        FileStatus::Failed {
            error: FileError::Build { .. }
        }
    ));
    assert_eq!(report.processed_count, 1);
    assert_eq!(
        String::from_utf8_lossy(&report.merged().unwrap().bytes),
        "doc(ok.pdf|rewritten raw ok.pdf)"
    );
}

#[tokio::test]
async fn rewrite_failed_file_merges_while_build_failed_file_is_excluded() {
    let p = pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter {
            fail: set(&["flaky.pdf"]),
            ..Default::default()
        },
        ScriptedBuilder {
            fail: set(&["broken.pdf"]),
        },
        JoiningMerger::default(),
    );

    let report = p
        .process_batch(
            &files(&["flaky.pdf", "broken.pdf"]),
            &config(),
            &NoopProgressCallback,
        )
        .await
        .unwrap();

    // Soft failure kept, hard failure dropped, in one run.
    assert_eq!(report.processed_count, 1);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        &report.files[0].status,
        FileStatus::Done {
            note: Some(EmptyTextReason::RewriteFailed { .. })
        }
    ));
    assert!(matches!(
        &report.files[1].status,
        FileStatus::Failed {
            error: FileError::Build { .. }
        }
    ));

    // The merge receives exactly the surviving document.
    let merged = report.merged().unwrap();
    assert_eq!(merged.merged_count, 1);
    assert_eq!(String::from_utf8_lossy(&merged.bytes), "doc(flaky.pdf|)");
}

#[tokio::test]
async fn all_files_failing_yields_nothing_to_merge() {
    let p = pipeline(
        ScriptedExtractor {
            fail: set(&["a.pdf", "b.pdf"]),
            ..Default::default()
        },
        ScriptedRewriter::default(),
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    );

    let report = p
        .process_batch(&files(&["a.pdf", "b.pdf"]), &config(), &NoopProgressCallback)
        .await
        .unwrap();

    assert!(matches!(report.outcome, RunOutcome::NothingToMerge));
    assert_eq!(report.processed_count, 0);
    assert_eq!(report.failed_count(), 2);
    // One report per input file, even when everything failed.
    assert_eq!(report.files.len(), 2);
}

#[tokio::test]
async fn merge_failure_keeps_per_file_reports() {
    let p = pipeline(
        ScriptedExtractor::default(),
        ScriptedRewriter::default(),
        ScriptedBuilder::default(),
        JoiningMerger { fail: true },
    );

    let report = p
        .process_batch(&files(&["a.pdf", "b.pdf"]), &config(), &NoopProgressCallback)
        .await
        .unwrap();

    assert!(matches!(
        &report.outcome,
        RunOutcome::MergeFailed { detail } if detail == "corrupt section"
    ));
    assert!(report.merged().is_none());
    // Per-file work is not erased by the merge failing.
    assert_eq!(report.files.len(), 2);
    assert!(report.files.iter().all(|f| f.is_done()));
    assert_eq!(report.processed_count, 2);
}

#[tokio::test]
async fn empty_file_list_is_a_precondition_error() {
    let err = happy_pipeline()
        .process_batch(&[], &config(), &NoopProgressCallback)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::EmptyFileList));
}

#[tokio::test]
async fn missing_api_key_is_a_precondition_error() {
    let config = BatchConfig::builder().api_key("").build().unwrap();
    let err = happy_pipeline()
        .process_batch(&files(&["a.pdf"]), &config, &NoopProgressCallback)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::MissingApiKey));
}

// ── Progress events ──────────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_fire_in_order_per_file() {
    let progress = RecordingProgress::default();
    let p = pipeline(
        ScriptedExtractor {
            fail: set(&["bad.pdf"]),
            ..Default::default()
        },
        ScriptedRewriter::default(),
        ScriptedBuilder::default(),
        JoiningMerger::default(),
    );

    p.process_batch(&files(&["a.pdf", "bad.pdf"]), &config(), &progress)
        .await
        .unwrap();

    assert_eq!(
        progress.log(),
        [
            "run_start 2",
            "start 1 a.pdf",
            "done 1 a.pdf",
            "start 2 bad.pdf",
            "error 2 bad.pdf",
            "merge 1",
            "run_complete 1",
        ]
    );
}

#[tokio::test]
async fn empty_rules_emit_a_warning_but_run_proceeds() {
    let progress = RecordingProgress::default();
    let config = BatchConfig::builder()
        .api_key("test-key")
        .rules("  ")
        .build()
        .unwrap();

    let report = happy_pipeline()
        .process_batch(&files(&["a.pdf"]), &config, &progress)
        .await
        .unwrap();

    assert!(report.merged().is_some());
    assert!(progress.log().iter().any(|e| e.starts_with("warning:")));
}

// ── Session lifecycle over the pipeline ──────────────────────────────────

#[tokio::test]
async fn session_keeps_report_until_list_changes() {
    let mut session = BatchSession::with_pipeline(happy_pipeline());
    session
        .add_file(SourceFile::new("a.pdf", b"%PDF-1.4".to_vec()))
        .unwrap();

    session.run(&config(), &NoopProgressCallback).await.unwrap();
    assert_eq!(session.state(), RunState::Complete);
    assert!(session.merged_output().is_some());

    // Any list mutation discards the run's results.
    session
        .add_file(SourceFile::new("b.pdf", b"%PDF-1.4".to_vec()))
        .unwrap();
    assert_eq!(session.state(), RunState::NotStarted);
    assert!(session.last_report().is_none());
    assert!(session.merged_output().is_none());
}

#[tokio::test]
async fn session_reverts_to_not_started_on_precondition_failure() {
    let mut session = BatchSession::with_pipeline(happy_pipeline());
    // Empty list: the run is rejected before any file is touched.
    let err = session
        .run(&config(), &NoopProgressCallback)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::EmptyFileList));
    assert_eq!(session.state(), RunState::NotStarted);
}

#[tokio::test]
async fn session_run_processes_files_in_list_order_after_reorder() {
    let mut session = BatchSession::with_pipeline(happy_pipeline());
    session
        .add_file(SourceFile::new("a.pdf", b"%PDF-1.4".to_vec()))
        .unwrap();
    session
        .add_file(SourceFile::new("b.pdf", b"%PDF-1.4".to_vec()))
        .unwrap();
    session.move_up(1);

    let report = session.run(&config(), &NoopProgressCallback).await.unwrap();
    let merged = report.merged().unwrap();
    assert_eq!(
        String::from_utf8_lossy(&merged.bytes),
        "doc(b.pdf|rewritten raw b.pdf)+doc(a.pdf|rewritten raw a.pdf)"
    );
}

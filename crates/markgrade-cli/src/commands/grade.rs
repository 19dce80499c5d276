//! The `markgrade grade` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use markgrade_core::engine::{GradingEngine, ProgressReporter};
use markgrade_core::model::GradingResult;
use markgrade_core::report::{GradingReport, KeySummary};
use markgrade_core::store::{InMemoryResultStore, ResultStore};
use markgrade_core::GradingError;
use markgrade_extract::config::load_config_from;
use markgrade_extract::{create_detector, create_extractor, create_ocr_engine, DetectorKind};
use markgrade_report::csv::export_store;
use markgrade_report::html::write_html_report;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, path: &Path) {
        eprintln!("  Grading: {}", path.display());
    }

    fn on_submission_complete(&self, path: &Path, result: &GradingResult) {
        let marker = if result.placeholder_answers {
            " [placeholder]"
        } else {
            ""
        };
        eprintln!(
            "  Done: {} -> {} {}/{}{marker}",
            path.display(),
            result.name,
            result.score,
            result.total
        );
    }

    fn on_submission_error(&self, path: &Path, error: &GradingError) {
        eprintln!("  ERROR: {}: {}", path.display(), error.user_message());
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
    Html,
}

fn parse_formats(format: &str) -> Result<Vec<ExportFormat>> {
    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed: &[ExportFormat] = match name {
            "csv" => &[ExportFormat::Csv],
            "json" => &[ExportFormat::Json],
            "html" => &[ExportFormat::Html],
            "all" => &[ExportFormat::Csv, ExportFormat::Json, ExportFormat::Html],
            other => anyhow::bail!("unknown format '{other}' (expected csv, json, html or all)"),
        };
        for f in parsed {
            if !formats.contains(f) {
                formats.push(*f);
            }
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    key_path: PathBuf,
    submissions: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    detector: Option<DetectorKind>,
    seed: Option<u64>,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(detector) = detector {
        config.detector = detector;
    }
    if seed.is_some() {
        config.placeholder_seed = seed;
    }
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        config.parallelism = parallelism;
    }
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    tracing::debug!(?config, "effective configuration");

    let extractor = create_extractor(&config);
    let detector = create_detector(&config, Arc::clone(&extractor));
    let store = Arc::new(InMemoryResultStore::new());
    let mut engine = GradingEngine::new(
        extractor,
        detector,
        store.clone(),
        config.engine_config(),
    );
    if let Some(ocr) = create_ocr_engine(&config) {
        engine = engine.with_ocr(ocr);
    }

    let key = engine
        .load_key(&key_path)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;
    eprintln!(
        "Answer key: {} ({} questions)",
        key_path.display(),
        key.len()
    );

    let outcome = engine
        .grade_batch(&key, &submissions, &ConsoleReporter)
        .await;

    let key_source = key_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| key_path.display().to_string());
    let report = GradingReport::new(KeySummary::new(key_source, &key), store.snapshot());

    print_results(&report);

    if report.has_placeholder_results() {
        eprintln!(
            "\nWarning: {} result(s) use placeholder answers. \
             Mark recognition is not implemented; these scores are not real.",
            report.summary.placeholder_submissions
        );
    }

    anyhow::ensure!(!store.is_empty(), "No results to export");

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    for fmt in formats {
        match fmt {
            ExportFormat::Csv => {
                let path = export_store(store.as_ref(), &output)?;
                eprintln!("CSV results: {}", path.display());
            }
            ExportFormat::Json => {
                let path = output.join(format!("report_{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("JSON report: {}", path.display());
            }
            ExportFormat::Html => {
                let path = output.join(format!("report_{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
        }
    }

    if !outcome.failures.is_empty() {
        eprintln!("\n{} submission(s) could not be graded:", outcome.failures.len());
        for failure in &outcome.failures {
            eprintln!("  {}: {}", failure.path.display(), failure.error);
        }
    }

    Ok(())
}

fn print_results(report: &GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Student", "Score", "%", "Incorrect", "Answers"]);

    for r in &report.results {
        let incorrect = r
            .incorrect
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&r.name),
            Cell::new(format!("{}/{}", r.score, r.total)),
            Cell::new(format!("{:.1}", r.percent())),
            Cell::new(if incorrect.is_empty() { "-".to_string() } else { incorrect }),
            Cell::new(if r.placeholder_answers {
                "placeholder"
            } else {
                "detected"
            }),
        ]);
    }

    println!("{table}");

    let summary = &report.summary;
    if summary.submissions > 0 {
        println!(
            "{} graded | mean {:.2} ({:.1}%) | min {} | max {}",
            summary.submissions,
            summary.mean_score,
            summary.mean_percent,
            summary.min_score,
            summary.max_score
        );
    }
}

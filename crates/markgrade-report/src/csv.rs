//! Spreadsheet export of graded results.
//!
//! One row per result. The correct and incorrect question lists are stored
//! as `;`-separated 1-based indices so a file can be read back exactly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use markgrade_core::model::GradingResult;
use markgrade_core::store::ResultStore;

#[derive(Debug, Serialize, Deserialize)]
struct ResultRow {
    name: String,
    score: u32,
    total: u32,
    percent: String,
    correct: String,
    incorrect: String,
    placeholder: bool,
    graded_at: String,
}

impl From<&GradingResult> for ResultRow {
    fn from(r: &GradingResult) -> Self {
        Self {
            name: r.name.clone(),
            score: r.score,
            total: r.total,
            percent: format!("{:.1}", r.percent()),
            correct: join_indices(&r.correct),
            incorrect: join_indices(&r.incorrect),
            placeholder: r.placeholder_answers,
            graded_at: r.graded_at.to_rfc3339(),
        }
    }
}

impl ResultRow {
    fn into_result(self) -> Result<GradingResult> {
        let graded_at = DateTime::parse_from_rfc3339(&self.graded_at)
            .with_context(|| format!("invalid graded_at '{}'", self.graded_at))?
            .with_timezone(&Utc);
        Ok(GradingResult {
            correct: split_indices(&self.correct)?,
            incorrect: split_indices(&self.incorrect)?,
            name: self.name,
            score: self.score,
            total: self.total,
            placeholder_answers: self.placeholder,
            graded_at,
        })
    }
}

fn join_indices(indices: &BTreeSet<u32>) -> String {
    indices
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn split_indices(field: &str) -> Result<BTreeSet<u32>> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid question index '{s}'"))
        })
        .collect()
}

/// Timestamped export file name, e.g. `results_20230707_080101.csv`.
pub fn results_file_name(at: DateTime<Local>) -> String {
    format!("results_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write results to a CSV file. An empty result list is refused.
pub fn write_results_csv(results: &[GradingResult], path: &Path) -> Result<()> {
    if results.is_empty() {
        anyhow::bail!("No results to export");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for result in results {
        wtr.serialize(ResultRow::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read results written by [`write_results_csv`].
pub fn read_results_csv(path: &Path) -> Result<Vec<GradingResult>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    rdr.deserialize::<ResultRow>()
        .enumerate()
        .map(|(i, row)| {
            let row = row.with_context(|| format!("bad row {} in {}", i + 1, path.display()))?;
            row.into_result()
        })
        .collect()
}

/// Write a snapshot of `store` to a timestamped CSV file in `dir`.
pub fn export_store(store: &dyn ResultStore, dir: &Path) -> Result<PathBuf> {
    let results = store.snapshot();
    let path = dir.join(results_file_name(Local::now()));
    write_results_csv(&results, &path)?;
    tracing::info!("exported {} results to {}", results.len(), path.display());
    Ok(path)
}

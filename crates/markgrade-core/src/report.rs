//! Grading report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerKey, GradingResult};
use crate::statistics::{compute_summary, SummaryStats};

/// A complete grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The answer key the results were graded against.
    pub key: KeySummary,
    /// Individual results, in the order they were recorded.
    pub results: Vec<GradingResult>,
    /// Class-level statistics.
    pub summary: SummaryStats,
}

/// Summary of the answer key used for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySummary {
    /// File name of the key document.
    pub source: String,
    pub question_count: usize,
    /// The key as letters, e.g. `"ABCDA"`.
    pub answers: String,
}

impl KeySummary {
    pub fn new(source: impl Into<String>, key: &AnswerKey) -> Self {
        Self {
            source: source.into(),
            question_count: key.len(),
            answers: key.to_letters(),
        }
    }
}

impl GradingReport {
    /// Build a report from a snapshot of results.
    pub fn new(key: KeySummary, results: Vec<GradingResult>) -> Self {
        let summary = compute_summary(&results);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            key,
            results,
            summary,
        }
    }

    /// `true` if any result used placeholder answers.
    pub fn has_placeholder_results(&self) -> bool {
        self.results.iter().any(|r| r.placeholder_answers)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Choice;

    fn make_report() -> GradingReport {
        let key = AnswerKey::from_answers("ABC".chars().filter_map(Choice::new).collect());
        let results = vec![GradingResult {
            name: "Student_0001".into(),
            score: 2,
            total: 3,
            correct: BTreeSet::from([1, 3]),
            incorrect: BTreeSet::from([2]),
            placeholder_answers: true,
            graded_at: Utc::now(),
        }];
        GradingReport::new(KeySummary::new("key.docx", &key), results)
    }

    #[test]
    fn report_summarizes_results() {
        let report = make_report();
        assert_eq!(report.key.question_count, 3);
        assert_eq!(report.key.answers, "ABC");
        assert_eq!(report.summary.submissions, 1);
        assert!(report.has_placeholder_results());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = GradingReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.results, report.results);
        assert_eq!(loaded.summary, report.summary);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = GradingReport::load_json(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read report"));
    }
}

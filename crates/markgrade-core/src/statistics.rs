//! Summary statistics and item analysis over graded results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::GradingResult;

/// Class-level statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of graded submissions.
    pub submissions: usize,
    /// Submissions whose answers came from the placeholder detector.
    pub placeholder_submissions: usize,
    /// Mean raw score.
    pub mean_score: f64,
    /// Lowest raw score.
    pub min_score: u32,
    /// Highest raw score.
    pub max_score: u32,
    /// Mean score as a percentage of each submission's total.
    pub mean_percent: f64,
    /// Per-question statistics keyed by 1-based question index.
    pub per_question: BTreeMap<u32, QuestionStats>,
}

/// How a single question fared across submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question: u32,
    /// Submissions that answered correctly.
    pub correct: u32,
    /// Submissions graded on this question.
    pub attempted: u32,
    /// `correct / attempted`.
    pub correct_rate: f64,
}

/// Compute summary statistics from a snapshot of results.
pub fn compute_summary(results: &[GradingResult]) -> SummaryStats {
    if results.is_empty() {
        return SummaryStats::default();
    }

    let n = results.len() as f64;
    let mean_score = results.iter().map(|r| r.score as f64).sum::<f64>() / n;
    let mean_percent = results.iter().map(GradingResult::percent).sum::<f64>() / n;
    let min_score = results.iter().map(|r| r.score).min().unwrap_or(0);
    let max_score = results.iter().map(|r| r.score).max().unwrap_or(0);
    let placeholder_submissions = results.iter().filter(|r| r.placeholder_answers).count();

    let mut tallies: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for r in results {
        for &q in &r.correct {
            let entry = tallies.entry(q).or_default();
            entry.0 += 1;
            entry.1 += 1;
        }
        for &q in &r.incorrect {
            tallies.entry(q).or_default().1 += 1;
        }
    }

    let per_question = tallies
        .into_iter()
        .map(|(question, (correct, attempted))| {
            let correct_rate = if attempted == 0 {
                0.0
            } else {
                correct as f64 / attempted as f64
            };
            (
                question,
                QuestionStats {
                    question,
                    correct,
                    attempted,
                    correct_rate,
                },
            )
        })
        .collect();

    SummaryStats {
        submissions: results.len(),
        placeholder_submissions,
        mean_score,
        min_score,
        max_score,
        mean_percent,
        per_question,
    }
}

/// Questions sorted from hardest (lowest correct rate) to easiest.
pub fn hardest_questions(stats: &SummaryStats) -> Vec<&QuestionStats> {
    let mut questions: Vec<&QuestionStats> = stats.per_question.values().collect();
    questions.sort_by(|a, b| {
        a.correct_rate
            .total_cmp(&b.correct_rate)
            .then(a.question.cmp(&b.question))
    });
    questions
}

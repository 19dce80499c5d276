//! Answer detectors.
//!
//! Real optical mark recognition is not implemented. [`RandomAnswerDetector`]
//! stands in for it and flags everything it returns as a placeholder;
//! [`DocumentAnswerDetector`] reads typed answers from document submissions.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use markgrade_core::model::{ChoiceAlphabet, DetectedAnswers, DocumentFormat};
use markgrade_core::parser::KeyParser;
use markgrade_core::traits::{AnswerDetector, DocumentTextExtractor};
use markgrade_core::GradingError;

/// Picks a random letter for every question.
///
/// Results are always marked `placeholder`, so they are never presented as
/// real answers.
pub struct RandomAnswerDetector {
    alphabet: ChoiceAlphabet,
    rng: Mutex<StdRng>,
}

impl RandomAnswerDetector {
    /// Detector seeded from the operating system.
    pub fn new(alphabet: ChoiceAlphabet) -> Self {
        Self {
            alphabet,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Detector with a fixed seed, for reproducible runs.
    pub fn seeded(alphabet: ChoiceAlphabet, seed: u64) -> Self {
        Self {
            alphabet,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl AnswerDetector for RandomAnswerDetector {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn detect(
        &self,
        _submission: &Path,
        question_count: usize,
    ) -> anyhow::Result<DetectedAnswers> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let answers = (0..question_count)
            .filter_map(|_| self.alphabet.choices().choose(&mut *rng).copied())
            .collect();
        Ok(DetectedAnswers::positional(answers, true))
    }
}

/// Reads answers typed into a document submission (`1. A`, `2) b`, ...).
pub struct DocumentAnswerDetector {
    extractor: Arc<dyn DocumentTextExtractor>,
    parser: KeyParser,
}

impl DocumentAnswerDetector {
    pub fn new(extractor: Arc<dyn DocumentTextExtractor>, alphabet: &ChoiceAlphabet) -> Self {
        Self {
            extractor,
            parser: KeyParser::new(alphabet),
        }
    }
}

#[async_trait]
impl AnswerDetector for DocumentAnswerDetector {
    fn name(&self) -> &str {
        "document"
    }

    async fn detect(
        &self,
        submission: &Path,
        question_count: usize,
    ) -> anyhow::Result<DetectedAnswers> {
        let format = DocumentFormat::from_path(submission)?;
        if !format.is_document() {
            return Err(GradingError::UnsupportedFormat {
                path: submission.to_path_buf(),
                extension: format.to_string(),
            }
            .into());
        }

        let text = self.extractor.extract_text(submission).await?;
        let parsed = self.parser.parse(&text);
        if parsed.key.len() != question_count {
            tracing::debug!(
                "{} lists {} answers for a {question_count}-question key",
                submission.display(),
                parsed.key.len()
            );
        }
        Ok(DetectedAnswers::numbered(
            parsed.key.question_numbers().to_vec(),
            parsed.key.answers().to_vec(),
        ))
    }
}

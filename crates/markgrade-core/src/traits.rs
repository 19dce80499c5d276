//! Collaborator traits.
//!
//! Document readers, OCR engines and answer detectors live outside the core;
//! `markgrade-extract` provides the concrete implementations.

use std::path::Path;

use async_trait::async_trait;

use crate::model::DetectedAnswers;

/// Reads the text content of an answer-key document.
#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    /// Human-readable extractor name (e.g. "docx").
    fn name(&self) -> &str;

    /// Extract all text from the document at `path`.
    async fn extract_text(&self, path: &Path) -> anyhow::Result<String>;
}

/// Recognizes text in an image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Human-readable engine name (e.g. "tesseract").
    fn name(&self) -> &str;

    /// Recognized text, or an empty string when nothing was found.
    async fn recognize(&self, image: &Path) -> anyhow::Result<String>;
}

/// Reads a student's answers from a submission.
#[async_trait]
pub trait AnswerDetector: Send + Sync {
    /// Human-readable detector name.
    fn name(&self) -> &str;

    /// Detect answers for a key with `question_count` questions.
    async fn detect(&self, submission: &Path, question_count: usize)
        -> anyhow::Result<DetectedAnswers>;
}

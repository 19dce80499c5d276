//! Grading error types.
//!
//! Every failure here is scoped to a single grading request: a bad answer
//! key stops that run, a bad submission stops only that submission.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading an answer key or grading a submission.
#[derive(Debug, Error)]
pub enum GradingError {
    /// The file extension is not one markgrade knows how to read.
    #[error("unsupported file format '{extension}': {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Text was read (or reading failed) but no answers could be extracted.
    #[error("answer key extraction failed for {source_name}: {reason}")]
    ParseFailure { source_name: String, reason: String },

    /// The student answer list and the key disagree in length.
    #[error("answer count mismatch: key has {expected} answers, submission has {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// An external collaborator (OCR, extractor, detector) failed or timed out.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: String,
        reason: String,
    },

    /// The parsed key does not have the configured number of questions.
    #[error("answer key has {found} questions, expected {expected}")]
    QuestionCountMismatch { expected: usize, found: usize },
}

impl GradingError {
    /// Message suitable for showing to the person who uploaded the files.
    pub fn user_message(&self) -> String {
        match self {
            GradingError::UnsupportedFormat { extension, .. } => format!(
                "Unsupported file type '{extension}'. Please upload a PDF, DOCX or TXT answer key."
            ),
            GradingError::ParseFailure { .. } => {
                "Answer key extraction failed. Please check the file format.".to_string()
            }
            GradingError::LengthMismatch { expected, found } => format!(
                "The submission has {found} answers but the answer key has {expected}."
            ),
            GradingError::CollaboratorUnavailable { collaborator, .. } => {
                format!("The {collaborator} service is not available right now.")
            }
            GradingError::QuestionCountMismatch { expected, found } => format!(
                "The answer key lists {found} questions, but {expected} were expected."
            ),
        }
    }

    /// Returns `true` if the error came from an external collaborator.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, GradingError::CollaboratorUnavailable { .. })
    }
}

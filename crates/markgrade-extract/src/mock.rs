//! Mock collaborators for testing the grading engine without real
//! documents, OCR or mark recognition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use markgrade_core::model::{Choice, DetectedAnswers};
use markgrade_core::traits::{AnswerDetector, DocumentTextExtractor, OcrEngine};

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns canned text keyed by file name.
pub struct MockExtractor {
    documents: HashMap<String, String>,
    call_count: AtomicU32,
}

impl MockExtractor {
    /// Map of file name → document text.
    pub fn new(documents: HashMap<String, String>) -> Self {
        Self {
            documents,
            call_count: AtomicU32::new(0),
        }
    }

    /// A single document.
    pub fn with_document(file_name: &str, text: &str) -> Self {
        Self::new(HashMap::from([(file_name.to_string(), text.to_string())]))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentTextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let name = file_name(path);
        self.documents
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such document: {name}"))
    }
}

/// Returns fixed OCR text, or fails when constructed with `failing()`.
pub struct MockOcr {
    text: Option<String>,
    call_count: AtomicU32,
}

impl MockOcr {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    fn name(&self) -> &str {
        "mock-ocr"
    }

    async fn recognize(&self, _image: &Path) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.text
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mock OCR engine unavailable"))
    }
}

/// Returns configured answers keyed by file name.
pub struct MockDetector {
    answers: HashMap<String, Vec<Choice>>,
    placeholder: bool,
    seen: Mutex<Vec<PathBuf>>,
}

impl MockDetector {
    /// Map of file name → answer letters, e.g. `"ABCD"`.
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(name, letters)| {
                    (
                        name.to_string(),
                        letters.chars().filter_map(Choice::new).collect(),
                    )
                })
                .collect(),
            placeholder: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Flag every detection as a placeholder.
    pub fn as_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    /// Submissions passed to `detect`, in call order.
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerDetector for MockDetector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn detect(
        &self,
        submission: &Path,
        _question_count: usize,
    ) -> anyhow::Result<DetectedAnswers> {
        self.seen.lock().unwrap().push(submission.to_path_buf());
        let name = file_name(submission);
        let answers = self
            .answers
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no answers configured for {name}"))?;
        Ok(DetectedAnswers::positional(answers, self.placeholder))
    }
}

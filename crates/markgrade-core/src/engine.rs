//! Grading orchestrator.
//!
//! Loads the answer key, then grades submissions: detect answers, resolve
//! the student identity, compare against the key, and append the result to
//! the store. Batches run with bounded parallelism; one failed submission
//! never affects the others.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::error::GradingError;
use crate::grading::grade;
use crate::identity::{IdentityResolver, DEFAULT_MIN_OCR_CHARS};
use crate::model::{AnswerKey, ChoiceAlphabet, DocumentFormat, GradingResult};
use crate::parser::KeyParser;
use crate::store::ResultStore;
use crate::traits::{AnswerDetector, DocumentTextExtractor, OcrEngine};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Letters allowed in the answer key.
    pub alphabet: ChoiceAlphabet,
    /// Required number of questions in the key, if known.
    pub expected_questions: Option<usize>,
    /// Minimum trimmed OCR text length accepted as a student name.
    pub min_ocr_chars: usize,
    /// Upper bound on any single collaborator call.
    pub collaborator_timeout: Duration,
    /// Maximum submissions graded at once.
    pub parallelism: usize,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            alphabet: ChoiceAlphabet::default(),
            expected_questions: None,
            min_ocr_chars: DEFAULT_MIN_OCR_CHARS,
            collaborator_timeout: Duration::from_secs(30),
            parallelism: 4,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, path: &Path);
    fn on_submission_complete(&self, path: &Path, result: &GradingResult);
    fn on_submission_error(&self, path: &Path, error: &GradingError);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &Path) {}
    fn on_submission_complete(&self, _: &Path, _: &GradingResult) {}
    fn on_submission_error(&self, _: &Path, _: &GradingError) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// A submission that could not be graded.
#[derive(Debug)]
pub struct SubmissionFailure {
    pub path: PathBuf,
    pub error: GradingError,
}

/// Results of grading a batch, in submission order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<GradingResult>,
    pub failures: Vec<SubmissionFailure>,
}

/// The central grading engine.
pub struct GradingEngine {
    extractor: Arc<dyn DocumentTextExtractor>,
    detector: Arc<dyn AnswerDetector>,
    ocr: Option<Arc<dyn OcrEngine>>,
    store: Arc<dyn ResultStore>,
    parser: KeyParser,
    resolver: IdentityResolver,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(
        extractor: Arc<dyn DocumentTextExtractor>,
        detector: Arc<dyn AnswerDetector>,
        store: Arc<dyn ResultStore>,
        config: GradingEngineConfig,
    ) -> Self {
        Self {
            extractor,
            detector,
            ocr: None,
            store,
            parser: KeyParser::new(&config.alphabet),
            resolver: IdentityResolver::new(config.min_ocr_chars),
            config,
        }
    }

    /// Use an OCR engine to read student names from image submissions.
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Replace the default identity resolver.
    pub fn with_resolver(mut self, resolver: IdentityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    pub fn config(&self) -> &GradingEngineConfig {
        &self.config
    }

    /// Read and parse the answer key at `path`.
    ///
    /// Extraction failures and documents without answers both surface as
    /// `ParseFailure`; grading never proceeds with an empty key.
    pub async fn load_key(&self, path: &Path) -> Result<AnswerKey, GradingError> {
        let format = DocumentFormat::from_path(path)?;
        if !format.is_document() {
            return Err(GradingError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: format.to_string(),
            });
        }

        let source_name = display_name(path);
        let text = match self
            .call(self.extractor.name(), self.extractor.extract_text(path))
            .await
        {
            Ok(text) => text,
            Err(GradingError::CollaboratorUnavailable { reason, .. }) => {
                tracing::warn!("could not read answer key {source_name}: {reason}");
                return Err(GradingError::ParseFailure {
                    source_name,
                    reason,
                });
            }
            Err(e) => return Err(e),
        };

        let parsed = self.parser.parse(&text);
        if !parsed.duplicates.is_empty() {
            tracing::warn!(
                "answer key {source_name} repeats questions {:?}, keeping first answers",
                parsed.duplicates
            );
        }
        if !parsed.gaps.is_empty() {
            tracing::warn!("answer key {source_name} skips questions {:?}", parsed.gaps);
        }
        let key = parsed.into_key(&source_name)?;

        if let Some(expected) = self.config.expected_questions {
            if key.len() != expected {
                return Err(GradingError::QuestionCountMismatch {
                    expected,
                    found: key.len(),
                });
            }
        }

        tracing::info!("loaded answer key {source_name} with {} questions", key.len());
        Ok(key)
    }

    /// Grade one submission and append the result to the store.
    pub async fn grade_submission(
        &self,
        key: &AnswerKey,
        submission: &Path,
    ) -> Result<GradingResult, GradingError> {
        let format = DocumentFormat::from_path(submission)?;

        let detected = self
            .call(self.detector.name(), self.detector.detect(submission, key.len()))
            .await?;
        if detected.placeholder {
            tracing::warn!(
                "answers for {} are placeholders from the {} detector, not real mark recognition",
                submission.display(),
                self.detector.name()
            );
        }

        let ocr_text = if format == DocumentFormat::Image {
            self.recognize_name(submission).await
        } else {
            None
        };
        let name = self.resolver.resolve(submission, ocr_text.as_deref());

        let result = grade(name, key, &detected)?;
        self.store.append(result.clone());
        tracing::info!(
            "graded {} as {}: {}/{}",
            submission.display(),
            result.name,
            result.score,
            result.total
        );
        Ok(result)
    }

    /// Grade several submissions concurrently.
    pub async fn grade_batch(
        &self,
        key: &AnswerKey,
        submissions: &[PathBuf],
        progress: &dyn ProgressReporter,
    ) -> BatchOutcome {
        let start = Instant::now();
        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let semaphore = &semaphore;

        let mut futures = FuturesUnordered::new();
        for (index, path) in submissions.iter().enumerate() {
            futures.push(async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => {
                        progress.on_submission_start(path);
                        self.grade_submission(key, path).await
                    }
                    Err(_) => Err(GradingError::CollaboratorUnavailable {
                        collaborator: "scheduler".into(),
                        reason: "semaphore closed".into(),
                    }),
                };
                (index, path, outcome)
            });
        }

        let mut graded = Vec::new();
        let mut failed = Vec::new();
        while let Some((index, path, outcome)) = futures.next().await {
            match outcome {
                Ok(result) => {
                    progress.on_submission_complete(path, &result);
                    graded.push((index, result));
                }
                Err(error) => {
                    tracing::error!("grading failed for {}: {error}", path.display());
                    progress.on_submission_error(path, &error);
                    failed.push((
                        index,
                        SubmissionFailure {
                            path: path.clone(),
                            error,
                        },
                    ));
                }
            }
        }

        progress.on_batch_complete(submissions.len(), graded.len(), failed.len(), start.elapsed());

        graded.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|(index, _)| *index);
        BatchOutcome {
            results: graded.into_iter().map(|(_, r)| r).collect(),
            failures: failed.into_iter().map(|(_, f)| f).collect(),
        }
    }

    /// OCR the submission for a name; any failure falls back to `None`.
    async fn recognize_name(&self, image: &Path) -> Option<String> {
        let ocr = self.ocr.as_ref()?;
        match self.call(ocr.name(), ocr.recognize(image)).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    "OCR failed for {}, using filename instead: {e}",
                    image.display()
                );
                None
            }
        }
    }

    /// Run a collaborator call under the configured timeout.
    async fn call<T>(
        &self,
        collaborator: &str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, GradingError> {
        match tokio::time::timeout(self.config.collaborator_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(match e.downcast::<GradingError>() {
                Ok(grading_error) => grading_error,
                Err(e) => GradingError::CollaboratorUnavailable {
                    collaborator: collaborator.to_string(),
                    reason: format!("{e:#}"),
                },
            }),
            Err(_) => Err(GradingError::CollaboratorUnavailable {
                collaborator: collaborator.to_string(),
                reason: format!("timed out after {:?}", self.config.collaborator_timeout),
            }),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

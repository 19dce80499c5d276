//! Configuration and collaborator factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use markgrade_core::engine::GradingEngineConfig;
use markgrade_core::identity::DEFAULT_MIN_OCR_CHARS;
use markgrade_core::model::ChoiceAlphabet;
use markgrade_core::traits::{AnswerDetector, DocumentTextExtractor, OcrEngine};

use crate::detector::{DocumentAnswerDetector, RandomAnswerDetector};
use crate::dispatch::FormatDispatchExtractor;
use crate::ocr::{TesseractOcr, DEFAULT_TESSERACT, SINGLE_LINE_PSM};
use crate::pdf::{PdfExtractor, DEFAULT_PDFTOTEXT};

/// Which answer detector to use for submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Random answers, flagged as placeholders.
    #[default]
    Placeholder,
    /// Answers typed into PDF, DOCX or text submissions.
    Document,
}

impl std::str::FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "placeholder" => Ok(DetectorKind::Placeholder),
            "document" => Ok(DetectorKind::Document),
            other => Err(format!(
                "unknown detector '{other}' (expected 'placeholder' or 'document')"
            )),
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::Placeholder => write!(f, "placeholder"),
            DetectorKind::Document => write!(f, "document"),
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_tesseract")]
    pub program: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
    #[serde(default = "default_page_seg_mode")]
    pub page_seg_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            program: default_tesseract(),
            language: default_ocr_language(),
            page_seg_mode: default_page_seg_mode(),
        }
    }
}

/// PDF extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    #[serde(default = "default_pdftotext")]
    pub program: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            program: default_pdftotext(),
        }
    }
}

/// Top-level markgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkgradeConfig {
    /// Letters allowed in answer keys.
    #[serde(default)]
    pub alphabet: ChoiceAlphabet,
    /// Required number of questions in the key.
    #[serde(default)]
    pub expected_questions: Option<usize>,
    /// Minimum trimmed OCR text length accepted as a name.
    #[serde(default = "default_min_ocr_chars")]
    pub min_ocr_chars: usize,
    /// Upper bound on each collaborator call.
    #[serde(default = "default_timeout_secs")]
    pub collaborator_timeout_secs: u64,
    /// Max submissions graded at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for exports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub detector: DetectorKind,
    /// Seed for the placeholder detector.
    #[serde(default)]
    pub placeholder_seed: Option<u64>,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
}

fn default_tesseract() -> String {
    DEFAULT_TESSERACT.to_string()
}
fn default_ocr_language() -> String {
    "eng".to_string()
}
fn default_page_seg_mode() -> u8 {
    SINGLE_LINE_PSM
}
fn default_pdftotext() -> String {
    DEFAULT_PDFTOTEXT.to_string()
}
fn default_min_ocr_chars() -> usize {
    DEFAULT_MIN_OCR_CHARS
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./markgrade-results")
}

impl Default for MarkgradeConfig {
    fn default() -> Self {
        Self {
            alphabet: ChoiceAlphabet::default(),
            expected_questions: None,
            min_ocr_chars: default_min_ocr_chars(),
            collaborator_timeout_secs: default_timeout_secs(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            detector: DetectorKind::default(),
            placeholder_seed: None,
            ocr: OcrConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl MarkgradeConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> GradingEngineConfig {
        GradingEngineConfig {
            alphabet: self.alphabet.clone(),
            expected_questions: self.expected_questions,
            min_ocr_chars: self.min_ocr_chars,
            collaborator_timeout: Duration::from_secs(self.collaborator_timeout_secs.max(1)),
            parallelism: self.parallelism.max(1),
        }
    }

    /// Apply `MARKGRADE_*` environment overrides and resolve `${VAR}`
    /// references in program paths.
    fn apply_env(&mut self) {
        if let Ok(program) = std::env::var("MARKGRADE_TESSERACT") {
            self.ocr.program = program;
        }
        if let Ok(program) = std::env::var("MARKGRADE_PDFTOTEXT") {
            self.pdf.program = program;
        }
        if let Ok(language) = std::env::var("MARKGRADE_OCR_LANG") {
            self.ocr.language = language;
        }

        self.ocr.program = resolve_env_vars(&self.ocr.program);
        self.ocr.language = resolve_env_vars(&self.ocr.language);
        self.pdf.program = resolve_env_vars(&self.pdf.program);
        self.output_dir = PathBuf::from(resolve_env_vars(&self.output_dir.to_string_lossy()));
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `markgrade.toml` in the current directory
/// 2. `~/.config/markgrade/config.toml`
///
/// Environment variable overrides: `MARKGRADE_TESSERACT`,
/// `MARKGRADE_PDFTOTEXT`, `MARKGRADE_OCR_LANG`.
pub fn load_config_from(path: Option<&Path>) -> Result<MarkgradeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("markgrade.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MarkgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MarkgradeConfig::default(),
    };

    config.apply_env();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("markgrade"))
}

/// Document extractor for answer keys and document submissions.
pub fn create_extractor(config: &MarkgradeConfig) -> Arc<dyn DocumentTextExtractor> {
    Arc::new(FormatDispatchExtractor::new(PdfExtractor::new(
        config.pdf.program.clone(),
    )))
}

/// OCR engine for reading names from image submissions, if enabled.
pub fn create_ocr_engine(config: &MarkgradeConfig) -> Option<Arc<dyn OcrEngine>> {
    config.ocr.enabled.then(|| {
        Arc::new(TesseractOcr::new(
            config.ocr.program.clone(),
            config.ocr.language.clone(),
            config.ocr.page_seg_mode,
        )) as Arc<dyn OcrEngine>
    })
}

/// Answer detector selected by `config.detector`.
pub fn create_detector(
    config: &MarkgradeConfig,
    extractor: Arc<dyn DocumentTextExtractor>,
) -> Arc<dyn AnswerDetector> {
    match config.detector {
        DetectorKind::Placeholder => {
            tracing::warn!(
                "using the placeholder detector: submission answers are random, not recognized marks"
            );
            let alphabet = config.alphabet.clone();
            match config.placeholder_seed {
                Some(seed) => Arc::new(RandomAnswerDetector::seeded(alphabet, seed)),
                None => Arc::new(RandomAnswerDetector::new(alphabet)),
            }
        }
        DetectorKind::Document => {
            Arc::new(DocumentAnswerDetector::new(extractor, &config.alphabet))
        }
    }
}

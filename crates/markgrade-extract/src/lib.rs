//! markgrade-extract — concrete collaborators for the grading engine.
//!
//! Text extraction for DOCX, PDF and plain-text documents, tesseract OCR,
//! answer detectors, and the configuration that wires them together.

pub mod config;
pub mod detector;
pub mod dispatch;
pub mod docx;
pub mod error;
pub mod mock;
pub mod ocr;
pub mod pdf;
mod process;
pub mod text;

pub use config::{
    create_detector, create_extractor, create_ocr_engine, load_config_from, DetectorKind,
    MarkgradeConfig,
};
pub use detector::{DocumentAnswerDetector, RandomAnswerDetector};
pub use dispatch::FormatDispatchExtractor;
pub use docx::DocxExtractor;
pub use error::ExtractError;
pub use ocr::TesseractOcr;
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

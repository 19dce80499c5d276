//! Tesseract OCR through its command-line interface.

use std::path::Path;

use async_trait::async_trait;

use markgrade_core::traits::OcrEngine;

use crate::process::run_program;

/// Default program name.
pub const DEFAULT_TESSERACT: &str = "tesseract";

/// Page segmentation mode 7: treat the image as a single line of text.
pub const SINGLE_LINE_PSM: u8 = 7;

/// Runs `tesseract <image> stdout -l <lang> --psm <mode>`.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
    language: String,
    page_seg_mode: u8,
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>, language: impl Into<String>, page_seg_mode: u8) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
            page_seg_mode,
        }
    }

    fn args(&self, image: &Path) -> Vec<String> {
        vec![
            image.to_string_lossy().into_owned(),
            "stdout".into(),
            "-l".into(),
            self.language.clone(),
            "--psm".into(),
            self.page_seg_mode.to_string(),
        ]
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT, "eng", SINGLE_LINE_PSM)
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &Path) -> anyhow::Result<String> {
        let text = run_program(&self.program, self.args(image)).await?;
        // tesseract ends its output with a form feed
        let text = text.trim_end_matches(['\n', '\r', '\x0c']).to_string();
        tracing::debug!("tesseract read {:?} from {}", text, image.display());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    #[test]
    fn command_line() {
        let ocr = TesseractOcr::new("tesseract", "ind", 6);
        assert_eq!(
            ocr.args(Path::new("scan.png")),
            vec!["scan.png", "stdout", "-l", "ind", "--psm", "6"]
        );
    }

    #[tokio::test]
    async fn missing_tesseract() {
        let ocr = TesseractOcr::new("markgrade-missing-tesseract", "eng", SINGLE_LINE_PSM);
        let err = ocr.recognize(Path::new("scan.png")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::ProgramNotFound { .. })
        ));
    }
}

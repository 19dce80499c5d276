//! PDF text extraction through poppler's `pdftotext`.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;

use markgrade_core::traits::DocumentTextExtractor;

use crate::process::run_program;

/// Default program name.
pub const DEFAULT_PDFTOTEXT: &str = "pdftotext";

/// Runs `pdftotext -layout <file> -` and returns its output.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    program: String,
}

impl PdfExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PDFTOTEXT)
    }
}

#[async_trait]
impl DocumentTextExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        let text = run_program(
            &self.program,
            [OsStr::new("-layout"), path.as_os_str(), OsStr::new("-")],
        )
        .await?;
        Ok(text)
    }
}

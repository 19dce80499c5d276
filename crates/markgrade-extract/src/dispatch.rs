//! Extractor selection by file format.

use std::path::Path;

use async_trait::async_trait;

use markgrade_core::model::DocumentFormat;
use markgrade_core::traits::DocumentTextExtractor;
use markgrade_core::GradingError;

use crate::docx::DocxExtractor;
use crate::pdf::PdfExtractor;
use crate::text::PlainTextExtractor;

/// Routes each document to the extractor for its format.
#[derive(Debug, Clone, Default)]
pub struct FormatDispatchExtractor {
    docx: DocxExtractor,
    pdf: PdfExtractor,
    text: PlainTextExtractor,
}

impl FormatDispatchExtractor {
    pub fn new(pdf: PdfExtractor) -> Self {
        Self {
            docx: DocxExtractor::new(),
            pdf,
            text: PlainTextExtractor::new(),
        }
    }
}

#[async_trait]
impl DocumentTextExtractor for FormatDispatchExtractor {
    fn name(&self) -> &str {
        "document"
    }

    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        match DocumentFormat::from_path(path)? {
            DocumentFormat::Pdf => self.pdf.extract_text(path).await,
            DocumentFormat::Docx => self.docx.extract_text(path).await,
            DocumentFormat::Text => self.text.extract_text(path).await,
            format @ DocumentFormat::Image => Err(GradingError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: format.to_string(),
            }
            .into()),
        }
    }
}

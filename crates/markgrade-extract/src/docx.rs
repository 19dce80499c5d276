//! DOCX text extraction.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent};
use docx_rs::{TableChild, TableRowChild};

use markgrade_core::traits::DocumentTextExtractor;

use crate::error::ExtractError;

/// Reads the text of a `.docx` file, one line per paragraph.
///
/// Paragraphs inside table cells are included in reading order, since answer
/// keys are often laid out as a table.
#[derive(Debug, Default, Clone)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentTextExtractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx"
    }

    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        let text = docx_text(path, &bytes)?;
        tracing::debug!("read {} chars from {}", text.len(), path.display());
        Ok(text)
    }
}

/// Text of a DOCX package held in memory; `path` names it in errors.
pub fn docx_text(path: &Path, bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::InvalidDocx {
        path: path.to_path_buf(),
        reason: format!("{e:?}"),
    })?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => lines.push(paragraph_text(para)),
            DocumentChild::Table(table) => table_lines(table, &mut lines),
            _ => {}
        }
    }
    Ok(lines.join("\n"))
}

fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(para) => lines.push(paragraph_text(para)),
                    TableCellContent::Table(inner) => table_lines(inner, lines),
                    _ => {}
                }
            }
        }
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use docx_rs::{Docx, Run, TableCell, TableRow};

    use super::*;

    fn write_docx(path: &Path, docx: Docx) {
        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }

    #[tokio::test]
    async fn paragraphs_become_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.docx");
        write_docx(
            &path,
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Answer key")))
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("1. A")))
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("2. "))
                        .add_run(Run::new().add_text("c")),
                ),
        );

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        assert_eq!(text, "Answer key\n1. A\n2. c");
    }

    #[tokio::test]
    async fn table_cells_are_included() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.docx");
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("2. B"))),
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("3. D"))),
        ])]);
        write_docx(
            &path,
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("1. A")))
                .add_table(table),
        );

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        assert!(text.contains("1. A"));
        assert!(text.contains("2. B"));
        assert!(text.contains("3. D"));
    }

    #[tokio::test]
    async fn not_a_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.docx");
        std::fs::write(&path, "plain text, not a zip").unwrap();

        let err = DocxExtractor::new().extract_text(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::InvalidDocx { .. })
        ));
    }

    #[test]
    fn invalid_bytes_name_the_document() {
        let err = docx_text(Path::new("answers.docx"), b"PK not really").unwrap_err();
        match err {
            ExtractError::InvalidDocx { path, .. } => {
                assert_eq!(path, Path::new("answers.docx"))
            }
            other => panic!("expected InvalidDocx, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file() {
        let err = DocxExtractor::new()
            .extract_text(Path::new("/nonexistent/key.docx"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

//! Plain-text documents.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use markgrade_core::traits::DocumentTextExtractor;

/// Reads a text file, replacing invalid UTF-8 sequences.
#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentTextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "text"
    }

    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.txt");
        std::fs::write(&path, b"1. A\n2. \xffB\n").unwrap();

        let text = PlainTextExtractor::new().extract_text(&path).await.unwrap();
        assert!(text.starts_with("1. A\n"));
        assert!(text.contains('\u{FFFD}'));
    }
}

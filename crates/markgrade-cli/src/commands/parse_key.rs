//! The `markgrade parse-key` command.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use markgrade_core::model::DocumentFormat;
use markgrade_core::parser::{validate_key_parse, KeyParser};
use markgrade_core::GradingError;
use markgrade_extract::config::load_config_from;
use markgrade_extract::create_extractor;

pub async fn execute(
    key_path: PathBuf,
    expected: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let format = DocumentFormat::from_path(&key_path)?;
    if !format.is_document() {
        return Err(GradingError::UnsupportedFormat {
            path: key_path,
            extension: format.to_string(),
        }
        .into());
    }

    let source_name = key_path.display().to_string();
    let timeout = config.engine_config().collaborator_timeout;
    let extractor = create_extractor(&config);
    let text = match tokio::time::timeout(timeout, extractor.extract_text(&key_path)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(key_failure(&source_name, format!("{e:#}"))),
        Err(_) => {
            let reason = format!("timed out after {timeout:?}");
            return Err(key_failure(&source_name, reason));
        }
    };
    let parsed = KeyParser::new(&config.alphabet).parse(&text);
    let warnings = validate_key_parse(&parsed, expected.or(config.expected_questions));

    println!("Answer key: {}", key_path.display());
    for w in &warnings {
        let prefix = w
            .question
            .map(|q| format!("  [{q}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let key = parsed
        .into_key(&source_name)
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;
    println!("{} questions", key.len());
    for (number, answer) in key.question_numbers().iter().zip(key.answers()) {
        println!("  {number}. {answer}");
    }
    println!("Key: {}", key.to_letters());

    if warnings.is_empty() {
        println!("Answer key valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

fn key_failure(source_name: &str, reason: String) -> anyhow::Error {
    tracing::warn!("could not read answer key {source_name}: {reason}");
    let e = GradingError::ParseFailure {
        source_name: source_name.to_string(),
        reason,
    };
    anyhow!("{} ({e})", e.user_message())
}

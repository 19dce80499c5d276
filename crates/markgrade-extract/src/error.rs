//! Extraction error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the document and OCR collaborators.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The external program is not installed or not on `PATH`.
    #[error("'{program}' not found; install it or set its path in markgrade.toml")]
    ProgramNotFound { program: String },

    /// The external program could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program exited unsuccessfully.
    #[error("'{program}' exited with {}: {stderr}", exit_code_label(.code.as_ref().copied()))]
    ProgramFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The file is not a readable DOCX package.
    #[error("invalid docx {}: {reason}", .path.display())]
    InvalidDocx { path: PathBuf, reason: String },
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

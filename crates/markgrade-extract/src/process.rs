//! Running external text tools.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::ExtractError;

/// Run `program` with `args` and return its stdout as (lossy) UTF-8.
///
/// The child is killed if the returned future is dropped, so a caller-side
/// timeout never leaves the process running.
pub(crate) async fn run_program<I, S>(program: &str, args: I) -> Result<String, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => ExtractError::ProgramNotFound {
                program: program.to_string(),
            },
            _ => ExtractError::Spawn {
                program: program.to_string(),
                source,
            },
        })?;

    if !output.status.success() {
        return Err(ExtractError::ProgramFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

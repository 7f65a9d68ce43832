//! Editor process handling

use crate::error::{EditorError, EditorResult};
use std::io::Write;
use std::process::Command;

/// Editor candidates in the order they are tried: the configured editor,
/// `$VISUAL`, `$EDITOR`, then `editor`, `vim` and `vi`. Empty entries are
/// skipped.
pub fn candidates(configured: Option<&str>) -> Vec<String> {
    let env = |name: &str| std::env::var(name).ok();
    [
        configured.map(str::to_string),
        env("VISUAL"),
        env("EDITOR"),
        Some("editor".to_string()),
        Some("vim".to_string()),
        Some("vi".to_string()),
    ]
    .into_iter()
    .flatten()
    .filter(|c| !c.trim().is_empty())
    .collect()
}

/// Write `text` to a temp file, open it in the first candidate that can be
/// started, and return the file's content afterwards.
///
/// A candidate may carry arguments (`code --wait`). One that cannot be
/// started is skipped; one that starts and exits unsuccessfully ends the
/// search with [`EditorError::Failed`].
pub fn edit_text(candidates: &[String], text: &str, suffix: &str) -> EditorResult<String> {
    let mut file = tempfile::Builder::new()
        .prefix("sqlview.")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    let mut tried = Vec::new();
    for candidate in candidates {
        let mut words = candidate.split_whitespace();
        let Some(program) = words.next() else {
            continue;
        };

        tracing::debug!(editor = %candidate, path = %file.path().display(), "launching editor");
        match Command::new(program).args(words).arg(file.path()).status() {
            Ok(status) if status.success() => {
                return Ok(std::fs::read_to_string(file.path())?);
            }
            Ok(status) => {
                return Err(EditorError::Failed {
                    program: candidate.clone(),
                    status,
                });
            }
            Err(e) => {
                tracing::debug!(editor = %candidate, error = %e, "editor not started");
                tried.push(candidate.clone());
            }
        }
    }
    Err(EditorError::NotFound { tried })
}

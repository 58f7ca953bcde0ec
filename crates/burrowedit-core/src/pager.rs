//! Paged display of dumps and diffs
//!
//! Advisory output only: nothing here touches the file or the version
//! store. The diff tool and pager are external collaborators configured
//! through [`Settings`].

use crate::error::{EditError, EditResult};
use crate::settings::Settings;
use crate::validator::NormalizedDump;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Display `text` through the configured pager.
pub async fn page(settings: &Settings, text: &str) -> EditResult<()> {
    let (program, args) = split_argv(&settings.pager)?;
    debug!("paging {} bytes through {program}", text.len());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| EditError::tool(program, format!("failed to start pager: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        // the pager may quit before reading everything; that is fine
        let _ = stdin.write_all(text.as_bytes()).await;
    }
    child
        .wait()
        .await
        .map_err(|e| EditError::tool(program, format!("pager failed: {e}")))?;
    Ok(())
}

/// Show the line diff between the before- and current settings dumps.
///
/// The dumps are materialized into the session scratch directory, handed
/// to the external diff tool, and the result is paged. Exit status 1 from
/// the differ means "differences found", not failure.
pub async fn show_diff(
    settings: &Settings,
    scratch: &Path,
    before: &NormalizedDump,
    current: &NormalizedDump,
) -> EditResult<()> {
    let before_path = scratch.join("settings.before");
    let current_path = scratch.join("settings.current");
    tokio::fs::write(&before_path, before.as_str()).await?;
    tokio::fs::write(&current_path, current.as_str()).await?;

    let (program, args) = split_argv(&settings.differ)?;
    let output = Command::new(program)
        .args(args)
        .arg(&before_path)
        .arg(&current_path)
        .output()
        .await
        .map_err(|e| EditError::tool(program, format!("failed to run diff: {e}")))?;

    match output.status.code() {
        Some(0) => {
            page(settings, "settings are unchanged since session start\n").await?;
        }
        Some(1) => {
            page(settings, &String::from_utf8_lossy(&output.stdout)).await?;
        }
        _ => {
            return Err(EditError::tool(
                program,
                format!(
                    "diff failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
    }
    Ok(())
}

fn split_argv(argv: &[String]) -> EditResult<(&str, &[String])> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| EditError::settings("empty tool command"))?;
    Ok((program.as_str(), args))
}

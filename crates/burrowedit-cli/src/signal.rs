//! Abnormal-termination cleanup
//!
//! The session's scratch directory is normally removed when the session
//! drops; a signal would skip destructors, so a cleanup task registered
//! once at startup removes it before exiting with the conventional
//! signal status.

use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the signal-cleanup task for the session scratch directory.
pub fn spawn_cleanup_task(scratch: PathBuf) -> std::io::Result<JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    let handle = tokio::spawn(async move {
        if let Some(signal) = signals.next().await {
            debug!("received signal {signal}, removing {}", scratch.display());
            let _ = std::fs::remove_dir_all(&scratch);
            std::process::exit(128 + signal);
        }
    });
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cleanup_task_registers_and_aborts_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_cleanup_task(dir.path().to_path_buf()).unwrap();
        handle.abort();
        assert!(dir.path().exists());
    }
}

//! Restart coordinator
//!
//! Restarting burrowd from inside the session would kill the operator's
//! own tunnel before the session could report anything, so the restart is
//! handed to a detached helper process that sleeps first. The helper
//! outlives this process on purpose, and its outcome is never observed.
//! That is a known limitation; watching the daemon come back up is
//! future work.

use crate::error::{EditError, EditResult};
use std::process::Stdio;
use tracing::info;

/// Service-manager commands tried in order; the first success wins.
const RESTART_CHAIN: &[&str] = &[
    "systemctl restart burrowd",
    "service burrow restart",
    "rc-service burrow restart",
];

/// Schedules the delayed, best-effort daemon restart.
#[derive(Debug, Clone, Copy)]
pub struct RestartCoordinator {
    delay_secs: u64,
}

impl RestartCoordinator {
    pub fn new(delay_secs: u64) -> Self {
        Self { delay_secs }
    }

    /// Spawn the detached restart helper. Fire-and-forget: the child is
    /// placed in its own process group, gets no stdio, and is never
    /// waited on. There is no cancellation once scheduled.
    pub fn schedule_detached(&self) -> EditResult<()> {
        let script = restart_script(self.delay_secs);
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn()
            .map_err(|e| EditError::tool("sh", format!("failed to schedule restart: {e}")))?;
        info!(
            "burrowd restart scheduled in {} second(s), detached",
            self.delay_secs
        );
        Ok(())
    }
}

fn restart_script(delay_secs: u64) -> String {
    format!("sleep {delay_secs}; {}", RESTART_CHAIN.join(" || "))
}

//! Privilege and dependency preflight
//!
//! Both checks run before any file is touched: a missing external tool
//! aborts immediately naming the tool, and a shared-directory target
//! edited without privilege re-execs the whole invocation under sudo.
//! Escalation is all-or-nothing at the very start, never partial.

use burrowedit_core::error::{EditError, EditResult};
use burrowedit_core::settings::Settings;
use burrowedit_core::target::ConfigTarget;
use std::os::unix::process::CommandExt;
use tracing::{debug, info};

/// Verify every external collaborator resolves on PATH. The first
/// missing one is fatal.
pub fn check_dependencies(settings: &Settings) -> EditResult<()> {
    for tool in settings.required_tools() {
        which::which(tool).map_err(|_| EditError::MissingDependency(tool.to_string()))?;
        debug!("found required tool: {tool}");
    }
    Ok(())
}

/// Configuration variables that must survive the sudo re-exec; default
/// `env_reset` sudoers would otherwise strip them and the elevated
/// session would silently fall back to built-in defaults.
const FORWARDED_VARS: &[&str] = &[
    "BURROW_EDITOR",
    "BURROW_PAGER",
    "BURROW_DIFF",
    "BURROW_RESTART_DELAY",
    "BURROWD_BIN",
];

/// Re-exec under sudo when the target lives in the shared system
/// directory and we are not root. On success this never returns; the
/// elevated process starts the session from scratch with the same
/// arguments and the same burrowedit environment.
pub fn escalate_if_needed(target: &ConfigTarget) -> EditResult<()> {
    if !target.is_shared || nix::unistd::Uid::effective().is_root() {
        return Ok(());
    }

    info!(
        "{} is a shared system target, re-executing with privileges",
        target.file.display()
    );
    let exe = std::env::current_exe()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let err = std::process::Command::new("sudo")
        .args(sudo_env_args())
        .arg(exe)
        .args(args)
        .exec();
    Err(EditError::tool(
        "sudo",
        format!("failed to re-exec with privileges: {err}"),
    ))
}

/// `VAR=value` arguments carrying the set burrowedit variables through
/// sudo; unset variables are not forwarded.
fn sudo_env_args() -> Vec<String> {
    FORWARDED_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok().map(|value| format!("{var}={value}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings() -> Settings {
        Settings {
            editor: vec!["sh".into()],
            pager: vec!["cat".into()],
            differ: vec!["diff".into(), "-u".into()],
            restart_delay_secs: 10,
            service_bin: "sh".into(),
            shared_dir: PathBuf::from("/etc/burrow"),
        }
    }

    #[test]
    fn present_tools_pass_preflight() {
        // sh, cat, diff and git exist on any host these tests run on
        check_dependencies(&settings()).unwrap();
    }

    #[test]
    fn missing_tool_is_fatal_and_named() {
        let mut s = settings();
        s.differ = vec!["burrowedit-no-such-diff".into()];
        let err = check_dependencies(&s).unwrap_err();
        match err {
            EditError::MissingDependency(tool) => {
                assert_eq!(tool, "burrowedit-no-such-diff");
            }
            other => panic!("expected MissingDependency, got {other}"),
        }
    }

    #[test]
    fn set_burrow_variables_are_forwarded_through_sudo() {
        std::env::set_var("BURROW_DIFF", "colordiff -u");
        std::env::remove_var("BURROW_PAGER");

        let args = sudo_env_args();
        assert!(args.contains(&"BURROW_DIFF=colordiff -u".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("BURROW_PAGER=")));
        std::env::remove_var("BURROW_DIFF");
    }

    #[test]
    fn private_targets_never_escalate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("burrow.conf");
        std::fs::write(&path, "name alpha\n").unwrap();
        let target = ConfigTarget::resolve(&path, &settings()).unwrap();

        escalate_if_needed(&target).unwrap();
    }
}

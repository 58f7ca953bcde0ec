//! Environment-derived runtime settings
//!
//! The shell-style environment knobs are resolved exactly once at startup
//! into an explicit [`Settings`] struct that everything downstream takes
//! by reference. Nothing in the session re-reads the environment.

use crate::error::{EditError, EditResult};
use std::env;
use std::path::PathBuf;

/// Shared, privileged fragment directory for burrowd configuration.
pub const SHARED_CONFIG_DIR: &str = "/etc/burrow";

/// Fixed delay fallback before a scheduled daemon restart, in seconds.
const DEFAULT_RESTART_DELAY: u64 = 10;

/// Resolved external-tool commands and session knobs.
///
/// Command fields are argv vectors (program first) so editor/pager/diff
/// overrides may carry their own flags, e.g. `BURROW_DIFF="diff -u"`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Editor argv; `BURROW_EDITOR`, `VISUAL`, `EDITOR`, then `vi`
    pub editor: Vec<String>,
    /// Pager argv; `BURROW_PAGER`, `PAGER`, then `less`
    pub pager: Vec<String>,
    /// Diff tool argv; `BURROW_DIFF`, then `diff -u`
    pub differ: Vec<String>,
    /// Seconds to wait before a scheduled restart; `BURROW_RESTART_DELAY`
    pub restart_delay_secs: u64,
    /// Service binary used for validation dumps; `BURROWD_BIN`
    pub service_bin: String,
    /// Directory treated as the shared system config location
    pub shared_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment, applying defaults.
    pub fn from_env() -> EditResult<Self> {
        let editor = command_from_env(&["BURROW_EDITOR", "VISUAL", "EDITOR"], "vi")?;
        let pager = command_from_env(&["BURROW_PAGER", "PAGER"], "less")?;
        let differ = command_from_env(&["BURROW_DIFF"], "diff -u")?;

        let restart_delay_secs = match env::var("BURROW_RESTART_DELAY") {
            Ok(raw) => raw.parse().map_err(|_| {
                EditError::settings(format!("invalid BURROW_RESTART_DELAY value: {raw}"))
            })?,
            Err(_) => DEFAULT_RESTART_DELAY,
        };

        let service_bin =
            env::var("BURROWD_BIN").unwrap_or_else(|_| "burrowd".to_string());

        Ok(Self {
            editor,
            pager,
            differ,
            restart_delay_secs,
            service_bin,
            shared_dir: PathBuf::from(SHARED_CONFIG_DIR),
        })
    }

    /// Default per-user config path, used when no argument is given.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("burrow")
            .join("burrow.conf")
    }

    /// Program names this session shells out to, for preflight checks.
    ///
    /// The in-process digest needs no external utility, so only the
    /// commands actually spawned are listed.
    pub fn required_tools(&self) -> Vec<&str> {
        let mut tools = vec!["git", "sh"];
        for argv in [&self.editor, &self.pager, &self.differ] {
            if let Some(program) = argv.first() {
                tools.push(program.as_str());
            }
        }
        tools.push(self.service_bin.as_str());
        tools
    }
}

/// First non-empty variable from `vars` wins, split shell-style;
/// otherwise the default command.
fn command_from_env(vars: &[&str], default: &str) -> EditResult<Vec<String>> {
    for var in vars {
        if let Ok(raw) = env::var(var) {
            if raw.trim().is_empty() {
                continue;
            }
            let argv = shell_words::split(&raw)
                .map_err(|e| EditError::settings(format!("cannot parse {var}: {e}")))?;
            if !argv.is_empty() {
                return Ok(argv);
            }
        }
    }
    shell_words::split(default)
        .map_err(|e| EditError::settings(format!("bad builtin default {default:?}: {e}")))
}

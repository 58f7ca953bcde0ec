//! Validator adapter
//!
//! burrowedit never parses burrow configuration itself. The daemon binary
//! owns the grammar; this adapter runs its parse-and-dump mode and hands
//! back either the canonical settings dump or the tool's diagnostics.

use crate::error::{EditError, EditResult};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// What to validate: a single file, or a whole fragment directory treated
/// as one logical configuration (shared mode).
#[derive(Debug, Clone)]
pub enum ValidationSource {
    File(PathBuf),
    Directory(PathBuf),
}

impl ValidationSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Directory(p) => p,
        }
    }
}

/// Canonical textual rendering of a successfully parsed configuration.
///
/// Held only as two session snapshots: the immutable "before" dump and
/// the "current" dump recomputed after every edit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDump(String);

impl NormalizedDump {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

/// Diagnostics from a failed parse, verbatim from the daemon.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub diagnostics: String,
}

/// Outcome of one validation attempt. Parse failures are recoverable and
/// stay inside the edit loop; only spawn failures become [`EditError`]s.
#[derive(Debug, Clone)]
pub enum Validation {
    Parsed(NormalizedDump),
    Failed(ParseFailure),
}

/// Wraps the daemon's `--dump-config` mode.
#[derive(Debug, Clone)]
pub struct Validator {
    service_bin: String,
}

impl Validator {
    pub fn new(service_bin: impl Into<String>) -> Self {
        Self {
            service_bin: service_bin.into(),
        }
    }

    /// Parse `source` without mutating it. Deterministic: identical input
    /// yields an identical dump. No retries.
    pub async fn validate(&self, source: &ValidationSource) -> EditResult<Validation> {
        debug!(
            "validating {} with {}",
            source.path().display(),
            self.service_bin
        );

        let output = Command::new(&self.service_bin)
            .arg("--dump-config")
            .arg(source.path())
            .output()
            .await
            .map_err(|e| {
                EditError::tool(&self.service_bin, format!("failed to run validator: {e}"))
            })?;

        if output.status.success() {
            let dump = String::from_utf8_lossy(&output.stdout).into_owned();
            Ok(Validation::Parsed(NormalizedDump::new(dump)))
        } else {
            let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
            diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
            Ok(Validation::Failed(ParseFailure { diagnostics }))
        }
    }
}

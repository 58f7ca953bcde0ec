//! Version store
//!
//! Append-only edit history backed by the external `git` binary. Only
//! four capabilities are used: init, commit, checkout and has-history;
//! re-implementing version control is out of scope. For shared targets
//! the store root is the config directory itself (one history for the
//! whole fragment directory); private targets keep a hidden repository
//! beside the file and copy the file in on every checkpoint.

use crate::error::{EditError, EditResult};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

const CHECKPOINT_MESSAGE: &str = "burrowedit checkpoint";

/// Git-backed checkpoint history rooted at one directory.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and the repository inside it if either is absent.
    /// A store that cannot be initialized is fatal: without it no edit
    /// could ever be reverted.
    pub async fn ensure_initialized(&self) -> EditResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            EditError::RepoInit(format!("cannot create {}: {e}", self.root.display()))
        })?;

        if self.root.join(".git").is_dir() {
            return Ok(());
        }

        let output = self.git(&["init", "--quiet"]).await?;
        if !output.status.success() {
            return Err(EditError::RepoInit(format!(
                "git init failed in {}: {}",
                self.root.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        info!("initialized version store at {}", self.root.display());
        Ok(())
    }

    /// Whether any checkpoint has ever been committed.
    pub async fn has_history(&self) -> EditResult<bool> {
        let output = self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]).await?;
        Ok(output.status.success())
    }

    /// Commit the current content of `file` as the new baseline.
    ///
    /// This is the durability boundary: once it returns, the content is
    /// what `revert` will restore. Committing identical content is a
    /// no-op rather than an error, so checkpointing an unchanged file is
    /// idempotent.
    pub async fn checkpoint(&self, file: &Path) -> EditResult<()> {
        let name = file_name(file)?;

        if file.parent() != Some(self.root.as_path()) {
            tokio::fs::copy(file, self.root.join(&name)).await?;
        }

        self.git_ok(&["add", "--", name.as_str()]).await?;

        let status = self
            .git(&["status", "--porcelain", "--", name.as_str()])
            .await?;
        if status.stdout.is_empty() && self.has_history().await? {
            debug!("{name} unchanged since last checkpoint, skipping commit");
            return Ok(());
        }

        self.git_ok(&[
            "-c",
            "user.name=burrowedit",
            "-c",
            "user.email=burrowedit@localhost",
            "commit",
            "--quiet",
            "-m",
            CHECKPOINT_MESSAGE,
            "--",
            name.as_str(),
        ])
        .await?;
        info!("checkpointed {}", file.display());
        Ok(())
    }

    /// Restore `file` to its last checkpoint. Returns false (and touches
    /// nothing) when this file has never been checkpointed, even if the
    /// repository holds history for other fragments.
    pub async fn revert(&self, file: &Path) -> EditResult<bool> {
        let name = file_name(file)?;
        if !self.has_file_history(&name).await? {
            debug!(
                "no checkpoint for {name} in {}, nothing to revert",
                self.root.display()
            );
            return Ok(false);
        }

        self.git_ok(&["checkout", "--quiet", "--", name.as_str()])
            .await?;

        if file.parent() != Some(self.root.as_path()) {
            tokio::fs::copy(self.root.join(&name), file).await?;
        }
        info!("reverted {} to last checkpoint", file.display());
        Ok(true)
    }

    /// Whether this specific file exists in the committed history. A
    /// shared-directory store holds one history for all fragments, so a
    /// repo-wide check is not enough.
    async fn has_file_history(&self, name: &str) -> EditResult<bool> {
        let spec = format!("HEAD:{name}");
        let output = self.git(&["cat-file", "-e", spec.as_str()]).await?;
        Ok(output.status.success())
    }

    async fn git(&self, args: &[&str]) -> EditResult<Output> {
        debug!("git -C {} {}", self.root.display(), args.join(" "));
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .await
            .map_err(|e| EditError::tool("git", format!("failed to run git: {e}")))
    }

    async fn git_ok(&self, args: &[&str]) -> EditResult<Output> {
        let output = self.git(args).await?;
        if !output.status.success() {
            return Err(EditError::tool(
                "git",
                format!(
                    "git {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(output)
    }
}

fn file_name(file: &Path) -> EditResult<String> {
    Ok(file
        .file_name()
        .ok_or_else(|| EditError::settings(format!("not a file path: {}", file.display())))?
        .to_string_lossy()
        .into_owned())
}

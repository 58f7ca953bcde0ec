//! Config target resolution
//!
//! A target is the file being edited plus the facts that flow from where
//! it lives: whether it sits in the shared system fragment directory, and
//! where its version store therefore roots.

use crate::error::{EditError, EditResult};
use crate::settings::Settings;
use crate::validator::ValidationSource;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the hidden per-directory store used for private targets.
pub const PRIVATE_STORE_DIR: &str = ".burrowedit";

/// The config file under edit, resolved to its real directory.
#[derive(Debug, Clone)]
pub struct ConfigTarget {
    /// Absolute path of the file being edited
    pub file: PathBuf,
    /// Canonicalized directory containing the file
    pub dir: PathBuf,
    /// True when the directory is the shared system config location
    pub is_shared: bool,
}

impl ConfigTarget {
    /// Resolve a user-supplied path against the current directory and the
    /// configured shared location. The containing directory must exist;
    /// the file itself is checked later by the baseline validation.
    pub fn resolve(path: &Path, settings: &Settings) -> EditResult<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()?.join(path)
        };

        let parent = absolute.parent().ok_or_else(|| {
            EditError::settings(format!(
                "config path has no containing directory: {}",
                absolute.display()
            ))
        })?;
        let dir = parent.canonicalize().map_err(|e| {
            EditError::settings(format!("cannot resolve {}: {e}", parent.display()))
        })?;

        let name = absolute.file_name().ok_or_else(|| {
            EditError::settings(format!("not a file path: {}", absolute.display()))
        })?;
        let file = dir.join(name);
        let is_shared = dir == settings.shared_dir;

        Ok(Self {
            file,
            dir,
            is_shared,
        })
    }

    /// Version-store root: shared targets version the config directory
    /// itself (one shared history for all fragments); private targets get
    /// a hidden repository beside the file.
    pub fn store_root(&self) -> PathBuf {
        if self.is_shared {
            self.dir.clone()
        } else {
            self.dir.join(PRIVATE_STORE_DIR)
        }
    }

    /// What the validator should parse: the whole fragment directory in
    /// shared mode, just this file otherwise.
    pub fn validation_source(&self) -> ValidationSource {
        if self.is_shared {
            ValidationSource::Directory(self.dir.clone())
        } else {
            ValidationSource::File(self.file.clone())
        }
    }
}

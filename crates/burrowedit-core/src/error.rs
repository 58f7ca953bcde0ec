//! Error types for burrowedit

use thiserror::Error;

/// Result type alias for burrowedit operations
pub type EditResult<T> = Result<T, EditError>;

/// Main error type for burrowedit
///
/// Only the fatal variants ever escape the edit loop; post-edit parse
/// failures stay inside the session as
/// [`Validation::Failed`](crate::validator::Validation).
#[derive(Error, Debug)]
pub enum EditError {
    /// A required external tool is not on PATH
    #[error("required tool not found: {0}")]
    MissingDependency(String),

    /// The pre-edit baseline does not parse; the session refuses to start
    #[error("existing configuration does not parse, refusing to edit: {0}")]
    BrokenBaseline(String),

    /// The version-store repository could not be created or initialized
    #[error("version store initialization failed: {0}")]
    RepoInit(String),

    /// Failure spawning or driving an external tool
    #[error("tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value errors (malformed environment overrides)
    #[error("settings error: {0}")]
    Settings(String),
}

impl EditError {
    /// Create a new tool error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new settings error
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }

    /// Process exit code for this error when it reaches the binary edge.
    ///
    /// Usage errors exit with 2 (clap's convention) before any of these
    /// are constructed; everything else gets a distinct category so
    /// callers can tell missing tooling from a corrupted baseline from a
    /// failed repository.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingDependency(_) => 3,
            Self::BrokenBaseline(_) => 4,
            Self::RepoInit(_) => 5,
            Self::Tool { .. } | Self::Io(_) | Self::Settings(_) => 1,
        }
    }
}

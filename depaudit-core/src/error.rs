//! Typed error handling for depaudit.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for depaudit operations.
///
/// Scope-resolution and snapshot errors are fatal: an audit never runs
/// against a partially resolved graph. Supertype lookups that fail are not
/// errors at all — they degrade to an empty result inside the resolver.
#[derive(Error, Debug)]
pub enum DepauditError {
    /// The build snapshot could not be read, parsed, or validated
    #[error("Snapshot error at {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    /// A dependency scope could not be resolved against the snapshot
    #[error("Resolution error in scope {scope}: {message}")]
    Resolution { scope: String, message: String },

    /// The requested project does not exist in the snapshot
    #[error("Unknown project: {project}")]
    UnknownProject { project: String },

    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DepauditError {
    /// Create a snapshot error with path context.
    pub fn snapshot(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Snapshot {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a scope-resolution error.
    pub fn resolution(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-project error.
    pub fn unknown_project(project: impl Into<String>) -> Self {
        Self::UnknownProject {
            project: project.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (the audit can continue).
    ///
    /// Config and cache-adjacent I/O problems are recoverable; resolution
    /// and snapshot problems are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Io { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Snapshot { path, .. } => Some(path),
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for depaudit results.
pub type DepauditResult<T> = Result<T, DepauditError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DepauditResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DepauditResult<T> {
        self.map_err(|e| DepauditError::io(path, e))
    }
}

//! Typed error handling for atlasic.
//!
//! Most failures inside a build are absorbed where they happen (logged and
//! degraded). The variants here are the ones that do reach a caller: an
//! invalid workspace root, a graph that fails link resolution, or I/O and
//! cache failures surfaced by explicit helpers.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for atlasic operations.
#[derive(Error, Debug)]
pub enum AtlasicError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors (atlasic.toml, alias config)
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Workspace root precondition failures
    #[error("Workspace error at {path}: {message}")]
    Workspace { path: PathBuf, message: String },

    /// Cache read/write errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// A graph whose links reference unknown nodes
    #[error("Invalid graph: {message}")]
    InvalidGraph { message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl AtlasicError {
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

    /// Create a workspace error.
    pub fn workspace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Workspace {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an invalid-graph error.
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this error can be absorbed by degrading (cache miss, default
    /// config, skipped file) instead of failing the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Cache { .. } | Self::Config { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Workspace { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for atlasic results.
pub type AtlasicResult<T> = Result<T, AtlasicError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> AtlasicResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> AtlasicResult<T> {
        self.map_err(|e| AtlasicError::io(path, e))
    }
}

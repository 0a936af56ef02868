//! Error and warning types for discovery and comparison.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a discovery run before any project is examined.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Parent path is not a directory.
    #[error("Parent path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl DiscoveryError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error listing or walking a directory.
    ReadError,
    /// Error reading file metadata.
    MetadataError,
    /// Error computing a content hash.
    HashError,
    /// File content could not be read as text during comparison.
    ContentUnreadable,
    /// Candidate directory had a root but no relevant files.
    EmptyProject,
}

/// Non-fatal warning encountered during discovery or comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning, promoting permission failures.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = if error.kind() == std::io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            WarningKind::ReadError
        };
        Self {
            message: format!("Read error: {error}"),
            path,
            kind,
        }
    }

    /// Create a warning for a file whose text could not be loaded.
    pub fn content_unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            message: format!("Unreadable content, compared as empty: {reason}"),
            path,
            kind: WarningKind::ContentUnreadable,
        }
    }

    /// Create a warning for a project root with nothing to compare.
    pub fn empty_project(root: impl Into<PathBuf>) -> Self {
        let path = root.into();
        Self {
            message: format!("No relevant files under {}", path.display()),
            path,
            kind: WarningKind::EmptyProject,
        }
    }
}

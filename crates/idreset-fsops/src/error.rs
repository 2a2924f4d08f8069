//! # Design
//!
//! - Provide structured, constant-message errors for storage file access.
//! - Capture the operation and path so callers can render their own diagnostics.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage file operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while reading, writing, or re-permissioning the storage file.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON parsing or serialization failures.
    #[error("fsops json failure")]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Path involved in the JSON failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The file parsed as JSON but its top-level value is not an object.
    #[error("fsops document is not an object")]
    NotAnObject {
        /// Path of the offending file.
        path: PathBuf,
        /// JSON type found at the top level.
        found: &'static str,
    },
}

impl FsOpsError {
    /// Build an [`FsOpsError::Io`].
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Build an [`FsOpsError::Json`].
    pub fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Path the failing operation was acting on.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::NotAnObject { path, .. } => {
                path
            }
        }
    }

    /// Whether the failure came from decoding file contents rather than IO.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::NotAnObject { .. })
    }
}

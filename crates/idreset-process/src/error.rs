//! # Design
//!
//! - Constant messages; the image name and exit status travel as fields.
//! - Spawn failures keep the underlying IO error as the source.

use std::io;

use thiserror::Error;

/// Result alias for process control operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors raised while querying or terminating processes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The helper command could not be started.
    #[error("process helper failed to start")]
    Spawn {
        /// Helper program that failed to start.
        program: &'static str,
        /// Image name the call was about.
        image: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The process table query exited unsuccessfully.
    #[error("process query failed")]
    QueryFailed {
        /// Image name that was queried.
        image: String,
        /// Exit code, when the platform reports one.
        status: Option<i32>,
    },
    /// The termination request exited unsuccessfully.
    #[error("process termination failed")]
    TerminateFailed {
        /// Image name that could not be terminated.
        image: String,
        /// Exit code, when the platform reports one.
        status: Option<i32>,
    },
}

impl ProcessError {
    /// Image name the failing call was about.
    #[must_use]
    pub fn image(&self) -> &str {
        match self {
            Self::Spawn { image, .. }
            | Self::QueryFailed { image, .. }
            | Self::TerminateFailed { image, .. } => image,
        }
    }
}

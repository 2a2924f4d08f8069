//! # Design
//!
//! - One variant per way a reset run can abort; each aborts the remaining steps.
//! - Messages are constant; paths and images live in fields for the caller to render.
//! - Lower-layer errors are kept as sources rather than flattened into text.

use std::path::{Path, PathBuf};

use idreset_config::ConfigError;
use idreset_fsops::FsOpsError;
use idreset_process::ProcessError;
use thiserror::Error;

use crate::stage::RunStage;

/// Reasons a reset run aborts.
#[derive(Debug, Error)]
pub enum RunError {
    /// The host is not supported or its data root cannot be located.
    #[error("environment unsupported")]
    EnvironmentUnsupported {
        /// Underlying environment resolution failure.
        source: ConfigError,
    },
    /// The storage file does not exist.
    #[error("target file missing")]
    TargetMissing {
        /// Path that was expected to exist.
        path: PathBuf,
    },
    /// The process table could not be queried at all.
    #[error("process scan failed")]
    ProcessScanFailed {
        /// Underlying process helper failure.
        source: ProcessError,
    },
    /// At least one running editor process could not be terminated.
    #[error("process termination failed")]
    ProcessTerminationFailed {
        /// One failure per image that survived its termination request.
        failed: Vec<ProcessError>,
    },
    /// The storage file is not a JSON object.
    #[error("storage file could not be decoded")]
    DecodeError {
        /// Underlying decode failure.
        source: FsOpsError,
    },
    /// The storage file could not be read.
    #[error("storage file could not be read")]
    IoReadError {
        /// Underlying read failure.
        source: FsOpsError,
    },
    /// The storage file could not be written.
    #[error("storage file could not be written")]
    IoWriteError {
        /// Underlying write failure.
        source: FsOpsError,
    },
    /// The storage file's read-only flag could not be changed.
    #[error("storage file permissions could not be changed")]
    PermissionChangeError {
        /// Underlying permission failure.
        source: FsOpsError,
    },
}

impl RunError {
    /// Classify a failed storage read as a decode or an IO failure.
    #[must_use]
    pub const fn from_read(source: FsOpsError) -> Self {
        if source.is_decode() {
            Self::DecodeError { source }
        } else {
            Self::IoReadError { source }
        }
    }

    /// Storage file path involved in the failure, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::TargetMissing { path } => Some(path),
            Self::DecodeError { source }
            | Self::IoReadError { source }
            | Self::IoWriteError { source }
            | Self::PermissionChangeError { source } => Some(source.path()),
            Self::EnvironmentUnsupported { .. }
            | Self::ProcessScanFailed { .. }
            | Self::ProcessTerminationFailed { .. } => None,
        }
    }

    /// Images whose termination failed; empty for every other variant.
    #[must_use]
    pub fn failed_images(&self) -> Vec<&str> {
        match self {
            Self::ProcessTerminationFailed { failed } => {
                failed.iter().map(ProcessError::image).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// A reset run that stopped before finishing.
///
/// A failure is the run's aborted state: no later step was attempted and
/// nothing done by earlier steps was rolled back.
#[derive(Debug, Error)]
#[error("reset run aborted")]
pub struct RunFailure {
    /// Last stage the run completed before the failing step.
    pub stage: RunStage,
    /// Why the failing step stopped the run.
    #[source]
    pub error: RunError,
}

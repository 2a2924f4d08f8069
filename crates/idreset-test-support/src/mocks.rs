//! Fake OS collaborators that record how the pipeline drove them.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use idreset_fsops::{FileAttributeController, FsOpsError, FsOpsResult, StdFileAttributes};
use idreset_process::{ProcessController, ProcessError, ProcessResult};

/// One call made against [`FakeProcessController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    /// `is_running` was asked about this image.
    Query(String),
    /// `terminate` was asked to kill this image.
    Terminate(String),
}

/// Scripted process table.
///
/// Image names are compared case-insensitively, as on Windows.
#[derive(Debug, Default)]
pub struct FakeProcessController {
    running: Mutex<BTreeSet<String>>,
    unkillable: BTreeSet<String>,
    unqueryable: BTreeSet<String>,
    unspawnable: BTreeSet<String>,
    calls: Mutex<Vec<ProcessCall>>,
}

impl FakeProcessController {
    /// Empty process table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark these images as running.
    #[must_use]
    pub fn with_running<'a>(self, images: impl IntoIterator<Item = &'a str>) -> Self {
        lock(&self.running).extend(images.into_iter().map(str::to_ascii_lowercase));
        self
    }

    /// Make termination of this image fail.
    #[must_use]
    pub fn with_unkillable(mut self, image: &str) -> Self {
        self.unkillable.insert(image.to_ascii_lowercase());
        self
    }

    /// Make process table queries for this image fail.
    #[must_use]
    pub fn with_unqueryable(mut self, image: &str) -> Self {
        self.unqueryable.insert(image.to_ascii_lowercase());
        self
    }

    /// Make the process table helper fail to start when asked about this image.
    #[must_use]
    pub fn with_unspawnable(mut self, image: &str) -> Self {
        self.unspawnable.insert(image.to_ascii_lowercase());
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ProcessCall> {
        lock(&self.calls).clone()
    }

    /// Images passed to `terminate`, in order.
    #[must_use]
    pub fn termination_requests(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ProcessCall::Terminate(image) => Some(image.clone()),
                ProcessCall::Query(_) => None,
            })
            .collect()
    }

    /// Whether the image is still in the scripted table.
    #[must_use]
    pub fn still_running(&self, image: &str) -> bool {
        lock(&self.running).contains(&image.to_ascii_lowercase())
    }
}

impl ProcessController for FakeProcessController {
    fn is_running(&self, image: &str) -> ProcessResult<bool> {
        lock(&self.calls).push(ProcessCall::Query(image.to_string()));
        let key = image.to_ascii_lowercase();
        if self.unspawnable.contains(&key) {
            return Err(ProcessError::Spawn {
                program: "tasklist",
                image: image.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        if self.unqueryable.contains(&key) {
            return Err(ProcessError::QueryFailed {
                image: image.to_string(),
                status: Some(1),
            });
        }
        Ok(lock(&self.running).contains(&key))
    }

    fn terminate(&self, image: &str) -> ProcessResult<()> {
        lock(&self.calls).push(ProcessCall::Terminate(image.to_string()));
        let key = image.to_ascii_lowercase();
        if self.unkillable.contains(&key) {
            return Err(ProcessError::TerminateFailed {
                image: image.to_string(),
                status: Some(1),
            });
        }
        if lock(&self.running).remove(&key) {
            Ok(())
        } else {
            Err(ProcessError::TerminateFailed {
                image: image.to_string(),
                status: Some(128),
            })
        }
    }
}

/// One call made against [`RecordingAttributes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeCall {
    /// Write access was granted.
    MakeWritable(PathBuf),
    /// Write access was removed.
    MakeReadOnly(PathBuf),
}

/// Applies real permission changes through [`StdFileAttributes`] and records them.
#[derive(Debug, Default)]
pub struct RecordingAttributes {
    fail_read_only: bool,
    fail_writable: bool,
    calls: Mutex<Vec<AttributeCall>>,
}

impl RecordingAttributes {
    /// Recorder that applies every change.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `make_read_only` fail with a permission error.
    #[must_use]
    pub const fn failing_read_only(mut self) -> Self {
        self.fail_read_only = true;
        self
    }

    /// Make `make_writable` fail with a permission error.
    #[must_use]
    pub const fn failing_writable(mut self) -> Self {
        self.fail_writable = true;
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<AttributeCall> {
        lock(&self.calls).clone()
    }
}

impl FileAttributeController for RecordingAttributes {
    fn make_writable(&self, path: &Path) -> FsOpsResult<()> {
        lock(&self.calls).push(AttributeCall::MakeWritable(path.to_path_buf()));
        if self.fail_writable {
            return Err(denied("attributes.make_writable", path));
        }
        StdFileAttributes.make_writable(path)
    }

    fn make_read_only(&self, path: &Path) -> FsOpsResult<()> {
        lock(&self.calls).push(AttributeCall::MakeReadOnly(path.to_path_buf()));
        if self.fail_read_only {
            return Err(denied("attributes.make_read_only", path));
        }
        StdFileAttributes.make_read_only(path)
    }
}

fn denied(operation: &'static str, path: &Path) -> FsOpsError {
    FsOpsError::io(
        operation,
        path,
        io::Error::from(io::ErrorKind::PermissionDenied),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

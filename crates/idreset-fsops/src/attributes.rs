//! Owner read/write toggling for the storage file.
//!
//! The read-only flag is a soft deterrent against the editor rewriting its
//! identifiers; the next reset run clears it again before writing.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Capability for changing a file's write permission.
pub trait FileAttributeController {
    /// Grant the owner read and write access.
    ///
    /// # Errors
    ///
    /// Returns an error if the permission change cannot be applied.
    fn make_writable(&self, path: &Path) -> FsOpsResult<()>;

    /// Remove write access so the file becomes read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the permission change cannot be applied.
    fn make_read_only(&self, path: &Path) -> FsOpsResult<()>;
}

impl<T: FileAttributeController + ?Sized> FileAttributeController for &T {
    fn make_writable(&self, path: &Path) -> FsOpsResult<()> {
        (**self).make_writable(path)
    }

    fn make_read_only(&self, path: &Path) -> FsOpsResult<()> {
        (**self).make_read_only(path)
    }
}

/// Attribute controller backed by `std::fs::set_permissions`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileAttributes;

impl FileAttributeController for StdFileAttributes {
    fn make_writable(&self, path: &Path) -> FsOpsResult<()> {
        update_permissions(path, "attributes.make_writable", grant_owner_write)
    }

    fn make_read_only(&self, path: &Path) -> FsOpsResult<()> {
        update_permissions(path, "attributes.make_read_only", revoke_write)
    }
}

/// Whether the file at `path` currently has no write permission.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read.
pub fn is_read_only(path: &Path) -> FsOpsResult<bool> {
    fs::metadata(path)
        .map(|metadata| metadata.permissions().readonly())
        .map_err(|source| FsOpsError::io("attributes.inspect", path, source))
}

fn update_permissions(
    path: &Path,
    operation: &'static str,
    change: fn(&mut fs::Permissions),
) -> FsOpsResult<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|source| FsOpsError::io(operation, path, source))?
        .permissions();
    change(&mut permissions);
    fs::set_permissions(path, permissions)
        .map_err(|source| FsOpsError::io(operation, path, source))?;
    debug!(path = %path.display(), operation, "file permissions updated");
    Ok(())
}

#[cfg(unix)]
fn grant_owner_write(permissions: &mut fs::Permissions) {
    permissions.set_mode(permissions.mode() | 0o600);
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn grant_owner_write(permissions: &mut fs::Permissions) {
    permissions.set_readonly(false);
}

#[cfg(unix)]
fn revoke_write(permissions: &mut fs::Permissions) {
    permissions.set_mode(permissions.mode() & !0o222);
}

#[cfg(not(unix))]
fn revoke_write(permissions: &mut fs::Permissions) {
    permissions.set_readonly(true);
}

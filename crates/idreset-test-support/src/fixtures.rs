//! Storage file, host, and settings fixtures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use idreset_config::defaults::{DEFAULT_APP_NAME, STORAGE_RELATIVE_PATH};
use idreset_config::{HostEnvironment, ResetSettings};

/// Host that passes the platform check with `app_data` as its data root.
#[must_use]
pub fn windows_host(app_data: &Path) -> HostEnvironment {
    HostEnvironment {
        os_family: "windows".to_string(),
        app_data: Some(app_data.to_path_buf()),
    }
}

/// Default settings with the settle delay removed.
#[must_use]
pub fn fast_settings() -> ResetSettings {
    ResetSettings::default().with_settle_delay(Duration::ZERO)
}

/// Where the default settings expect the storage file under `app_data`.
#[must_use]
pub fn storage_path(app_data: &Path) -> PathBuf {
    let mut path = app_data.join(DEFAULT_APP_NAME);
    path.extend(STORAGE_RELATIVE_PATH);
    path
}

/// Write `contents` to the default storage location under `app_data`,
/// creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directories or file cannot be created.
pub fn write_storage_fixture(app_data: &Path, contents: &str) -> io::Result<PathBuf> {
    let path = storage_path(app_data);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

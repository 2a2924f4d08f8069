//! Host environment capture and storage path resolution.
//!
//! # Design
//! - Read process-global state (`FAMILY`, `APPDATA`) exactly once into a value.
//! - Resolution is a pure function of that value and the run settings.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::defaults::{APP_DATA_ENV, STORAGE_RELATIVE_PATH, SUPPORTED_OS_FAMILY};
use crate::error::{ConfigError, ConfigResult};
use crate::model::ResetSettings;

/// Host facts the preflight step depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Operating system family, e.g. `windows` or `unix`.
    pub os_family: String,
    /// Value of the per-user application-data root variable, if set.
    pub app_data: Option<PathBuf>,
}

impl HostEnvironment {
    /// Capture the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            os_family: env::consts::FAMILY.to_string(),
            app_data: env::var_os(APP_DATA_ENV).map(PathBuf::from),
        }
    }

    /// Whether the host runs the OS family the tool supports.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.os_family.eq_ignore_ascii_case(SUPPORTED_OS_FAMILY)
    }
}

/// Resolve the storage file location for this host.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedPlatform`] on a non-Windows host and
/// [`ConfigError::MissingEnv`] when no override is given and the
/// application-data root is unset or empty.
pub fn resolve_storage_path(
    host: &HostEnvironment,
    settings: &ResetSettings,
) -> ConfigResult<PathBuf> {
    if !host.is_supported() {
        return Err(ConfigError::UnsupportedPlatform {
            os_family: host.os_family.clone(),
            required: SUPPORTED_OS_FAMILY,
        });
    }

    if let Some(path) = &settings.storage_path_override {
        debug!(path = %path.display(), "using explicit storage path");
        return Ok(path.clone());
    }

    let root = host
        .app_data
        .as_ref()
        .filter(|root| !root.as_os_str().is_empty())
        .ok_or(ConfigError::MissingEnv { name: APP_DATA_ENV })?;

    let mut path = root.join(&settings.app_name);
    path.extend(STORAGE_RELATIVE_PATH);
    debug!(path = %path.display(), "resolved storage path from application data root");
    Ok(path)
}

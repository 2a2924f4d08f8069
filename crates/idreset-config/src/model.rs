//! Settings consumed by a reset run.

use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{DEFAULT_APP_NAME, DEFAULT_PROCESS_NAMES, DEFAULT_SETTLE_DELAY};

/// Everything a reset run needs beyond the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSettings {
    /// Explicit storage file path; bypasses the application-data lookup.
    pub storage_path_override: Option<PathBuf>,
    /// Application directory name under the application-data root.
    pub app_name: String,
    /// Executable images to scan for and terminate.
    pub process_names: Vec<String>,
    /// Wait applied after processes were terminated.
    pub settle_delay: Duration,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            storage_path_override: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            process_names: DEFAULT_PROCESS_NAMES
                .iter()
                .map(ToString::to_string)
                .collect(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl ResetSettings {
    /// Point the run at an explicit storage file.
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path_override = Some(path.into());
        self
    }

    /// Replace the application directory name.
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Replace the process image list.
    #[must_use]
    pub fn with_process_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.process_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the post-termination settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_windsurf() {
        let settings = ResetSettings::default();
        assert_eq!(settings.app_name, "Windsurf");
        assert_eq!(
            settings.process_names,
            vec!["Windsurf.exe", "Code.exe", "code.exe"]
        );
        assert_eq!(settings.settle_delay, Duration::from_secs(3));
        assert!(settings.storage_path_override.is_none());
    }

    #[test]
    fn builders_replace_fields() {
        let settings = ResetSettings::default()
            .with_storage_path("/tmp/storage.json")
            .with_app_name("Other")
            .with_process_names(["other.exe"])
            .with_settle_delay(Duration::ZERO);
        assert_eq!(
            settings.storage_path_override,
            Some(PathBuf::from("/tmp/storage.json"))
        );
        assert_eq!(settings.app_name, "Other");
        assert_eq!(settings.process_names, vec!["other.exe"]);
        assert_eq!(settings.settle_delay, Duration::ZERO);
    }
}

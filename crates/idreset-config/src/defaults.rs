//! Built-in defaults for a reset run.
//!
//! # Design
//! - Keep every OS-facing constant in one place so tests can see what production uses.
//! - Relative path segments are stored separately so they join portably.

use std::time::Duration;

/// OS family (as reported by `std::env::consts::FAMILY`) the tool supports.
pub const SUPPORTED_OS_FAMILY: &str = "windows";
/// Environment variable holding the per-user application-data root.
pub const APP_DATA_ENV: &str = "APPDATA";
/// Application directory under the application-data root.
pub const DEFAULT_APP_NAME: &str = "Windsurf";
/// Path segments from the application directory to the storage file.
pub const STORAGE_RELATIVE_PATH: &[&str] = &["User", "globalStorage", "storage.json"];
/// Executable images belonging to the editor and its shared runtime.
pub const DEFAULT_PROCESS_NAMES: &[&str] = &["Windsurf.exe", "Code.exe", "code.exe"];
/// Blind wait after termination so the OS can release file handles.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

//! Error types for settings and environment resolution.

use thiserror::Error;

/// Errors raised while resolving the host environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The running operating system family is not supported.
    #[error("unsupported platform")]
    UnsupportedPlatform {
        /// OS family reported by the host.
        os_family: String,
        /// OS family the tool requires.
        required: &'static str,
    },
    /// A required environment variable was missing or empty.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

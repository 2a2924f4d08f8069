#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Run settings and host environment capture for the identifier reset tool.
//!
//! Layout: `defaults.rs` (built-in constants), `model.rs` (`ResetSettings`),
//! `host.rs` (`HostEnvironment` and storage path resolution), `error.rs`.

pub mod defaults;
pub mod error;
pub mod host;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use host::{HostEnvironment, resolve_storage_path};
pub use model::ResetSettings;

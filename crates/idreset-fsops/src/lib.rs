//! Storage file access and permission control.
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

pub mod attributes;
pub mod error;
pub mod storage;

pub use attributes::{FileAttributeController, StdFileAttributes, is_read_only};
pub use error::{FsOpsError, FsOpsResult};
pub use storage::{read_storage, render_storage, write_storage};

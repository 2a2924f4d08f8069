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

//! Process table queries and forced termination by executable image name.
//!
//! Layout: `controller.rs` (the `ProcessController` capability and the
//! `tasklist`/`taskkill` implementation), `error.rs`.

pub mod controller;
pub mod error;

pub use controller::{
    ProcessController, TaskListController, dedupe_image_names, tasklist_reports_image,
};
pub use error::{ProcessError, ProcessResult};

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

//! The identifier reset run: six sequential steps from preflight to lock-down.
//!
//! Layout: `pipeline.rs` (step orchestration), `stage.rs` (run state machine),
//! `reporter.rs` (progress events), `error.rs` (run failure taxonomy).

pub mod error;
pub mod pipeline;
pub mod reporter;
pub mod stage;

pub use error::{RunError, RunFailure};
pub use pipeline::{ResetPipeline, RunReport};
pub use reporter::{RunEvent, RunReporter};
pub use stage::{RunStage, Step};

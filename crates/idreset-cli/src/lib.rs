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
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end that resets the editor's telemetry identifiers.
//!
//! Layout:
//! - `cli.rs`: argument parsing, logging setup, and the interruptible run
//! - `output.rs`: console progress lines and failure diagnostics
//! - `pause.rs`: the press-Enter prompt before exit
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod output;
pub(crate) mod pause;

pub use cli::run;

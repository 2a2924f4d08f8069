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

//! `idreset` entrypoint; all work happens in [`idreset_cli::run`].

/// Runs the reset and exits with its status code.
#[tokio::main]
async fn main() {
    std::process::exit(idreset_cli::run().await);
}

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

//! Telemetry identifier generation and storage document mutation.
//!
//! Layout: `ids.rs` (identifier newtypes and generators), `document.rs`
//! (managed keys and the in-place mutator).

pub mod document;
pub mod ids;

pub use document::{
    IdentifierChange, NOT_SET_MARKER, StorageDocument, TelemetryKey, apply_identifiers,
};
pub use ids::{
    DevDeviceId, HEX_ID_LEN, MachineId, SQM_ID_LEN, SqmId, TelemetryIds, generate_dev_device_id,
    generate_machine_id, generate_sqm_id,
};

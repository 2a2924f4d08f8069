//! Read and write the `storage.json` document.
//!
//! # Design
//! - The whole file is read and decoded at once; there is no partial recovery.
//! - Writes overwrite the file in place with pretty-printed JSON (two-space
//!   indent, non-ASCII kept literal) and no trailing newline.

use std::fs;
use std::io;
use std::path::Path;

use idreset_core::StorageDocument;
use serde_json::Value;
use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};

const UTF8_BOM: char = '\u{feff}';

/// Read and decode the storage document at `path`.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when the file cannot be read or is not UTF-8,
/// [`FsOpsError::Json`] when it is not valid JSON, and
/// [`FsOpsError::NotAnObject`] when the top-level value is not an object.
pub fn read_storage(path: &Path) -> FsOpsResult<StorageDocument> {
    let bytes = fs::read(path).map_err(|source| FsOpsError::io("storage.read", path, source))?;
    let text = String::from_utf8(bytes).map_err(|source| {
        FsOpsError::io(
            "storage.decode_utf8",
            path,
            io::Error::new(io::ErrorKind::InvalidData, source),
        )
    })?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    let value: Value = serde_json::from_str(text)
        .map_err(|source| FsOpsError::json("storage.parse", path, source))?;
    match value {
        Value::Object(document) => {
            debug!(path = %path.display(), keys = document.len(), "storage document decoded");
            Ok(document)
        }
        other => Err(FsOpsError::NotAnObject {
            path: path.to_path_buf(),
            found: json_type_name(&other),
        }),
    }
}

/// Serialise `document` exactly as [`write_storage`] would write it.
///
/// # Errors
///
/// Returns the serializer error; a string-keyed map of JSON values does not
/// produce one in practice.
pub fn render_storage(document: &StorageDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Overwrite the file at `path` with `document`.
///
/// The write is not atomic: the file is truncated and rewritten in place.
///
/// # Errors
///
/// Returns [`FsOpsError::Json`] if serialisation fails and
/// [`FsOpsError::Io`] if the file cannot be written.
pub fn write_storage(path: &Path, document: &StorageDocument) -> FsOpsResult<()> {
    let rendered = render_storage(document)
        .map_err(|source| FsOpsError::json("storage.serialize", path, source))?;
    fs::write(path, rendered.as_bytes())
        .map_err(|source| FsOpsError::io("storage.write", path, source))?;
    debug!(path = %path.display(), bytes = rendered.len(), "storage document written");
    Ok(())
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

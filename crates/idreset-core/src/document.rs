//! Managed telemetry keys and the in-place storage document mutator.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::ids::TelemetryIds;

/// Decoded `storage.json` contents; key order is preserved on write-back.
pub type StorageDocument = Map<String, Value>;

/// Label shown for a managed key that was absent before the run.
pub const NOT_SET_MARKER: &str = "Not set";

/// Keys this tool reads and overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryKey {
    /// `telemetry.machineId`
    MachineId,
    /// `telemetry.sqmId`
    SqmId,
    /// `telemetry.devDeviceId`
    DevDeviceId,
}

impl TelemetryKey {
    /// Every managed key, in reporting order.
    pub const ALL: [Self; 3] = [Self::MachineId, Self::SqmId, Self::DevDeviceId];

    /// JSON key as stored in the document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MachineId => "telemetry.machineId",
            Self::SqmId => "telemetry.sqmId",
            Self::DevDeviceId => "telemetry.devDeviceId",
        }
    }
}

impl TelemetryIds {
    /// Value this set assigns to `key`.
    #[must_use]
    pub fn value_for(&self, key: TelemetryKey) -> &str {
        match key {
            TelemetryKey::MachineId => self.machine_id.as_str(),
            TelemetryKey::SqmId => self.sqm_id.as_str(),
            TelemetryKey::DevDeviceId => self.dev_device_id.as_str(),
        }
    }
}

/// Before/after record for one managed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierChange {
    /// Key that was written.
    pub key: TelemetryKey,
    /// Value present before the run, if any.
    pub previous: Option<Value>,
    /// Value written by the run.
    pub current: String,
}

impl IdentifierChange {
    /// Previous value for display: strings verbatim, other JSON compactly,
    /// absent keys as [`NOT_SET_MARKER`].
    #[must_use]
    pub fn previous_display(&self) -> Cow<'_, str> {
        match &self.previous {
            None => Cow::Borrowed(NOT_SET_MARKER),
            Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

/// Overwrite (or insert) the managed keys with `ids`, leaving every other entry untouched.
///
/// Existing keys keep their position; missing keys are appended in
/// [`TelemetryKey::ALL`] order.
pub fn apply_identifiers(
    document: &mut StorageDocument,
    ids: &TelemetryIds,
) -> Vec<IdentifierChange> {
    TelemetryKey::ALL
        .into_iter()
        .map(|key| {
            let current = ids.value_for(key).to_string();
            let previous =
                document.insert(key.as_str().to_string(), Value::String(current.clone()));
            IdentifierChange {
                key,
                previous,
                current,
            }
        })
        .collect()
}

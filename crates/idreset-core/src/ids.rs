//! Identifier newtypes and their random generators.
//!
//! # Design
//! - Generators take the randomness source as a parameter; nothing here owns an RNG.
//! - Newtypes only construct through the generators, so a value always has the right shape.

use std::fmt::{self, Display, Formatter};

use rand::Rng;
use uuid::Builder;

/// Length of machine and device identifiers.
pub const HEX_ID_LEN: usize = 32;
/// Length of an SQM identifier including its braces.
pub const SQM_ID_LEN: usize = 38;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

macro_rules! identifier_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier, returning its text.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier_newtype!(
    /// 32 lowercase hex characters stored under `telemetry.machineId`.
    MachineId
);
identifier_newtype!(
    /// Braced, upper-case UUID v4 stored under `telemetry.sqmId`.
    SqmId
);
identifier_newtype!(
    /// 32 lowercase hex characters stored under `telemetry.devDeviceId`.
    DevDeviceId
);

/// One freshly generated value for each managed telemetry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryIds {
    /// New `telemetry.machineId` value.
    pub machine_id: MachineId,
    /// New `telemetry.sqmId` value.
    pub sqm_id: SqmId,
    /// New `telemetry.devDeviceId` value.
    pub dev_device_id: DevDeviceId,
}

impl TelemetryIds {
    /// Generate all three identifiers from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            machine_id: generate_machine_id(rng),
            sqm_id: generate_sqm_id(rng),
            dev_device_id: generate_dev_device_id(rng),
        }
    }
}

/// Generate a machine identifier: 32 characters drawn uniformly from `0-9a-f`.
pub fn generate_machine_id<R: Rng + ?Sized>(rng: &mut R) -> MachineId {
    MachineId(random_hex(rng, HEX_ID_LEN))
}

/// Generate a device identifier; same shape as [`generate_machine_id`].
pub fn generate_dev_device_id<R: Rng + ?Sized>(rng: &mut R) -> DevDeviceId {
    DevDeviceId(random_hex(rng, HEX_ID_LEN))
}

/// Generate an SQM identifier such as `{0F3A5C1E-8B2D-4E6F-9A0B-1C2D3E4F5A6B}`.
pub fn generate_sqm_id<R: Rng + ?Sized>(rng: &mut R) -> SqmId {
    let mut bytes = [0_u8; 16];
    rng.fill(&mut bytes);
    let uuid = Builder::from_random_bytes(bytes).into_uuid();
    SqmId(format!("{:X}", uuid.braced()))
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())]))
        .collect()
}

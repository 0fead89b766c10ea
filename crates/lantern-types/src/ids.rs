//! Type-safe identifier wrappers.
//!
//! Entities created by the simulation at runtime (jobs, trucks, vessel
//! calls) get UUID v7 identifiers. Entities authored by hand in the terminal
//! layout or fleet roster (zones, vehicles, containers) keep the operator's
//! string codes, wrapped in their own newtypes so they cannot be mixed up.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around an operator-assigned string code.
macro_rules! define_code {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a string code.
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Borrow the code as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> Self {
                Self(code.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> Self {
                Self(code)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a cargo-moving job.
    JobId
}

define_id! {
    /// Unique identifier for an external road truck visiting the terminal.
    TruckId
}

define_id! {
    /// Unique identifier for a scheduled vessel call.
    VesselId
}

define_code! {
    /// Code of a terminal zone (e.g. `BLOCK_A`, `GATE_IN`).
    ZoneId
}

define_code! {
    /// Fleet number of a piece of terminal equipment (e.g. `RS-201`).
    VehicleId
}

define_code! {
    /// Container number (e.g. `CN12345`).
    ///
    /// Container numbers are matched case-insensitively by yard lookups;
    /// use [`ContainerId::matches`] rather than `==` when searching.
    ContainerId
}

impl ZoneId {
    /// Symbolic zone meaning "any yard block", resolved when a job is assigned.
    pub const YARD: &'static str = "YARD";

    /// Whether this is the symbolic yard zone rather than a real polygon.
    pub fn is_symbolic_yard(&self) -> bool {
        self.0 == Self::YARD
    }
}

impl ContainerId {
    /// Case-insensitive comparison against a container number.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_distinct() {
        let job = JobId::new();
        let truck = TruckId::new();
        assert_ne!(job.into_inner(), Uuid::nil());
        assert_ne!(job.into_inner(), truck.into_inner());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = VesselId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<VesselId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn codes_serialize_as_plain_strings() {
        let zone = ZoneId::from("BLOCK_A");
        let json = serde_json::to_string(&zone).unwrap_or_default();
        assert_eq!(json, "\"BLOCK_A\"");
    }

    #[test]
    fn container_match_ignores_case() {
        let id = ContainerId::from("CN12345");
        assert!(id.matches("cn12345"));
        assert!(!id.matches("CN12346"));
    }

    #[test]
    fn symbolic_yard_detected() {
        assert!(ZoneId::from("YARD").is_symbolic_yard());
        assert!(!ZoneId::from("BLOCK_A").is_symbolic_yard());
    }
}

//! Shared type definitions for the Lantern terminal simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Lantern workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the terminal map front end.
//!
//! # Modules
//!
//! - [`ids`] -- UUID wrappers for runtime entities and string codes for
//!   layout-authored ones
//! - [`enums`] -- Zone, cargo, equipment, job, truck, and vessel enumerations
//! - [`structs`] -- Geometry, layout tables, and core entity structs
//! - [`snapshot`] -- Per-tick read-only view of the whole terminal

pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ContainerType, JobStatus, JobType, ManifestKind, MissionType, TruckStatus, VehicleStatus,
    VehicleType, VesselStatus, ZoneType,
};
pub use ids::{ContainerId, JobId, TruckId, VehicleId, VesselId, ZoneId};
pub use snapshot::{JobStats, TerminalSnapshot, VesselSnapshot};
pub use structs::{
    Container, Job, LatLng, Manifest, Pose, RoadSegment, Truck, Vehicle, VesselCall, Zone,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes bindings for every type with #[ts(export)] to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::JobId::export_all();
        let _ = crate::ids::TruckId::export_all();
        let _ = crate::ids::VesselId::export_all();
        let _ = crate::ids::ZoneId::export_all();
        let _ = crate::ids::VehicleId::export_all();
        let _ = crate::ids::ContainerId::export_all();

        // Enums
        let _ = crate::enums::ZoneType::export_all();
        let _ = crate::enums::ContainerType::export_all();
        let _ = crate::enums::VehicleType::export_all();
        let _ = crate::enums::VehicleStatus::export_all();
        let _ = crate::enums::JobType::export_all();
        let _ = crate::enums::JobStatus::export_all();
        let _ = crate::enums::MissionType::export_all();
        let _ = crate::enums::TruckStatus::export_all();
        let _ = crate::enums::VesselStatus::export_all();
        let _ = crate::enums::ManifestKind::export_all();

        // Structs
        let _ = crate::structs::LatLng::export_all();
        let _ = crate::structs::Pose::export_all();
        let _ = crate::structs::Zone::export_all();
        let _ = crate::structs::RoadSegment::export_all();
        let _ = crate::structs::Container::export_all();
        let _ = crate::structs::Vehicle::export_all();
        let _ = crate::structs::Job::export_all();
        let _ = crate::structs::Truck::export_all();
        let _ = crate::structs::Manifest::export_all();
        let _ = crate::structs::VesselCall::export_all();

        // Snapshot
        let _ = crate::snapshot::JobStats::export_all();
        let _ = crate::snapshot::VesselSnapshot::export_all();
        let _ = crate::snapshot::TerminalSnapshot::export_all();
    }
}

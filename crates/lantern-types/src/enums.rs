//! Enumeration types for the Lantern terminal simulation.
//!
//! Every lifecycle in the simulation is a closed set of states. Statuses
//! that arrive from layout data (zone types) serialize in the upper snake
//! case used by the terminal's zone tables.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// Functional classification of a terminal zone polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ZoneType {
    /// General-purpose container stacking block.
    Standard,
    /// Stacking block with reefer plugs.
    Reefer,
    /// Segregated block for dangerous goods.
    Imo,
    /// Holding area for damaged units.
    Damaged,
    /// Rail-mounted gantry crane runway.
    CraneArea,
    /// Equipment depot where idle vehicles park.
    Depot,
    /// Quay apron alongside the berth.
    Quay,
    /// Rail siding.
    Rail,
    /// Gate, customs, OCR, or highway spawn point.
    Gate,
    /// Office or workshop footprint.
    Building,
    /// Transfer lane where trucks and yard equipment meet.
    Loading,
    /// Internal road surface.
    Road,
    /// Generic asphalt yard surface.
    Yard,
    /// Concrete pad under stacking equipment.
    ConcretePad,
    /// Harbour water.
    Water,
}

impl ZoneType {
    /// Whether grid-mode routing lays nodes inside zones of this type.
    pub const fn is_navigable(self) -> bool {
        matches!(
            self,
            Self::Road | Self::Gate | Self::Loading | Self::Quay | Self::Depot
        )
    }

    /// Whether containers may be stacked in zones of this type.
    pub const fn is_storage(self) -> bool {
        matches!(
            self,
            Self::Standard | Self::Reefer | Self::Imo | Self::Damaged | Self::Depot
        )
    }
}

// ---------------------------------------------------------------------------
// Cargo
// ---------------------------------------------------------------------------

/// Physical kind of a container.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum ContainerType {
    /// Dry box.
    #[default]
    Standard,
    /// Refrigerated unit.
    Reefer,
    /// Dangerous-goods unit.
    Imo,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Kind of terminal-owned vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum VehicleType {
    /// Terminal tractor hauling trailers between quay and yard.
    TerminalTractor,
    /// Reach stacker lifting containers in the yard.
    ReachStacker,
    /// Straddle carrier.
    StraddleCarrier,
}

/// Operational status of a terminal vehicle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum VehicleStatus {
    /// Parked at its home depot.
    #[default]
    Idle,
    /// Deployed to a zone with no job.
    Active,
    /// Driving to a job's pickup zone.
    Assigned,
    /// Lifting or lowering a container.
    Operating,
    /// Carrying a container to a job's drop-off zone.
    Transporting,
    /// Driving back to its home depot.
    Returning,
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Kind of cargo-moving job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum JobType {
    /// Vessel to yard.
    Discharge,
    /// Yard to vessel.
    Load,
    /// Yard to yard.
    Move,
    /// Re-stack within a block.
    Shuffle,
    /// Road truck delivering an export container into the yard.
    TruckExport,
    /// Road truck collecting an import container from the yard.
    TruckImport,
}

/// Lifecycle stage of a job. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum JobStatus {
    /// Waiting for a vehicle.
    #[default]
    Pending,
    /// Vehicle is driving to the source zone.
    Assigned,
    /// Vehicle is lifting the container at the source.
    PickingUp,
    /// Vehicle is carrying the container to the target.
    InProgress,
    /// Vehicle is setting the container down at the target.
    DroppingOff,
    /// Container delivered; kept as history.
    Completed,
}

impl JobStatus {
    /// Whether a vehicle is currently working this job.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Pending | Self::Completed)
    }
}

// ---------------------------------------------------------------------------
// Road trucks
// ---------------------------------------------------------------------------

/// What an external truck came to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MissionType {
    /// Deliver an export container to the yard.
    DropExport,
    /// Collect an import container from the yard.
    PickImport,
}

/// Stage of an external truck's visit, in visiting order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum TruckStatus {
    /// Driving from the highway to inbound customs.
    #[default]
    Inbound,
    /// At inbound customs, then driving on to the OCR portal.
    CustomsIn,
    /// Being scanned at the OCR portal.
    OcrScan,
    /// Driving to the gate-in lane.
    GateQueue,
    /// Document check at gate-in.
    GateCheck,
    /// Driving to the truck transfer lane.
    ToYard,
    /// Parked at the transfer lane while yard equipment works.
    Servicing,
    /// Driving to, and clearing, gate-out.
    Exiting,
    /// Driving to, and clearing, outbound customs.
    CustomsOut,
    /// Driving back to the highway.
    Departing,
    /// Left the terminal. Terminal state.
    Departed,
}

// ---------------------------------------------------------------------------
// Vessels
// ---------------------------------------------------------------------------

/// Status of a vessel call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum VesselStatus {
    /// Scheduled, not yet alongside.
    #[default]
    Inbound,
    /// Alongside and working cargo.
    Berthed,
    /// Cargo operations finished.
    Completed,
    /// Left the berth.
    Departed,
}

/// Which half of a vessel manifest a container belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ManifestKind {
    /// Coming off the vessel.
    Discharge,
    /// Going onto the vessel.
    Load,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_types_use_table_spelling() {
        let json = serde_json::to_string(&ZoneType::CraneArea).unwrap_or_default();
        assert_eq!(json, "\"CRANE_AREA\"");
        let parsed: Result<ZoneType, _> = serde_json::from_str("\"CONCRETE_PAD\"");
        assert_eq!(parsed.ok(), Some(ZoneType::ConcretePad));
    }

    #[test]
    fn navigable_zone_types() {
        assert!(ZoneType::Road.is_navigable());
        assert!(ZoneType::Depot.is_navigable());
        assert!(!ZoneType::Standard.is_navigable());
        assert!(!ZoneType::Water.is_navigable());
    }

    #[test]
    fn job_status_activity() {
        assert!(!JobStatus::Pending.is_active());
        assert!(JobStatus::PickingUp.is_active());
        assert!(!JobStatus::Completed.is_active());
    }

    #[test]
    fn truck_status_order_follows_visit() {
        assert!(TruckStatus::Inbound < TruckStatus::GateCheck);
        assert!(TruckStatus::Servicing < TruckStatus::Departed);
    }
}

//! Core entity structs for the Lantern terminal simulation.
//!
//! Covers geometry primitives, the static layout tables (zones and road
//! segments), cargo, equipment, jobs, road trucks, and vessel calls.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ContainerType, JobStatus, JobType, MissionType, TruckStatus, VehicleStatus, VehicleType,
    VesselStatus, ZoneType,
};
use crate::ids::{ContainerId, JobId, TruckId, VehicleId, VesselId, ZoneId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A vehicle's placement: coordinate plus heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pose {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Heading in degrees clockwise from north.
    pub rotation: f64,
}

impl Pose {
    /// Place at a coordinate with the given heading.
    pub const fn at(point: LatLng, rotation: f64) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            rotation,
        }
    }

    /// The coordinate part of the pose.
    pub const fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Layout tables
// ---------------------------------------------------------------------------

/// A named functional area of the terminal. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Zone code.
    pub id: ZoneId,
    /// Functional classification.
    pub zone_type: ZoneType,
    /// Outline vertices; at least three.
    pub polygon: Vec<LatLng>,
    /// Free-text note from the layout table.
    #[serde(default)]
    pub description: Option<String>,
}

/// One drawn road polyline from the road table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoadSegment {
    /// Polyline vertices in drawing order.
    pub path: Vec<LatLng>,
    /// Traffic flows only in drawing order.
    #[serde(default)]
    pub one_way: bool,
    /// Road classification (`service`, `primary`, `construction`, ...).
    #[serde(default = "default_road_type")]
    pub road_type: String,
}

fn default_road_type() -> String {
    "service".to_owned()
}

// ---------------------------------------------------------------------------
// Cargo
// ---------------------------------------------------------------------------

/// A shipping container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Container {
    /// Container number.
    pub id: ContainerId,
    /// Physical kind.
    pub container_type: ContainerType,
    /// Gross weight in tonnes.
    pub weight_tonnes: u32,
    /// Destination port or consignee code.
    pub destination: String,
}

impl Container {
    /// A standard 10-tonne box with no destination assigned yet.
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            container_type: ContainerType::Standard,
            weight_tonnes: 10,
            destination: "Unset".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// A terminal-owned vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vehicle {
    /// Fleet number.
    pub id: VehicleId,
    /// Kind of equipment.
    pub vehicle_type: VehicleType,
    /// Operational status.
    pub status: VehicleStatus,
    /// Zone the vehicle was last deployed to or worked in.
    pub current_zone: ZoneId,
    /// Depot the vehicle returns to when released.
    pub home_zone: ZoneId,
    /// Placement on the map; `None` while parked without a fix.
    pub position: Option<Pose>,
    /// Job being worked, if any.
    pub assigned_job: Option<JobId>,
    /// Container on the spreader, if any.
    pub carried_container: Option<ContainerId>,
    /// Remaining waypoints of the path being followed.
    pub route: Vec<LatLng>,
}

impl Vehicle {
    /// A vehicle parked idle at its home depot.
    pub fn parked(id: VehicleId, vehicle_type: VehicleType, home_zone: ZoneId) -> Self {
        Self {
            id,
            vehicle_type,
            status: VehicleStatus::Idle,
            current_zone: home_zone.clone(),
            home_zone,
            position: None,
            assigned_job: None,
            carried_container: None,
            route: Vec::new(),
        }
    }

    /// Free for a new job: idle, or deployed without a job.
    pub const fn is_available(&self) -> bool {
        match self.status {
            VehicleStatus::Idle => true,
            VehicleStatus::Active => self.assigned_job.is_none(),
            VehicleStatus::Assigned
            | VehicleStatus::Operating
            | VehicleStatus::Transporting
            | VehicleStatus::Returning => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// A single container move performed by one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Job {
    /// Job identifier.
    pub id: JobId,
    /// Kind of move.
    pub job_type: JobType,
    /// Container being moved.
    pub container_id: ContainerId,
    /// Pickup zone (may be the symbolic `YARD` until assignment).
    pub source_zone: ZoneId,
    /// Drop-off zone (may be the symbolic `YARD` until assignment).
    pub target_zone: ZoneId,
    /// Lifecycle stage.
    pub status: JobStatus,
    /// Vehicle working the job.
    pub assigned_vehicle: Option<VehicleId>,
    /// Simulated creation time.
    pub created_at: DateTime<Utc>,
    /// Simulated completion time.
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Road trucks
// ---------------------------------------------------------------------------

/// An external road truck visiting the terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Truck {
    /// Truck identifier.
    pub id: TruckId,
    /// Licence plate shown on the gate screens.
    pub plate: String,
    /// Container currently on the trailer.
    pub container_id: Option<ContainerId>,
    /// Container the truck came to collect.
    pub target_container_id: Option<ContainerId>,
    /// Purpose of the visit.
    pub mission: MissionType,
    /// Stage of the visit.
    pub status: TruckStatus,
    /// Current coordinate.
    pub position: LatLng,
    /// Heading in degrees clockwise from north.
    pub heading: f64,
    /// Zone the truck is heading for.
    pub target_zone: ZoneId,
    /// Yard job created for this truck at gate check.
    pub assigned_job: Option<JobId>,
    /// Held back this tick by the collision gate.
    pub is_paused: bool,
    /// A timed checkpoint stage is running.
    pub processing: bool,
    /// Remaining waypoints of the path being followed.
    pub route: Vec<LatLng>,
}

// ---------------------------------------------------------------------------
// Vessels
// ---------------------------------------------------------------------------

/// Containers to discharge from and load onto a vessel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Manifest {
    /// Containers coming off the vessel.
    pub discharge: Vec<ContainerId>,
    /// Containers going onto the vessel.
    pub load: Vec<ContainerId>,
}

/// A scheduled vessel visit with its demurrage terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VesselCall {
    /// Call identifier.
    pub id: VesselId,
    /// Vessel name.
    pub name: String,
    /// Estimated time of arrival.
    pub eta: DateTime<Utc>,
    /// Estimated time of departure.
    pub etd: DateTime<Utc>,
    /// Call status.
    pub status: VesselStatus,
    /// Cargo to work.
    pub manifest: Manifest,
    /// Penalty charged per hour past ETD.
    #[ts(as = "String")]
    pub penalty_per_hour: Decimal,
}

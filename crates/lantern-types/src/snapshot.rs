//! Read-only per-tick view handed to renderers and dashboards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{Job, RoadSegment, Truck, Vehicle, VesselCall, Zone};

/// Counts of jobs per lifecycle bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JobStats {
    /// Jobs waiting for a vehicle.
    pub pending: u32,
    /// Jobs a vehicle is working.
    pub active: u32,
    /// Jobs finished.
    pub completed: u32,
}

/// A vessel call together with its demurrage at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VesselSnapshot {
    /// The call.
    pub call: VesselCall,
    /// Penalty accrued so far.
    #[ts(as = "String")]
    pub penalty: Decimal,
}

/// Complete terminal state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TerminalSnapshot {
    /// Tick that produced this snapshot.
    pub tick: u64,
    /// Simulated wall-clock time.
    pub sim_time: DateTime<Utc>,
    /// Terminal equipment.
    pub vehicles: Vec<Vehicle>,
    /// Road trucks, including departed ones.
    pub trucks: Vec<Truck>,
    /// Zone polygons.
    pub zones: Vec<Zone>,
    /// Road polylines.
    pub roads: Vec<RoadSegment>,
    /// All jobs, completed ones included.
    pub jobs: Vec<Job>,
    /// Job counts.
    pub job_stats: JobStats,
    /// Vessel calls with current penalty.
    pub vessels: Vec<VesselSnapshot>,
}

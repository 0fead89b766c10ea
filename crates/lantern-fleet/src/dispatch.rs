//! Vehicle registry and dispatch.
//!
//! [`FleetDispatch`] owns every terminal vehicle. It answers "which free
//! vehicle of this type is closest", places vehicles into zones, sends them
//! home, and moves them along their routes each tick. Job execution mutates
//! vehicles through [`FleetDispatch::vehicle_mut`].

use lantern_types::{LatLng, Pose, Vehicle, VehicleId, VehicleStatus, VehicleType, ZoneId};
use lantern_world::{RoadNetwork, ZoneModel, advance_along, geo, plan_route};
use rand::Rng;
use tracing::{debug, info};

use crate::compatibility::can_operate;
use crate::config::FleetConfig;
use crate::error::FleetError;

/// Terminal vehicle registry.
#[derive(Debug, Clone)]
pub struct FleetDispatch {
    vehicles: Vec<Vehicle>,
    depot_zone: ZoneId,
    speed_mps: f64,
}

impl FleetDispatch {
    /// Create a registry from an explicit vehicle list.
    pub fn new(vehicles: Vec<Vehicle>, depot_zone: ZoneId, speed_mps: f64) -> Self {
        Self {
            vehicles,
            depot_zone,
            speed_mps: speed_mps.max(0.1),
        }
    }

    /// Create the configured starting fleet.
    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.build_fleet(), config.depot(), config.speed_mps)
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// All vehicles in registration order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Look up a vehicle.
    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    /// Look up a vehicle for mutation.
    pub fn vehicle_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| &v.id == id)
    }

    /// Zone vehicles return to.
    pub const fn depot_zone(&self) -> &ZoneId {
        &self.depot_zone
    }

    /// Driving speed in metres per second.
    pub const fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    /// Where a vehicle is, or the depot centroid when it has no fix.
    pub fn origin_of(&self, vehicle: &Vehicle, zones: &ZoneModel) -> Option<LatLng> {
        vehicle
            .position
            .map(|p| p.point())
            .or_else(|| zones.centroid(&self.depot_zone))
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Place a vehicle at a random point inside a zone and mark it Active.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`], [`FleetError::ZoneNotFound`], or
    /// [`FleetError::IncompatibleZone`] when the vehicle type may not work
    /// there.
    pub fn deploy<R: Rng + ?Sized>(
        &mut self,
        id: &VehicleId,
        zone_id: &ZoneId,
        zones: &ZoneModel,
        rng: &mut R,
    ) -> Result<Pose, FleetError> {
        let zone = zones
            .zone(zone_id)
            .ok_or_else(|| FleetError::ZoneNotFound(zone_id.clone()))?;
        let vehicle = self
            .vehicle_mut(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        if !can_operate(vehicle.vehicle_type, zone.zone_type) {
            return Err(FleetError::IncompatibleZone {
                vehicle: id.clone(),
                vehicle_type: vehicle.vehicle_type,
                zone: zone_id.clone(),
                zone_type: zone.zone_type,
            });
        }
        let point = zones
            .random_point_inside(zone_id, rng)
            .ok_or_else(|| FleetError::ZoneNotFound(zone_id.clone()))?;
        let pose = Pose::at(point, rng.random_range(0.0..360.0));

        vehicle.status = VehicleStatus::Active;
        vehicle.current_zone = zone_id.clone();
        vehicle.position = Some(pose);
        vehicle.route.clear();
        info!(vehicle = %id, zone = %zone_id, "Vehicle deployed");
        Ok(pose)
    }

    /// Send a vehicle back to the depot: Idle, no job, no cargo, no fix.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`].
    pub fn recall(&mut self, id: &VehicleId) -> Result<(), FleetError> {
        let depot = self.depot_zone.clone();
        let vehicle = self
            .vehicle_mut(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        vehicle.status = VehicleStatus::Idle;
        vehicle.current_zone = depot;
        vehicle.assigned_job = None;
        vehicle.carried_container = None;
        vehicle.position = None;
        vehicle.route.clear();
        info!(vehicle = %id, "Vehicle recalled to depot");
        Ok(())
    }

    /// Overwrite a vehicle's placement.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`].
    pub fn update_position(&mut self, id: &VehicleId, pose: Pose) -> Result<(), FleetError> {
        let vehicle = self
            .vehicle_mut(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        vehicle.position = Some(pose);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Dispatch queries
    // -------------------------------------------------------------------

    /// Closest available vehicle of a type.
    ///
    /// Only Idle vehicles and Active vehicles without a job qualify.
    /// Vehicles with no fix are measured from the depot centroid. On equal
    /// distance the earlier-registered vehicle wins.
    pub fn find_nearest(
        &self,
        vehicle_type: VehicleType,
        target: LatLng,
        zones: &ZoneModel,
    ) -> Option<&VehicleId> {
        let mut best: Option<(&VehicleId, f64)> = None;
        for v in self
            .vehicles
            .iter()
            .filter(|v| v.vehicle_type == vehicle_type && v.is_available())
        {
            let Some(origin) = self.origin_of(v, zones) else {
                continue;
            };
            let d = geo::distance_meters(origin, target);
            if best.is_none_or(|(_, b)| d < b) {
                best = Some((&v.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Straight-line driving time to a zone centroid, rounded up to whole
    /// seconds.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`] or [`FleetError::ZoneNotFound`] (also
    /// returned when the vehicle has no fix and the depot is unknown).
    pub fn travel_time_seconds(
        &self,
        id: &VehicleId,
        target: &ZoneId,
        zones: &ZoneModel,
    ) -> Result<u32, FleetError> {
        let vehicle = self
            .vehicle(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        let origin = self
            .origin_of(vehicle, zones)
            .ok_or_else(|| FleetError::ZoneNotFound(self.depot_zone.clone()))?;
        let goal = zones
            .centroid(target)
            .ok_or_else(|| FleetError::ZoneNotFound(target.clone()))?;
        Ok(whole_seconds(geo::distance_meters(origin, goal) / self.speed_mps))
    }

    // -------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------

    /// Replace a vehicle's route.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`].
    pub fn set_route(&mut self, id: &VehicleId, route: Vec<LatLng>) -> Result<(), FleetError> {
        let vehicle = self
            .vehicle_mut(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        vehicle.route = route;
        Ok(())
    }

    /// Plan a road route from the vehicle's position to `goal` and follow it.
    ///
    /// A vehicle with no fix is first placed at the depot centroid. Returns
    /// the number of waypoints planned.
    ///
    /// # Errors
    ///
    /// [`FleetError::VehicleNotFound`], or [`FleetError::ZoneNotFound`] when
    /// the vehicle has no fix and the depot is unknown.
    pub fn route_to(
        &mut self,
        id: &VehicleId,
        goal: LatLng,
        network: &RoadNetwork,
        zones: &ZoneModel,
    ) -> Result<usize, FleetError> {
        let depot_centroid = zones.centroid(&self.depot_zone);
        let depot = self.depot_zone.clone();
        let vehicle = self
            .vehicle_mut(id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        let start = match vehicle.position {
            Some(pose) => pose.point(),
            None => {
                let point = depot_centroid.ok_or(FleetError::ZoneNotFound(depot))?;
                vehicle.position = Some(Pose::at(point, 0.0));
                point
            }
        };
        vehicle.route = plan_route(network, start, goal);
        debug!(vehicle = %id, waypoints = vehicle.route.len(), "Vehicle routed");
        Ok(vehicle.route.len())
    }

    /// Move every routed vehicle along its path for `dt_secs` at fleet speed.
    ///
    /// Returns how many vehicles moved.
    pub fn advance(&mut self, dt_secs: f64) -> usize {
        let budget = self.speed_mps * dt_secs.max(0.0);
        let mut moved = 0_usize;
        for vehicle in &mut self.vehicles {
            let Some(pose) = vehicle.position else {
                continue;
            };
            if vehicle.route.is_empty() {
                continue;
            }
            let step = advance_along(pose.point(), &mut vehicle.route, budget);
            vehicle.position = Some(Pose::at(
                step.position,
                step.heading.unwrap_or(pose.rotation),
            ));
            moved = moved.saturating_add(1);
        }
        moved
    }
}

/// Round a non-negative duration up to whole seconds, saturating.
fn whole_seconds(secs: f64) -> u32 {
    let secs = secs.ceil();
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    if secs >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    // Bounded to (0, u32::MAX) above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = secs as u32;
    n
}

//! Container move jobs and their execution by yard vehicles.
//!
//! Every job walks the same linear lifecycle:
//!
//! ```text
//! Pending -> Assigned -> PickingUp -> InProgress -> DroppingOff -> Completed
//! ```
//!
//! Assignment resolves the symbolic `YARD` zone to a concrete block, picks
//! the nearest free reach stacker, and routes it to the source zone.
//! Arrival within the configured radius starts a timed pickup; when it
//! elapses the container is lifted (out of the yard, or off a truck) and
//! the vehicle drives to the target, where a timed dropoff completes the
//! job and releases the vehicle.
//!
//! Trucks are reached through the [`CargoHandoff`] trait so this module has
//! no dependency on the truck scheduler.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lantern_fleet::{FleetDispatch, FleetError};
use lantern_types::{
    Container, ContainerId, Job, JobId, JobStats, JobStatus, JobType, VehicleId, VehicleStatus,
    VehicleType, ZoneId,
};
use lantern_world::{RoadNetwork, YardStore, ZoneModel, geo};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::JobConfig;
use crate::timers::TimerQueue;

/// Vehicle type that executes jobs.
pub const HANDLER_TYPE: VehicleType = VehicleType::ReachStacker;

/// Errors that can occur while assigning jobs.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job does not exist.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// The vehicle does not exist.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// Only pending jobs can be assigned.
    #[error("job {job} is {status:?}, not pending")]
    NotPending {
        /// The job.
        job: JobId,
        /// Its current status.
        status: JobStatus,
    },

    /// The vehicle is busy.
    #[error("vehicle {vehicle} is {status:?} and cannot take a job")]
    VehicleUnavailable {
        /// The vehicle.
        vehicle: VehicleId,
        /// Its current status.
        status: VehicleStatus,
    },

    /// Every vehicle of the handler type is busy.
    #[error("no available {vehicle_type:?} for job {job}")]
    NoVehicleAvailable {
        /// The job left pending.
        job: JobId,
        /// Vehicle type searched for.
        vehicle_type: VehicleType,
    },

    /// A job zone is not part of the layout.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// The fleet rejected a placement or route.
    #[error("fleet error: {source}")]
    Fleet {
        /// The underlying fleet error.
        #[from]
        source: FleetError,
    },
}

/// Container transfer between a yard vehicle and an external truck.
///
/// Implemented by the truck scheduler. Both calls identify the truck by the
/// job it is linked to.
pub trait CargoHandoff {
    /// Take `container` off the truck serving `job`. Returns `false` when no
    /// such truck carries it.
    fn take_from_truck(&mut self, job: JobId, container: &ContainerId) -> bool;

    /// Put `container` on the truck serving `job`. Returns `false` when no
    /// truck is linked to the job.
    fn load_onto_truck(&mut self, job: JobId, container: ContainerId) -> bool;
}

/// A handoff with no trucks, for yard-internal work.
pub struct NoTrucks;

impl CargoHandoff for NoTrucks {
    fn take_from_truck(&mut self, _job: JobId, _container: &ContainerId) -> bool {
        false
    }

    fn load_onto_truck(&mut self, _job: JobId, _container: ContainerId) -> bool {
        false
    }
}

/// World handles job operations read and mutate.
pub struct JobContext<'a> {
    /// Zone registry.
    pub zones: &'a ZoneModel,
    /// Road graph for vehicle routes.
    pub network: &'a RoadNetwork,
    /// Vehicle registry.
    pub fleet: &'a mut FleetDispatch,
    /// Container stacks.
    pub yard: &'a mut YardStore,
    /// Run-wide random source.
    pub rng: &'a mut StdRng,
}

/// Deferred job transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTimer {
    /// The vehicle has finished lifting the container.
    PickupComplete(JobId),
    /// The vehicle has finished setting the container down.
    DropoffComplete(JobId),
}

/// Job registry and executor.
#[derive(Debug, Clone, Default)]
pub struct JobScheduler {
    jobs: Vec<Job>,
    timers: TimerQueue<JobTimer>,
    /// Containers lifted out of the yard, keyed by the job carrying them.
    in_hand: BTreeMap<JobId, Container>,
    config: JobConfig,
}

impl JobScheduler {
    /// Create an empty scheduler.
    pub const fn new(config: JobConfig) -> Self {
        Self {
            jobs: Vec::new(),
            timers: TimerQueue::new(),
            in_hand: BTreeMap::new(),
            config,
        }
    }

    // -------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------

    /// Append a pending job. `source` or `target` may be the symbolic
    /// `YARD` zone.
    pub fn create_job(
        &mut self,
        job_type: JobType,
        container_id: ContainerId,
        source_zone: ZoneId,
        target_zone: ZoneId,
        now: DateTime<Utc>,
    ) -> JobId {
        let id = JobId::new();
        info!(
            job = %id,
            job_type = ?job_type,
            container = %container_id,
            source = %source_zone,
            target = %target_zone,
            "Job created"
        );
        self.jobs.push(Job {
            id,
            job_type,
            container_id,
            source_zone,
            target_zone,
            status: JobStatus::Pending,
            assigned_vehicle: None,
            created_at: now,
            completed_at: None,
        });
        id
    }

    /// Every job ever created, completed ones included, oldest first.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Look up a job.
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Jobs waiting for a vehicle, oldest first.
    pub fn pending_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Pending)
    }

    /// Jobs a vehicle is working on.
    pub fn active_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.status.is_active())
    }

    /// Pending, active, and completed counts.
    pub fn stats(&self) -> JobStats {
        let mut stats = JobStats::default();
        for job in &self.jobs {
            let bucket = match job.status {
                JobStatus::Pending => &mut stats.pending,
                JobStatus::Completed => &mut stats.completed,
                JobStatus::Assigned
                | JobStatus::PickingUp
                | JobStatus::InProgress
                | JobStatus::DroppingOff => &mut stats.active,
            };
            *bucket = bucket.saturating_add(1);
        }
        stats
    }

    // -------------------------------------------------------------------
    // Assignment
    // -------------------------------------------------------------------

    /// Give a pending job to a specific vehicle and send it to the source.
    ///
    /// # Errors
    ///
    /// [`JobError::JobNotFound`], [`JobError::NotPending`],
    /// [`JobError::VehicleNotFound`], [`JobError::VehicleUnavailable`], or
    /// [`JobError::ZoneNotFound`] when a job zone cannot be located. The job
    /// and vehicle are untouched on error, apart from `YARD` resolution.
    pub fn assign_job(
        &mut self,
        job_id: JobId,
        vehicle_id: &VehicleId,
        ctx: &mut JobContext<'_>,
    ) -> Result<(), JobError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or(JobError::JobNotFound(job_id))?;
        if job.status != JobStatus::Pending {
            return Err(JobError::NotPending {
                job: job_id,
                status: job.status,
            });
        }
        let vehicle = ctx
            .fleet
            .vehicle(vehicle_id)
            .ok_or_else(|| JobError::VehicleNotFound(vehicle_id.clone()))?;
        if !vehicle.is_available() {
            return Err(JobError::VehicleUnavailable {
                vehicle: vehicle_id.clone(),
                status: vehicle.status,
            });
        }

        resolve_yard_zones(job, &self.config.yard_blocks, ctx.yard, ctx.rng);
        let source = ctx
            .zones
            .centroid(&job.source_zone)
            .ok_or_else(|| JobError::ZoneNotFound(job.source_zone.clone()))?;
        if !ctx.zones.contains(&job.target_zone) {
            return Err(JobError::ZoneNotFound(job.target_zone.clone()));
        }

        ctx.fleet.route_to(vehicle_id, source, ctx.network, ctx.zones)?;
        let vehicle = ctx
            .fleet
            .vehicle_mut(vehicle_id)
            .ok_or_else(|| JobError::VehicleNotFound(vehicle_id.clone()))?;
        vehicle.status = VehicleStatus::Assigned;
        vehicle.assigned_job = Some(job_id);

        job.status = JobStatus::Assigned;
        job.assigned_vehicle = Some(vehicle_id.clone());
        info!(
            job = %job_id,
            vehicle = %vehicle_id,
            source = %job.source_zone,
            target = %job.target_zone,
            "Job assigned"
        );
        Ok(())
    }

    /// Give a pending job to the nearest free handler.
    ///
    /// # Errors
    ///
    /// [`JobError::NoVehicleAvailable`] when every handler is busy, plus
    /// everything [`assign_job`](Self::assign_job) returns.
    pub fn assign_job_to_nearest(
        &mut self,
        job_id: JobId,
        ctx: &mut JobContext<'_>,
    ) -> Result<VehicleId, JobError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or(JobError::JobNotFound(job_id))?;
        if job.status != JobStatus::Pending {
            return Err(JobError::NotPending {
                job: job_id,
                status: job.status,
            });
        }
        resolve_yard_zones(job, &self.config.yard_blocks, ctx.yard, ctx.rng);
        let source = ctx
            .zones
            .centroid(&job.source_zone)
            .ok_or_else(|| JobError::ZoneNotFound(job.source_zone.clone()))?;

        let vehicle = ctx
            .fleet
            .find_nearest(HANDLER_TYPE, source, ctx.zones)
            .cloned()
            .ok_or(JobError::NoVehicleAvailable {
                job: job_id,
                vehicle_type: HANDLER_TYPE,
            })?;
        self.assign_job(job_id, &vehicle, ctx)?;
        Ok(vehicle)
    }

    /// Try to assign every pending job, oldest first. Returns how many were
    /// assigned. Failures leave the job pending for the next tick.
    pub fn assign_pending_jobs(&mut self, ctx: &mut JobContext<'_>) -> u32 {
        let pending: Vec<JobId> = self.pending_jobs().map(|j| j.id).collect();
        let mut assigned = 0_u32;
        for job_id in pending {
            match self.assign_job_to_nearest(job_id, ctx) {
                Ok(_) => assigned = assigned.saturating_add(1),
                Err(JobError::NoVehicleAvailable { .. }) => {
                    debug!(job = %job_id, "No free handler, job stays pending");
                    break;
                }
                Err(e) => {
                    warn!(job = %job_id, error = %e, "Job assignment failed, job stays pending");
                }
            }
        }
        assigned
    }

    // -------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------

    /// Advance every active job. Returns how many jobs completed.
    ///
    /// Due pickups and dropoffs fire first, then vehicles that reached
    /// their source or target start the next timed stage, then vehicles
    /// returning home are parked.
    pub fn update(
        &mut self,
        now_ms: u64,
        now: DateTime<Utc>,
        ctx: &mut JobContext<'_>,
        cargo: &mut dyn CargoHandoff,
    ) -> u32 {
        let mut completed = 0_u32;

        for timer in self.timers.drain_due(now_ms) {
            match timer {
                JobTimer::PickupComplete(id) => self.finish_pickup(id, ctx, cargo),
                JobTimer::DropoffComplete(id) => {
                    if self.finish_dropoff(id, now, ctx, cargo) {
                        completed = completed.saturating_add(1);
                    }
                }
            }
        }

        self.start_handling(now_ms, ctx);
        park_returning(ctx, self.config.arrival_radius_m);
        completed
    }

    /// Lift a job's container at its source.
    ///
    /// Truck exports take the box off the truck; everything else digs it
    /// out of the yard. A container the yard does not hold is lifted
    /// abstractly and recreated with default attributes at the dropoff.
    ///
    /// # Errors
    ///
    /// [`JobError::JobNotFound`].
    pub fn perform_pickup(
        &mut self,
        job_id: JobId,
        ctx: &mut JobContext<'_>,
        cargo: &mut dyn CargoHandoff,
    ) -> Result<(), JobError> {
        let job = self.job(job_id).ok_or(JobError::JobNotFound(job_id))?;
        let job_type = job.job_type;
        let container_id = job.container_id.clone();
        let vehicle_id = job.assigned_vehicle.clone();

        if job_type == JobType::TruckExport {
            if !cargo.take_from_truck(job_id, &container_id) {
                debug!(job = %job_id, container = %container_id, "No truck holds the container, lifted abstractly");
            }
        } else if let Some(container) = lift_from_yard(ctx, &container_id) {
            self.in_hand.insert(job_id, container);
        }

        if let Some(vehicle) = vehicle_id.as_ref().and_then(|v| ctx.fleet.vehicle_mut(v)) {
            vehicle.carried_container = Some(container_id);
        }
        Ok(())
    }

    /// Set a job's container down at its target.
    ///
    /// Truck imports hand the box to the truck; everything else stows it in
    /// the target zone when that zone stores containers.
    ///
    /// # Errors
    ///
    /// [`JobError::JobNotFound`].
    pub fn perform_dropoff(
        &mut self,
        job_id: JobId,
        ctx: &mut JobContext<'_>,
        cargo: &mut dyn CargoHandoff,
    ) -> Result<(), JobError> {
        let job = self.job(job_id).ok_or(JobError::JobNotFound(job_id))?;
        let job_type = job.job_type;
        let target = job.target_zone.clone();
        let vehicle_id = job.assigned_vehicle.clone();
        let container_id = job.container_id.clone();
        let container = self
            .in_hand
            .remove(&job_id)
            .unwrap_or_else(|| Container::new(container_id));

        if job_type == JobType::TruckImport {
            let id = container.id;
            if !cargo.load_onto_truck(job_id, id.clone()) {
                warn!(job = %job_id, container = %id, "No truck waiting for import container");
            }
        } else {
            stow_in_yard(ctx, container, &target);
        }

        if let Some(vehicle) = vehicle_id.as_ref().and_then(|v| ctx.fleet.vehicle_mut(v)) {
            vehicle.carried_container = None;
        }
        Ok(())
    }

    fn start_handling(&mut self, now_ms: u64, ctx: &mut JobContext<'_>) {
        let radius = self.config.arrival_radius_m;
        for job in &mut self.jobs {
            let goal_zone = match job.status {
                JobStatus::Assigned => &job.source_zone,
                JobStatus::InProgress => &job.target_zone,
                JobStatus::Pending
                | JobStatus::PickingUp
                | JobStatus::DroppingOff
                | JobStatus::Completed => continue,
            };
            let Some(goal) = ctx.zones.centroid(goal_zone) else {
                continue;
            };
            let Some(vehicle) = job
                .assigned_vehicle
                .as_ref()
                .and_then(|v| ctx.fleet.vehicle_mut(v))
            else {
                continue;
            };
            if vehicle.assigned_job != Some(job.id) {
                continue;
            }
            let Some(pose) = vehicle.position else {
                continue;
            };
            if geo::distance_meters(pose.point(), goal) > radius {
                continue;
            }

            vehicle.status = VehicleStatus::Operating;
            vehicle.route.clear();
            if job.status == JobStatus::Assigned {
                job.status = JobStatus::PickingUp;
                self.timers.schedule(
                    now_ms.saturating_add(self.config.pickup_ms),
                    JobTimer::PickupComplete(job.id),
                );
                debug!(job = %job.id, vehicle = %vehicle.id, "Pickup started");
            } else {
                job.status = JobStatus::DroppingOff;
                self.timers.schedule(
                    now_ms.saturating_add(self.config.dropoff_ms),
                    JobTimer::DropoffComplete(job.id),
                );
                debug!(job = %job.id, vehicle = %vehicle.id, "Dropoff started");
            }
        }
    }

    fn finish_pickup(&mut self, job_id: JobId, ctx: &mut JobContext<'_>, cargo: &mut dyn CargoHandoff) {
        let Some(vehicle_id) = self.handling_vehicle(job_id, JobStatus::PickingUp, ctx) else {
            return;
        };
        if let Err(e) = self.perform_pickup(job_id, ctx, cargo) {
            warn!(job = %job_id, error = %e, "Pickup failed");
            return;
        }
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) else {
            return;
        };
        job.status = JobStatus::InProgress;

        if let Some(vehicle) = ctx.fleet.vehicle_mut(&vehicle_id) {
            vehicle.status = VehicleStatus::Transporting;
        }
        match ctx.zones.centroid(&job.target_zone) {
            Some(target) => {
                if let Err(e) = ctx.fleet.route_to(&vehicle_id, target, ctx.network, ctx.zones) {
                    warn!(job = %job_id, error = %e, "Could not route vehicle to target");
                }
            }
            None => warn!(job = %job_id, zone = %job.target_zone, "Target zone vanished"),
        }
        info!(job = %job_id, vehicle = %vehicle_id, container = %job.container_id, "Container picked up");
    }

    fn finish_dropoff(
        &mut self,
        job_id: JobId,
        now: DateTime<Utc>,
        ctx: &mut JobContext<'_>,
        cargo: &mut dyn CargoHandoff,
    ) -> bool {
        let Some(vehicle_id) = self.handling_vehicle(job_id, JobStatus::DroppingOff, ctx) else {
            return false;
        };
        if let Err(e) = self.perform_dropoff(job_id, ctx, cargo) {
            warn!(job = %job_id, error = %e, "Dropoff failed");
            return false;
        }
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) else {
            return false;
        };
        job.status = JobStatus::Completed;
        job.completed_at = Some(now);
        info!(job = %job_id, vehicle = %vehicle_id, container = %job.container_id, "Job completed");

        release_vehicle(ctx, &vehicle_id);
        true
    }

    /// The vehicle still working `job_id` in `status`, if the job has not
    /// moved on and the vehicle has not been reassigned or recalled.
    fn handling_vehicle(
        &self,
        job_id: JobId,
        status: JobStatus,
        ctx: &JobContext<'_>,
    ) -> Option<VehicleId> {
        let job = self.job(job_id)?;
        if job.status != status {
            return None;
        }
        let vehicle_id = job.assigned_vehicle.as_ref()?;
        let vehicle = ctx.fleet.vehicle(vehicle_id)?;
        (vehicle.assigned_job == Some(job_id)).then(|| vehicle_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace symbolic `YARD` zones with concrete blocks.
///
/// A source container already stored in the yard pins the source to its
/// zone; anything else draws a random block.
fn resolve_yard_zones(job: &mut Job, blocks: &[ZoneId], yard: &YardStore, rng: &mut StdRng) {
    if job.source_zone.is_symbolic_yard() {
        let stored = yard
            .find(job.container_id.as_str())
            .map(|(location, _)| location.key.zone);
        if let Some(zone) = stored.or_else(|| random_block(blocks, rng)) {
            job.source_zone = zone;
        }
    }
    if job.target_zone.is_symbolic_yard() {
        if let Some(zone) = random_block(blocks, rng) {
            job.target_zone = zone;
        }
    }
}

fn random_block(blocks: &[ZoneId], rng: &mut StdRng) -> Option<ZoneId> {
    if blocks.is_empty() {
        return None;
    }
    blocks.get(rng.random_range(0..blocks.len())).cloned()
}

fn lift_from_yard(ctx: &mut JobContext<'_>, id: &ContainerId) -> Option<Container> {
    let Some((location, _)) = ctx.yard.find(id.as_str()) else {
        debug!(container = %id, "Container not in yard, lifted abstractly");
        return None;
    };
    let zone = location.key.zone;
    let capacity = ctx.zones.capacity(&zone)?;
    match ctx.yard.retrieve(id, capacity) {
        Ok((container, relocations)) => {
            info!(container = %id, zone = %zone, relocations, "Container dug out of yard");
            Some(container)
        }
        Err(e) => {
            warn!(container = %id, error = %e, "Yard retrieval failed, container lifted abstractly");
            None
        }
    }
}

fn stow_in_yard(ctx: &mut JobContext<'_>, container: Container, zone: &ZoneId) {
    let storage = ctx
        .zones
        .zone(zone)
        .is_some_and(|z| z.zone_type.is_storage());
    if !storage {
        debug!(container = %container.id, zone = %zone, "Container handed off outside the yard");
        return;
    }
    if ctx.yard.find(container.id.as_str()).is_some() {
        warn!(container = %container.id, "Container already stacked, not stowed twice");
        return;
    }
    let Some(capacity) = ctx.zones.capacity(zone) else {
        return;
    };
    let id = container.id.clone();
    match ctx.yard.stow(container, zone, capacity) {
        Ok(location) => info!(
            container = %id,
            zone = %zone,
            bay = location.key.bay,
            row = location.key.row,
            tier = location.tier,
            "Container stowed"
        ),
        Err(e) => warn!(container = %id, error = %e, "Container could not be stowed"),
    }
}

/// Free a vehicle after its job: Idle if already home, otherwise Returning
/// with a route to the home zone.
fn release_vehicle(ctx: &mut JobContext<'_>, vehicle_id: &VehicleId) {
    let Some(vehicle) = ctx.fleet.vehicle_mut(vehicle_id) else {
        return;
    };
    vehicle.assigned_job = None;
    vehicle.carried_container = None;
    let home = vehicle.home_zone.clone();
    let at_home = vehicle.position.is_some_and(|pose| {
        ctx.zones
            .polygon(&home)
            .is_some_and(|polygon| geo::contains_point(pose.point(), polygon))
    });
    let home_centroid = ctx.zones.centroid(&home);

    match (at_home, home_centroid) {
        (false, Some(goal)) => {
            vehicle.status = VehicleStatus::Returning;
            if let Err(e) = ctx.fleet.route_to(vehicle_id, goal, ctx.network, ctx.zones) {
                warn!(vehicle = %vehicle_id, error = %e, "Could not route vehicle home");
            }
        }
        _ => {
            vehicle.status = VehicleStatus::Idle;
            vehicle.route.clear();
        }
    }
}

/// Park Returning vehicles that reached their home zone.
fn park_returning(ctx: &mut JobContext<'_>, radius_m: f64) {
    let returning: Vec<VehicleId> = ctx
        .fleet
        .vehicles()
        .iter()
        .filter(|v| v.status == VehicleStatus::Returning)
        .map(|v| v.id.clone())
        .collect();
    for id in returning {
        let Some(vehicle) = ctx.fleet.vehicle_mut(&id) else {
            continue;
        };
        let Some(home) = ctx.zones.centroid(&vehicle.home_zone) else {
            continue;
        };
        let arrived = vehicle
            .position
            .is_none_or(|pose| geo::distance_meters(pose.point(), home) <= radius_m);
        if arrived || vehicle.route.is_empty() {
            vehicle.status = VehicleStatus::Idle;
            vehicle.current_zone = vehicle.home_zone.clone();
            vehicle.route.clear();
            debug!(vehicle = %id, "Vehicle back home");
        }
    }
}

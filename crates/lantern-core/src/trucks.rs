//! External road trucks and the gate cycle.
//!
//! A truck drives one fixed circuit:
//!
//! ```text
//! Inbound -> CustomsIn -> OcrScan -> GateQueue -> GateCheck -> ToYard
//!   -> Servicing -> Exiting -> CustomsOut -> Departing -> Departed
//! ```
//!
//! Reaching a checkpoint starts a timed stage (the `processing` flag is
//! set and the truck stands still); when its timer fires the truck is sent
//! to the next checkpoint. The gate check creates the truck's job, and
//! servicing ends once a yard vehicle has completed it.
//!
//! Trucks queue behind each other: a truck within the collision radius of
//! another heading for the same zone, and farther from that zone, holds
//! still for the tick.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use lantern_types::{
    ContainerId, JobId, JobStatus, JobType, LatLng, MissionType, Truck, TruckId, TruckStatus,
    ZoneId,
};
use lantern_world::{RoadNetwork, ZoneModel, advance_along, geo, plan_route};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::TruckConfig;
use crate::jobs::{CargoHandoff, JobContext, JobScheduler};
use crate::timers::TimerQueue;

/// Errors that can occur while spawning trucks.
#[derive(Debug, thiserror::Error)]
pub enum TruckError {
    /// Another truck is still standing at the entry point.
    #[error("entry {zone} blocked by a truck {distance_m:.1} m away")]
    EntryBlocked {
        /// The entry zone.
        zone: ZoneId,
        /// Distance of the blocking truck from the entry centroid.
        distance_m: f64,
    },

    /// A gate cycle zone is not part of the layout.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),
}

/// Deferred truck transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruckTimer {
    /// Inbound customs inspection finished.
    CustomsInCleared(TruckId),
    /// OCR scan finished.
    OcrComplete(TruckId),
    /// Inbound gate check finished.
    GateCheckComplete(TruckId),
    /// Outbound gate clearance finished.
    GateExitCleared(TruckId),
    /// Outbound customs inspection finished.
    CustomsOutCleared(TruckId),
}

impl TruckTimer {
    /// The timer that ends `stage`, or `None` for stages the truck drives
    /// through without stopping.
    pub const fn for_stage(stage: TruckStatus, truck: TruckId) -> Option<Self> {
        match stage {
            TruckStatus::CustomsIn => Some(Self::CustomsInCleared(truck)),
            TruckStatus::OcrScan => Some(Self::OcrComplete(truck)),
            TruckStatus::GateCheck => Some(Self::GateCheckComplete(truck)),
            TruckStatus::Exiting => Some(Self::GateExitCleared(truck)),
            TruckStatus::CustomsOut => Some(Self::CustomsOutCleared(truck)),
            TruckStatus::Inbound
            | TruckStatus::GateQueue
            | TruckStatus::ToYard
            | TruckStatus::Servicing
            | TruckStatus::Departing
            | TruckStatus::Departed => None,
        }
    }

    /// Truck the timer belongs to.
    pub const fn truck(self) -> TruckId {
        match self {
            Self::CustomsInCleared(id)
            | Self::OcrComplete(id)
            | Self::GateCheckComplete(id)
            | Self::GateExitCleared(id)
            | Self::CustomsOutCleared(id) => id,
        }
    }

    /// Stage the truck must still be in for the timer to apply.
    pub const fn stage(self) -> TruckStatus {
        match self {
            Self::CustomsInCleared(_) => TruckStatus::CustomsIn,
            Self::OcrComplete(_) => TruckStatus::OcrScan,
            Self::GateCheckComplete(_) => TruckStatus::GateCheck,
            Self::GateExitCleared(_) => TruckStatus::Exiting,
            Self::CustomsOutCleared(_) => TruckStatus::CustomsOut,
        }
    }
}

/// What happened to the trucks during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruckProgress {
    /// Trucks held back by the collision gate.
    pub paused: u32,
    /// Jobs created at the inbound gate.
    pub jobs_created: u32,
    /// Trucks that left the map.
    pub departed: u32,
}

/// Truck registry and gate cycle driver.
#[derive(Debug, Clone, Default)]
pub struct TruckScheduler {
    trucks: Vec<Truck>,
    /// Export containers dropped in the yard, waiting for an import pickup.
    export_queue: VecDeque<ContainerId>,
    timers: TimerQueue<TruckTimer>,
    last_arrival_ms: Option<u64>,
    config: TruckConfig,
}

impl TruckScheduler {
    /// Create an empty scheduler.
    pub const fn new(config: TruckConfig) -> Self {
        Self {
            trucks: Vec::new(),
            export_queue: VecDeque::new(),
            timers: TimerQueue::new(),
            last_arrival_ms: None,
            config,
        }
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Trucks on the map, oldest first. Trucks that departed last tick are
    /// still listed with status Departed.
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// Look up a truck.
    pub fn truck(&self, id: TruckId) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.id == id)
    }

    /// Trucks that have not departed.
    pub fn active_count(&self) -> usize {
        self.trucks
            .iter()
            .filter(|t| t.status != TruckStatus::Departed)
            .count()
    }

    /// Export containers waiting for an import truck.
    pub const fn export_queue(&self) -> &VecDeque<ContainerId> {
        &self.export_queue
    }

    /// Offer a yard container to the next import truck.
    pub fn queue_export(&mut self, container: ContainerId) {
        self.export_queue.push_back(container);
    }

    // -------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------

    /// Bring a truck in at the entry point.
    ///
    /// With no mission given, one is drawn at random. The truck appears at
    /// the entry centroid plus a small random offset.
    ///
    /// # Errors
    ///
    /// [`TruckError::EntryBlocked`] while an active truck is within the
    /// spawn clearance of the entry, or [`TruckError::ZoneNotFound`].
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        mission: Option<MissionType>,
        zones: &ZoneModel,
        network: &RoadNetwork,
        rng: &mut R,
    ) -> Result<TruckId, TruckError> {
        let zone = &self.config.spawn_zone;
        let entry = zones
            .centroid(zone)
            .ok_or_else(|| TruckError::ZoneNotFound(zone.clone()))?;
        let blocker = self
            .trucks
            .iter()
            .filter(|t| t.status != TruckStatus::Departed)
            .map(|t| geo::distance_meters(t.position, entry))
            .find(|&d| d < self.config.spawn_clearance_m);
        if let Some(distance_m) = blocker {
            return Err(TruckError::EntryBlocked {
                zone: zone.clone(),
                distance_m,
            });
        }

        let import_chance = match self.config.import_probability {
            p if p.is_nan() => 0.0,
            p => p.clamp(0.0, 1.0),
        };
        let mission = mission.unwrap_or_else(|| {
            if rng.random_bool(import_chance) {
                MissionType::PickImport
            } else {
                MissionType::DropExport
            }
        });
        let jitter = self.config.spawn_jitter_deg.abs();
        let position = if jitter > 0.0 {
            LatLng::new(
                entry.lat + rng.random_range(-jitter..=jitter),
                entry.lng + rng.random_range(-jitter..=jitter),
            )
        } else {
            entry
        };
        self.spawn_at(mission, position, zones, network, rng)
    }

    /// Place a truck at an exact position, skipping the entry clearance
    /// check. Used to seed scenarios.
    ///
    /// # Errors
    ///
    /// [`TruckError::ZoneNotFound`] when the inbound customs zone is
    /// missing.
    pub fn spawn_at<R: Rng + ?Sized>(
        &mut self,
        mission: MissionType,
        position: LatLng,
        zones: &ZoneModel,
        network: &RoadNetwork,
        rng: &mut R,
    ) -> Result<TruckId, TruckError> {
        let target_zone = self.config.customs_in_zone.clone();
        let goal = zones
            .centroid(&target_zone)
            .ok_or_else(|| TruckError::ZoneNotFound(target_zone.clone()))?;

        let (container_id, target_container_id) = match mission {
            MissionType::DropExport => (
                Some(ContainerId::new(format!(
                    "CN{:05}",
                    rng.random_range(0..100_000_u32)
                ))),
                None,
            ),
            MissionType::PickImport => {
                let target = self.export_queue.pop_front().unwrap_or_else(|| {
                    ContainerId::new(format!("MOCK-IMP-{:04}", rng.random_range(0..10_000_u32)))
                });
                (None, Some(target))
            }
        };

        let id = TruckId::new();
        let plate = format!("GEN-{}", rng.random_range(100..1000_u32));
        info!(
            truck = %id,
            plate = %plate,
            mission = ?mission,
            container = ?container_id,
            target_container = ?target_container_id,
            "Truck arrived"
        );
        self.trucks.push(Truck {
            id,
            plate,
            container_id,
            target_container_id,
            mission,
            status: TruckStatus::Inbound,
            position,
            heading: 0.0,
            target_zone,
            assigned_job: None,
            is_paused: false,
            processing: false,
            route: plan_route(network, position, goal),
        });
        Ok(id)
    }

    /// Spawn a random truck when the arrival interval has elapsed.
    ///
    /// A blocked entry is retried on the next tick.
    pub fn arrivals<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        zones: &ZoneModel,
        network: &RoadNetwork,
        rng: &mut R,
    ) -> Option<TruckId> {
        let interval = self.config.arrival_interval_ms;
        if interval == 0 {
            return None;
        }
        if self
            .last_arrival_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < interval)
        {
            return None;
        }
        let limit = usize::try_from(self.config.max_active).unwrap_or(usize::MAX);
        if self.active_count() >= limit {
            return None;
        }
        match self.spawn(None, zones, network, rng) {
            Ok(id) => {
                self.last_arrival_ms = Some(now_ms);
                Some(id)
            }
            Err(TruckError::EntryBlocked { distance_m, .. }) => {
                debug!(distance_m, "Entry blocked, arrival deferred");
                None
            }
            Err(e) => {
                warn!(error = %e, "Truck arrival failed");
                self.last_arrival_ms = Some(now_ms);
                None
            }
        }
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Advance every truck by one tick of `dt_secs`.
    ///
    /// Trucks that departed on the previous tick are dropped first. The
    /// collision gate is evaluated on start-of-tick positions, then due
    /// timed stages fire, then unpaused trucks move and check arrival.
    pub fn update(
        &mut self,
        now_ms: u64,
        now: DateTime<Utc>,
        dt_secs: f64,
        jobs: &mut JobScheduler,
        ctx: &mut JobContext<'_>,
    ) -> TruckProgress {
        let mut progress = TruckProgress::default();
        self.trucks.retain(|t| t.status != TruckStatus::Departed);

        // --- Collision gate ---
        let paused = self.collision_flags(ctx.zones);

        // --- Timed stages ---
        for timer in self.timers.drain_due(now_ms) {
            if self.apply_timer(timer, now, jobs, ctx) {
                progress.jobs_created = progress.jobs_created.saturating_add(1);
            }
        }

        // --- Movement and arrivals ---
        let budget = self.config.speed_mps * dt_secs.max(0.0);
        let Self {
            trucks,
            export_queue,
            timers,
            config,
            ..
        } = self;
        for (truck, is_paused) in trucks.iter_mut().zip(paused) {
            truck.is_paused = is_paused;
            if is_paused {
                progress.paused = progress.paused.saturating_add(1);
                continue;
            }
            if !truck.route.is_empty() {
                let step = advance_along(truck.position, &mut truck.route, budget);
                truck.position = step.position;
                if let Some(heading) = step.heading {
                    truck.heading = heading;
                }
            }
            if !truck.processing
                && check_arrival(truck, now_ms, config, timers, export_queue, jobs, ctx)
            {
                progress.departed = progress.departed.saturating_add(1);
            }
        }
        progress
    }

    /// One pause flag per truck, in registry order.
    fn collision_flags(&self, zones: &ZoneModel) -> Vec<bool> {
        let radius = self.config.collision_radius_m;
        self.trucks
            .iter()
            .map(|truck| {
                if truck.status == TruckStatus::Departed {
                    return false;
                }
                let Some(goal) = zones.centroid(&truck.target_zone) else {
                    return false;
                };
                let own = geo::distance_meters(truck.position, goal);
                self.trucks.iter().any(|other| {
                    other.id != truck.id
                        && other.status != TruckStatus::Departed
                        && other.target_zone == truck.target_zone
                        && geo::distance_meters(truck.position, other.position) < radius
                        && geo::distance_meters(other.position, goal) < own
                })
            })
            .collect()
    }

    /// Apply a due timed stage. Returns whether a job was created.
    fn apply_timer(
        &mut self,
        timer: TruckTimer,
        now: DateTime<Utc>,
        jobs: &mut JobScheduler,
        ctx: &mut JobContext<'_>,
    ) -> bool {
        let (id, expected) = (timer.truck(), timer.stage());
        let config = &self.config;
        let Some(truck) = self
            .trucks
            .iter_mut()
            .find(|t| t.id == id && t.status == expected && t.processing)
        else {
            debug!(truck = %id, timer = ?timer, "Stale truck timer ignored");
            return false;
        };
        truck.processing = false;

        match timer {
            TruckTimer::CustomsInCleared(_) => {
                retarget(truck, &config.ocr_zone, ctx.zones, ctx.network);
                info!(truck = %id, "Inbound customs cleared");
                false
            }
            TruckTimer::OcrComplete(_) => {
                truck.status = TruckStatus::GateQueue;
                retarget(truck, &config.gate_in_zone, ctx.zones, ctx.network);
                info!(truck = %id, plate = %truck.plate, "OCR scan complete");
                false
            }
            TruckTimer::GateCheckComplete(_) => {
                let job = open_gate_job(truck, &config.service_zone, now, jobs);
                truck.status = TruckStatus::ToYard;
                retarget(truck, &config.service_zone, ctx.zones, ctx.network);
                match jobs.assign_job_to_nearest(job, ctx) {
                    Ok(vehicle) => info!(truck = %id, job = %job, vehicle = %vehicle, "Gate check passed"),
                    Err(e) => warn!(truck = %id, job = %job, error = %e, "Gate job left pending"),
                }
                true
            }
            TruckTimer::GateExitCleared(_) => {
                truck.status = TruckStatus::CustomsOut;
                retarget(truck, &config.customs_out_zone, ctx.zones, ctx.network);
                info!(truck = %id, "Outbound gate cleared");
                false
            }
            TruckTimer::CustomsOutCleared(_) => {
                truck.status = TruckStatus::Departing;
                retarget(truck, &config.despawn_zone, ctx.zones, ctx.network);
                info!(truck = %id, "Outbound customs cleared");
                false
            }
        }
    }
}

impl CargoHandoff for TruckScheduler {
    fn take_from_truck(&mut self, job: JobId, container: &ContainerId) -> bool {
        let Some(truck) = self.trucks.iter_mut().find(|t| t.assigned_job == Some(job)) else {
            return false;
        };
        if truck
            .container_id
            .as_ref()
            .is_some_and(|c| c.matches(container.as_str()))
        {
            truck.container_id = None;
            true
        } else {
            false
        }
    }

    fn load_onto_truck(&mut self, job: JobId, container: ContainerId) -> bool {
        let Some(truck) = self.trucks.iter_mut().find(|t| t.assigned_job == Some(job)) else {
            return false;
        };
        truck.container_id = Some(container);
        true
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Act on a moving truck that may have reached its target zone. Returns
/// whether the truck left the map.
fn check_arrival(
    truck: &mut Truck,
    now_ms: u64,
    config: &TruckConfig,
    timers: &mut TimerQueue<TruckTimer>,
    export_queue: &mut VecDeque<ContainerId>,
    jobs: &JobScheduler,
    ctx: &JobContext<'_>,
) -> bool {
    let Some(goal) = ctx.zones.centroid(&truck.target_zone) else {
        return false;
    };
    let distance = geo::distance_meters(truck.position, goal);
    let arrived = distance <= config.arrival_radius_m;

    match truck.status {
        TruckStatus::Inbound if arrived => {
            begin_stage(truck, TruckStatus::CustomsIn, now_ms, config.customs_ms, timers);
        }
        TruckStatus::CustomsIn if arrived => {
            begin_stage(truck, TruckStatus::OcrScan, now_ms, config.ocr_ms, timers);
        }
        TruckStatus::GateQueue if arrived => {
            begin_stage(truck, TruckStatus::GateCheck, now_ms, config.gate_check_ms, timers);
        }
        TruckStatus::ToYard if distance <= config.yard_arrival_radius_m => {
            truck.status = TruckStatus::Servicing;
            truck.route.clear();
            info!(truck = %truck.id, "Truck at service lane");
        }
        TruckStatus::Servicing => {
            let done = truck
                .assigned_job
                .and_then(|job| jobs.job(job))
                .filter(|job| job.status == JobStatus::Completed);
            if let Some(job) = done {
                settle_payload(truck, job.job_type, &job.container_id, export_queue);
                truck.status = TruckStatus::Exiting;
                retarget(truck, &config.gate_out_zone, ctx.zones, ctx.network);
                info!(truck = %truck.id, "Truck serviced, heading out");
            }
        }
        TruckStatus::Exiting if arrived => {
            begin_stage(truck, TruckStatus::Exiting, now_ms, config.gate_exit_ms, timers);
        }
        TruckStatus::CustomsOut if arrived => {
            begin_stage(truck, TruckStatus::CustomsOut, now_ms, config.customs_ms, timers);
        }
        TruckStatus::Departing if arrived => {
            truck.status = TruckStatus::Departed;
            truck.route.clear();
            info!(truck = %truck.id, plate = %truck.plate, "Truck departed");
            return true;
        }
        _ => {}
    }
    false
}

/// Stop at a checkpoint and schedule the end of its timed stage.
fn begin_stage(
    truck: &mut Truck,
    stage: TruckStatus,
    now_ms: u64,
    duration_ms: u64,
    timers: &mut TimerQueue<TruckTimer>,
) {
    let Some(timer) = TruckTimer::for_stage(stage, truck.id) else {
        warn!(truck = %truck.id, stage = ?stage, "Stage has no timer, not stopping");
        return;
    };
    truck.status = stage;
    truck.processing = true;
    truck.route.clear();
    timers.schedule(now_ms.saturating_add(duration_ms), timer);
    debug!(truck = %truck.id, stage = ?stage, "Timed stage started");
}

/// Point a truck at a new zone and plan its route there.
fn retarget(truck: &mut Truck, zone: &ZoneId, zones: &ZoneModel, network: &RoadNetwork) {
    truck.target_zone = zone.clone();
    truck.route = match zones.centroid(zone) {
        Some(goal) => plan_route(network, truck.position, goal),
        None => {
            warn!(truck = %truck.id, zone = %zone, "Truck target zone missing, truck stays put");
            Vec::new()
        }
    };
}

/// Create the yard job for a truck that passed the gate check.
fn open_gate_job(
    truck: &mut Truck,
    service_zone: &ZoneId,
    now: DateTime<Utc>,
    jobs: &mut JobScheduler,
) -> JobId {
    let yard = ZoneId::from(ZoneId::YARD);
    let (job_type, container, source, target) = match truck.mission {
        MissionType::DropExport => (
            JobType::TruckExport,
            truck.container_id.clone(),
            service_zone.clone(),
            yard,
        ),
        MissionType::PickImport => (
            JobType::TruckImport,
            truck.target_container_id.clone(),
            yard,
            service_zone.clone(),
        ),
    };
    let container =
        container.unwrap_or_else(|| ContainerId::new(format!("UNKNOWN-{}", truck.plate)));
    let job = jobs.create_job(job_type, container, source, target, now);
    truck.assigned_job = Some(job);
    job
}

/// Hand over cargo once the truck's job is complete.
fn settle_payload(
    truck: &mut Truck,
    job_type: JobType,
    container: &ContainerId,
    export_queue: &mut VecDeque<ContainerId>,
) {
    if job_type == JobType::TruckExport {
        export_queue.push_back(container.clone());
        truck.container_id = None;
    } else {
        truck.container_id = truck
            .container_id
            .take()
            .or_else(|| truck.target_container_id.take());
        truck.target_container_id = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lantern_fleet::{FleetConfig, FleetDispatch};
    use lantern_world::{RoutingConfig, YardStore};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::JobConfig;
    use crate::layout::TerminalLayout;

    struct World {
        zones: ZoneModel,
        network: RoadNetwork,
        fleet: FleetDispatch,
        yard: YardStore,
        rng: StdRng,
        jobs: JobScheduler,
    }

    impl World {
        fn new() -> Self {
            let layout = TerminalLayout::builtin();
            let zones = layout.zone_model().unwrap();
            let network = RoadNetwork::build(&zones, &layout.roads, RoutingConfig::default());
            Self {
                zones,
                network,
                fleet: FleetDispatch::from_config(&FleetConfig::default()),
                yard: YardStore::default(),
                rng: StdRng::seed_from_u64(11),
                jobs: JobScheduler::new(JobConfig::default()),
            }
        }

        fn tick(&mut self, trucks: &mut TruckScheduler, tick: u64) -> TruckProgress {
            let mut ctx = JobContext {
                zones: &self.zones,
                network: &self.network,
                fleet: &mut self.fleet,
                yard: &mut self.yard,
                rng: &mut self.rng,
            };
            let now = DateTime::from_timestamp(1_735_711_200, 0).unwrap();
            trucks.update(tick.saturating_mul(1000), now, 1.0, &mut self.jobs, &mut ctx)
        }
    }

    fn config() -> TruckConfig {
        TruckConfig {
            arrival_interval_ms: 0,
            ..TruckConfig::default()
        }
    }

    #[test]
    fn spawn_refused_near_entry() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        trucks
            .spawn(None, &world.zones, &world.network, &mut world.rng)
            .unwrap();
        let second = trucks.spawn(None, &world.zones, &world.network, &mut world.rng);
        assert!(matches!(second, Err(TruckError::EntryBlocked { .. })));
        assert_eq!(trucks.trucks().len(), 1);
    }

    #[test]
    fn spawned_truck_heads_for_customs() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        let id = trucks
            .spawn(
                Some(MissionType::DropExport),
                &world.zones,
                &world.network,
                &mut world.rng,
            )
            .unwrap();
        let truck = trucks.truck(id).unwrap();
        assert_eq!(truck.status, TruckStatus::Inbound);
        assert_eq!(truck.target_zone, ZoneId::from("DOGANA_IN"));
        assert!(truck.container_id.as_ref().unwrap().as_str().starts_with("CN"));
        assert!(truck.plate.starts_with("GEN-"));
        assert!(!truck.route.is_empty());

        let entry = world.zones.centroid(&ZoneId::from("SPAWN_POINT_1")).unwrap();
        // Jitter of 0.000025 degrees is a few metres at most.
        assert!(geo::distance_meters(truck.position, entry) < 5.0);
    }

    #[test]
    fn import_truck_takes_queued_export() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        trucks.queue_export(ContainerId::from("CN00042"));
        let id = trucks
            .spawn(
                Some(MissionType::PickImport),
                &world.zones,
                &world.network,
                &mut world.rng,
            )
            .unwrap();
        let truck = trucks.truck(id).unwrap();
        assert_eq!(truck.target_container_id, Some(ContainerId::from("CN00042")));
        assert_eq!(truck.container_id, None);
        assert!(trucks.export_queue().is_empty());

        let far = world.zones.centroid(&ZoneId::from("GATE_IN")).unwrap();
        let mock = trucks
            .spawn_at(MissionType::PickImport, far, &world.zones, &world.network, &mut world.rng)
            .unwrap();
        let mock_target = trucks.truck(mock).unwrap().target_container_id.clone().unwrap();
        assert!(mock_target.as_str().starts_with("MOCK-IMP-"));
    }

    #[test]
    fn farther_truck_waits_behind_closer_one() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        let customs = world.zones.centroid(&ZoneId::from("DOGANA_IN")).unwrap();
        // Two trucks 10 m apart on the approach, 200 m and 210 m out.
        let near = LatLng::new(customs.lat + 0.001_8, customs.lng);
        let far = LatLng::new(customs.lat + 0.001_89, customs.lng);
        let leader = trucks
            .spawn_at(MissionType::DropExport, near, &world.zones, &world.network, &mut world.rng)
            .unwrap();
        let follower = trucks
            .spawn_at(MissionType::DropExport, far, &world.zones, &world.network, &mut world.rng)
            .unwrap();

        let progress = world.tick(&mut trucks, 1);

        assert_eq!(progress.paused, 1);
        assert!(!trucks.truck(leader).unwrap().is_paused);
        let waiting = trucks.truck(follower).unwrap();
        assert!(waiting.is_paused);
        assert!(geo::distance_meters(waiting.position, far) < f64::EPSILON.sqrt());
    }

    #[test]
    fn inbound_stages_run_in_order() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        let id = trucks
            .spawn(
                Some(MissionType::DropExport),
                &world.zones,
                &world.network,
                &mut world.rng,
            )
            .unwrap();

        let mut seen = vec![TruckStatus::Inbound];
        for tick in 1..=1500 {
            world.tick(&mut trucks, tick);
            let status = trucks.truck(id).unwrap().status;
            if seen.last() != Some(&status) {
                seen.push(status);
            }
            if status == TruckStatus::ToYard {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                TruckStatus::Inbound,
                TruckStatus::CustomsIn,
                TruckStatus::OcrScan,
                TruckStatus::GateQueue,
                TruckStatus::GateCheck,
                TruckStatus::ToYard,
            ]
        );
        let truck = trucks.truck(id).unwrap();
        let job = world.jobs.job(truck.assigned_job.unwrap()).unwrap();
        assert_eq!(job.job_type, JobType::TruckExport);
        assert_eq!(Some(&job.container_id), truck.container_id.as_ref());
        assert_eq!(job.status, JobStatus::Assigned);
    }

    #[test]
    fn every_timed_stage_has_a_matching_timer() {
        let id = TruckId::new();
        let timed = [
            TruckStatus::CustomsIn,
            TruckStatus::OcrScan,
            TruckStatus::GateCheck,
            TruckStatus::Exiting,
            TruckStatus::CustomsOut,
        ];
        for stage in timed {
            let timer = TruckTimer::for_stage(stage, id).unwrap();
            assert_eq!(timer.stage(), stage);
            assert_eq!(timer.truck(), id);
        }
        for stage in [
            TruckStatus::Inbound,
            TruckStatus::GateQueue,
            TruckStatus::ToYard,
            TruckStatus::Servicing,
            TruckStatus::Departing,
            TruckStatus::Departed,
        ] {
            assert!(TruckTimer::for_stage(stage, id).is_none());
        }
    }

    #[test]
    fn nan_import_probability_spawns_exports() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(TruckConfig {
            import_probability: f64::NAN,
            ..config()
        });
        let id = trucks
            .spawn(None, &world.zones, &world.network, &mut world.rng)
            .unwrap();
        assert_eq!(trucks.truck(id).unwrap().mission, MissionType::DropExport);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        let id = trucks
            .spawn(None, &world.zones, &world.network, &mut world.rng)
            .unwrap();
        trucks.timers.schedule(0, TruckTimer::OcrComplete(id));
        world.tick(&mut trucks, 1);
        assert_eq!(trucks.truck(id).unwrap().status, TruckStatus::Inbound);
    }

    #[test]
    fn handoff_matches_linked_job() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(config());
        let id = trucks
            .spawn(
                Some(MissionType::DropExport),
                &world.zones,
                &world.network,
                &mut world.rng,
            )
            .unwrap();
        let job = JobId::new();
        let container = trucks.truck(id).unwrap().container_id.clone().unwrap();
        assert!(!trucks.take_from_truck(job, &container));

        trucks.trucks.first_mut().unwrap().assigned_job = Some(job);
        assert!(!trucks.take_from_truck(job, &ContainerId::from("OTHER")));
        assert!(trucks.take_from_truck(job, &container));
        assert_eq!(trucks.truck(id).unwrap().container_id, None);

        assert!(trucks.load_onto_truck(job, ContainerId::from("IMP1")));
        assert_eq!(
            trucks.truck(id).unwrap().container_id,
            Some(ContainerId::from("IMP1"))
        );
    }

    #[test]
    fn arrivals_respect_interval() {
        let mut world = World::new();
        let mut trucks = TruckScheduler::new(TruckConfig {
            arrival_interval_ms: 60_000,
            ..TruckConfig::default()
        });
        assert!(
            trucks
                .arrivals(0, &world.zones, &world.network, &mut world.rng)
                .is_some()
        );
        assert!(
            trucks
                .arrivals(30_000, &world.zones, &world.network, &mut world.rng)
                .is_none()
        );
        // Move the first truck off the entry so the next one is not blocked.
        trucks.trucks.first_mut().unwrap().position =
            world.zones.centroid(&ZoneId::from("GATE_IN")).unwrap();
        assert!(
            trucks
                .arrivals(60_000, &world.zones, &world.network, &mut world.rng)
                .is_some()
        );
        assert_eq!(trucks.active_count(), 2);
    }
}

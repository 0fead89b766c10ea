//! The complete mutable terminal state and its read-only snapshot.
//!
//! [`TerminalState`] owns every component of a run. Components never reach
//! into each other; the tick cycle borrows disjoint fields and passes them
//! explicitly.

use lantern_fleet::FleetDispatch;
use lantern_ledger::VesselLedger;
use lantern_types::{RoadSegment, TerminalSnapshot};
use lantern_world::{RoadNetwork, YardStore, ZoneModel, seed_yard};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::clock::SimClock;
use crate::config::TerminalConfig;
use crate::jobs::{JobContext, JobScheduler};
use crate::layout::{LayoutError, TerminalLayout};
use crate::trucks::TruckScheduler;

/// Everything a tick reads or mutates.
#[derive(Debug)]
pub struct TerminalState {
    /// Virtual clock.
    pub clock: SimClock,
    /// Zone registry.
    pub zones: ZoneModel,
    /// Road polylines the network was built from.
    pub roads: Vec<RoadSegment>,
    /// Drivable graph. Rebuilt wholesale, never edited in place.
    pub network: RoadNetwork,
    /// Container stacks.
    pub yard: YardStore,
    /// Terminal equipment.
    pub fleet: FleetDispatch,
    /// Container move jobs.
    pub jobs: JobScheduler,
    /// Road trucks.
    pub trucks: TruckScheduler,
    /// Vessel calls and demurrage.
    pub vessels: VesselLedger,
    /// Shared random source, seeded from the world seed.
    pub rng: StdRng,
    /// Simulated milliseconds per tick.
    pub tick_ms: u64,
}

impl TerminalState {
    /// Build the initial state from configuration and a layout.
    ///
    /// The yard is seeded when enabled and every configured vessel call is
    /// scheduled relative to the start time.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::World`] if the zone table is invalid.
    pub fn new(config: &TerminalConfig, layout: TerminalLayout) -> Result<Self, LayoutError> {
        let zones = layout.zone_model()?;
        let network = RoadNetwork::build(&zones, &layout.roads, config.routing.clone());
        let mut rng = StdRng::seed_from_u64(config.world.seed);

        let mut yard = YardStore::new(config.yard.max_tiers);
        let seeded = if config.yard.seed_on_start {
            seed_yard(&zones, &mut yard, &config.yard.seed, &mut rng)
        } else {
            0
        };

        let clock = SimClock::new(config.world.start_time);
        let mut vessels = VesselLedger::new(config.vessels.penalty_per_hour);
        for call in &config.vessels.calls {
            vessels.schedule_vessel(
                &call.name,
                clock.now(),
                call.eta_offset_secs,
                call.duration_secs,
            );
        }

        let fleet = FleetDispatch::from_config(&config.fleet);
        info!(
            terminal = %config.world.name,
            zones = zones.len(),
            nodes = network.node_count(),
            edges = network.edge_count(),
            vehicles = fleet.vehicles().len(),
            containers = seeded,
            vessels = config.vessels.calls.len(),
            "Terminal initialized"
        );

        Ok(Self {
            clock,
            zones,
            roads: layout.roads,
            network,
            yard,
            fleet,
            jobs: JobScheduler::new(config.jobs.clone()),
            trucks: TruckScheduler::new(config.trucks.clone()),
            vessels,
            rng,
            tick_ms: config.simulation.tick_ms,
        })
    }

    /// Replace the road table and rebuild the graph from scratch.
    pub fn rebuild_roads(&mut self, roads: Vec<RoadSegment>) {
        let config = self.network.config().clone();
        self.network = RoadNetwork::build(&self.zones, &roads, config);
        self.roads = roads;
        info!(
            roads = self.roads.len(),
            nodes = self.network.node_count(),
            "Road network rebuilt"
        );
    }

    /// Borrow the pieces job and truck logic work on.
    ///
    /// Returns the context together with the two schedulers so callers can
    /// use all three at once.
    pub fn split(&mut self) -> (JobContext<'_>, &mut JobScheduler, &mut TruckScheduler) {
        let Self {
            zones,
            network,
            yard,
            fleet,
            jobs,
            trucks,
            rng,
            ..
        } = self;
        (
            JobContext {
                zones,
                network,
                fleet,
                yard,
                rng,
            },
            jobs,
            trucks,
        )
    }

    /// Read-only view of the whole terminal at the current tick.
    pub fn snapshot(&self) -> TerminalSnapshot {
        let now = self.clock.now();
        TerminalSnapshot {
            tick: self.clock.tick(),
            sim_time: now,
            vehicles: self.fleet.vehicles().to_vec(),
            trucks: self.trucks.trucks().to_vec(),
            zones: self.zones.zones().cloned().collect(),
            roads: self.roads.clone(),
            jobs: self.jobs.jobs().to_vec(),
            job_stats: self.jobs.stats(),
            vessels: self.vessels.snapshot(now),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lantern_types::{LatLng, VehicleStatus};

    use super::*;
    use crate::config::VesselPlan;

    fn quiet_config() -> TerminalConfig {
        let mut config = TerminalConfig::default();
        config.yard.seed_on_start = false;
        config
    }

    #[test]
    fn builds_default_terminal() {
        let state = TerminalState::new(&quiet_config(), TerminalLayout::builtin()).unwrap();
        assert_eq!(state.clock.tick(), 0);
        assert!(state.network.node_count() > 0);
        assert_eq!(state.fleet.vehicles().len(), 50);
        assert!(
            state
                .fleet
                .vehicles()
                .iter()
                .all(|v| v.status == VehicleStatus::Idle)
        );
        assert!(state.yard.is_empty());
    }

    #[test]
    fn seeding_is_reproducible() {
        let config = TerminalConfig::default();
        let a = TerminalState::new(&config, TerminalLayout::builtin()).unwrap();
        let b = TerminalState::new(&config, TerminalLayout::builtin()).unwrap();
        assert!(!a.yard.is_empty());
        assert_eq!(a.yard.len(), b.yard.len());
    }

    #[test]
    fn configured_vessels_are_scheduled() {
        let mut config = quiet_config();
        config.vessels.calls.push(VesselPlan {
            name: "MSC AURORA".to_owned(),
            eta_offset_secs: 3600,
            duration_secs: 7200,
        });
        let state = TerminalState::new(&config, TerminalLayout::builtin()).unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.vessels.len(), 1);
        let vessel = snapshot.vessels.first().unwrap();
        assert_eq!(vessel.call.name, "MSC AURORA");
        assert_eq!(vessel.penalty, rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn snapshot_reflects_state() {
        let state = TerminalState::new(&quiet_config(), TerminalLayout::builtin()).unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.sim_time, state.clock.epoch());
        assert_eq!(snapshot.zones.len(), state.zones.len());
        assert_eq!(snapshot.roads.len(), state.roads.len());
        assert!(snapshot.trucks.is_empty());
        assert_eq!(snapshot.job_stats, lantern_types::JobStats::default());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"tick\":0"));
    }

    #[test]
    fn rebuild_roads_replaces_graph() {
        let mut state = TerminalState::new(&quiet_config(), TerminalLayout::builtin()).unwrap();
        let before = state.network.node_count();
        state.rebuild_roads(vec![RoadSegment {
            path: vec![LatLng::new(44.406, 8.905), LatLng::new(44.406, 8.906)],
            one_way: false,
            road_type: "service".to_owned(),
        }]);
        assert_eq!(state.roads.len(), 1);
        assert!(state.network.node_count() < before);
    }
}

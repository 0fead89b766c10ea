//! End-to-end scenarios on the built-in Genoa terminal.
//!
//! Each test builds a full [`TerminalState`] and drives it through
//! [`run_tick`] only, the same way the engine does.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use lantern_core::tick::run_tick;
use lantern_core::{TerminalConfig, TerminalLayout, TerminalState};
use lantern_types::{
    ContainerId, JobStatus, JobType, LatLng, MissionType, TruckId, TruckStatus, ZoneId,
};
use rust_decimal::Decimal;

/// Defaults with random arrivals switched off and an empty yard.
fn quiet_config() -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.trucks.arrival_interval_ms = 0;
    config.yard.seed_on_start = false;
    config
}

fn terminal(config: &TerminalConfig) -> TerminalState {
    TerminalState::new(config, TerminalLayout::builtin()).unwrap()
}

fn spawn_export(state: &mut TerminalState) -> TruckId {
    state
        .trucks
        .spawn(
            Some(MissionType::DropExport),
            &state.zones,
            &state.network,
            &mut state.rng,
        )
        .unwrap()
}

#[test]
fn export_truck_completes_full_cycle() {
    let mut state = terminal(&quiet_config());
    let truck_id = spawn_export(&mut state);
    let container: ContainerId = state
        .trucks
        .truck(truck_id)
        .unwrap()
        .container_id
        .clone()
        .unwrap();

    let mut statuses = vec![TruckStatus::Inbound];
    let mut departed_at = None;
    for _ in 0..5000 {
        let summary = run_tick(&mut state).unwrap();
        match state.trucks.truck(truck_id) {
            Some(truck) => {
                if statuses.last() != Some(&truck.status) {
                    statuses.push(truck.status);
                }
            }
            None => {
                departed_at = Some(summary.tick);
                break;
            }
        }
    }

    assert!(departed_at.is_some(), "truck never left: {statuses:?}");
    assert_eq!(
        statuses,
        vec![
            TruckStatus::Inbound,
            TruckStatus::CustomsIn,
            TruckStatus::OcrScan,
            TruckStatus::GateQueue,
            TruckStatus::GateCheck,
            TruckStatus::ToYard,
            TruckStatus::Servicing,
            TruckStatus::Exiting,
            TruckStatus::CustomsOut,
            TruckStatus::Departing,
            TruckStatus::Departed,
        ]
    );

    let (location, stored) = state.yard.find(container.as_str()).unwrap();
    assert!(stored.id.matches(container.as_str()));
    assert!(state.zones.zone(&location.key.zone).unwrap().zone_type.is_storage());
    assert!(state.trucks.export_queue().contains(&container));

    let job = state.jobs.jobs().first().unwrap();
    assert_eq!(job.job_type, JobType::TruckExport);
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());
    assert_eq!(state.jobs.stats().completed, 1);
}

#[test]
fn import_truck_collects_queued_export() {
    let mut state = terminal(&quiet_config());
    let exporter = spawn_export(&mut state);
    let container = state
        .trucks
        .truck(exporter)
        .unwrap()
        .container_id
        .clone()
        .unwrap();

    for _ in 0..5000 {
        run_tick(&mut state).unwrap();
        if state.trucks.truck(exporter).is_none() {
            break;
        }
    }
    assert!(state.trucks.export_queue().contains(&container));

    let importer = state
        .trucks
        .spawn(
            Some(MissionType::PickImport),
            &state.zones,
            &state.network,
            &mut state.rng,
        )
        .unwrap();
    assert!(state.trucks.export_queue().is_empty());

    let mut carried = None;
    for _ in 0..5000 {
        run_tick(&mut state).unwrap();
        let Some(truck) = state.trucks.truck(importer) else {
            break;
        };
        if truck.status == TruckStatus::Exiting {
            carried.clone_from(&truck.container_id);
        }
    }

    assert_eq!(carried, Some(container.clone()));
    assert!(state.yard.find(container.as_str()).is_none());
    assert_eq!(state.jobs.stats().completed, 2);
}

#[test]
fn farther_of_two_close_trucks_is_paused() {
    let mut state = terminal(&quiet_config());
    let customs = state.zones.centroid(&ZoneId::from("DOGANA_IN")).unwrap();
    // 200 m and 210 m north of inbound customs, both heading for it.
    let near = LatLng::new(customs.lat + 0.001_8, customs.lng);
    let far = LatLng::new(customs.lat + 0.001_89, customs.lng);
    for position in [near, far] {
        state
            .trucks
            .spawn_at(
                MissionType::DropExport,
                position,
                &state.zones,
                &state.network,
                &mut state.rng,
            )
            .unwrap();
    }

    let summary = run_tick(&mut state).unwrap();

    assert_eq!(summary.trucks_paused, 1);
    let paused: Vec<bool> = state.trucks.trucks().iter().map(|t| t.is_paused).collect();
    assert_eq!(paused, vec![false, true]);
}

#[test]
fn overdue_vessel_accrues_penalty() {
    let mut config = quiet_config();
    config.simulation.tick_ms = 60_000;
    config.vessels.calls.push(lantern_core::config::VesselPlan {
        name: "MSC AURORA".to_owned(),
        eta_offset_secs: 0,
        duration_secs: 3600,
    });
    let mut state = terminal(&config);

    for _ in 0..120 {
        run_tick(&mut state).unwrap();
    }

    let snapshot = state.snapshot();
    let vessel = snapshot.vessels.first().unwrap();
    assert_eq!(vessel.penalty, Decimal::from(1000));
}

#[test]
fn busy_terminal_keeps_job_links_consistent() {
    let mut config = TerminalConfig::default();
    config.trucks.arrival_interval_ms = 30_000;
    let mut state = terminal(&config);

    for _ in 0..1800 {
        run_tick(&mut state).unwrap();

        for job in state.jobs.jobs() {
            if !job.status.is_active() {
                continue;
            }
            let vehicle_id = job.assigned_vehicle.as_ref().unwrap();
            let vehicle = state.fleet.vehicle(vehicle_id).unwrap();
            assert_eq!(vehicle.assigned_job, Some(job.id));
        }
        for truck in state.trucks.trucks() {
            if truck.status == TruckStatus::Departed {
                continue;
            }
            let goal = state.zones.centroid(&truck.target_zone);
            assert!(goal.is_some(), "truck targets unknown zone {}", truck.target_zone);
        }
    }

    let stats = state.jobs.stats();
    assert!(stats.completed > 0);
    let total = stats
        .pending
        .saturating_add(stats.active)
        .saturating_add(stats.completed);
    assert_eq!(usize::try_from(total).unwrap(), state.jobs.jobs().len());
}

#[test]
fn recalled_handler_leaves_truck_waiting_at_service_lane() {
    let mut state = terminal(&quiet_config());
    let truck_id = spawn_export(&mut state);

    let mut job_id = None;
    for _ in 0..2000 {
        run_tick(&mut state).unwrap();
        job_id = state.trucks.truck(truck_id).unwrap().assigned_job;
        if job_id.is_some() {
            break;
        }
    }
    let job_id = job_id.unwrap();
    let job = state.jobs.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Assigned);
    let vehicle = job.assigned_vehicle.clone().unwrap();
    state.fleet.recall(&vehicle).unwrap();

    for _ in 0..4000 {
        run_tick(&mut state).unwrap();
    }

    // The job is orphaned: never re-queued, never finished.
    let job = state.jobs.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Assigned);
    assert_eq!(job.assigned_vehicle.as_ref(), Some(&vehicle));
    assert_eq!(state.jobs.stats().completed, 0);

    // The truck reaches the service lane and waits there.
    let snapshot = state.snapshot();
    let truck = snapshot.trucks.iter().find(|t| t.id == truck_id).unwrap();
    assert_eq!(truck.status, TruckStatus::Servicing);
    assert_eq!(truck.assigned_job, Some(job_id));
    assert!(truck.container_id.is_some());

    let handler = snapshot.vehicles.iter().find(|v| v.id == vehicle).unwrap();
    assert!(handler.assigned_job.is_none());
    let listed = snapshot.jobs.iter().find(|j| j.id == job_id).unwrap();
    assert_eq!(listed.status, JobStatus::Assigned);
}

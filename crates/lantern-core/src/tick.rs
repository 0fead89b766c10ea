//! Tick cycle: the fixed phase order that drives the terminal.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance the virtual clock by one tick of simulated time.
//!
//! 2. **Arrivals** -- spawn a road truck at the entry when the arrival
//!    interval has elapsed and the entry is clear.
//!
//! 3. **Trucks** -- collision gate, due checkpoint timers, movement, and
//!    arrival transitions. Gate checks create yard jobs here.
//!
//! 4. **Assignment** -- offer every pending job to the nearest free
//!    handler. Jobs nobody can take stay pending for the next tick.
//!
//! 5. **Jobs** -- due pickup and dropoff timers, vehicles reaching their
//!    source or target, returning vehicles parking at home.
//!
//! 6. **Fleet** -- move every routed vehicle along its path.
//!
//! Given the same configuration and seed the cycle is deterministic.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lantern_types::JobStats;
use tracing::debug;

use crate::clock::ClockError;
use crate::terminal::TerminalState;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The virtual clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a completed tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated time at the end of the tick.
    pub sim_time: DateTime<Utc>,
    /// Whether a truck entered the map.
    pub truck_spawned: bool,
    /// Jobs created at the inbound gate.
    pub jobs_created: u32,
    /// Jobs handed to a vehicle.
    pub jobs_assigned: u32,
    /// Jobs finished.
    pub jobs_completed: u32,
    /// Trucks on the map that have not departed.
    pub trucks_active: u32,
    /// Trucks held back by the collision gate.
    pub trucks_paused: u32,
    /// Trucks that left the map.
    pub trucks_departed: u32,
    /// Vehicles that moved along a route.
    pub vehicles_moving: u32,
    /// Job counts at the end of the tick.
    pub job_stats: JobStats,
}

/// Execute one complete tick.
///
/// # Errors
///
/// Returns [`TickError::Clock`] when simulated time can no longer
/// advance. Everything else is recovered inside the phases.
pub fn run_tick(state: &mut TerminalState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = state.clock.advance(state.tick_ms)?;
    let now_ms = state.clock.elapsed_ms();
    let now = state.clock.now();
    let dt_secs = Duration::from_millis(state.tick_ms).as_secs_f64();

    // --- Phase 2: Arrivals ---
    let spawned = state
        .trucks
        .arrivals(now_ms, &state.zones, &state.network, &mut state.rng);

    let (mut ctx, jobs, trucks) = state.split();

    // --- Phase 3: Trucks ---
    let progress = trucks.update(now_ms, now, dt_secs, jobs, &mut ctx);

    // --- Phase 4: Assignment ---
    let jobs_assigned = jobs.assign_pending_jobs(&mut ctx);

    // --- Phase 5: Jobs ---
    let jobs_completed = jobs.update(now_ms, now, &mut ctx, trucks);

    // --- Phase 6: Fleet ---
    let vehicles_moving = ctx.fleet.advance(dt_secs);

    let summary = TickSummary {
        tick,
        sim_time: now,
        truck_spawned: spawned.is_some(),
        jobs_created: progress.jobs_created,
        jobs_assigned,
        jobs_completed,
        trucks_active: u32::try_from(trucks.active_count()).unwrap_or(u32::MAX),
        trucks_paused: progress.paused,
        trucks_departed: progress.departed,
        vehicles_moving: u32::try_from(vehicles_moving).unwrap_or(u32::MAX),
        job_stats: jobs.stats(),
    };
    debug!(
        tick,
        trucks = summary.trucks_active,
        paused = summary.trucks_paused,
        pending = summary.job_stats.pending,
        active = summary.job_stats.active,
        completed = summary.job_stats.completed,
        "Tick complete"
    );
    Ok(summary)
}

//! Simulation loop runner with run controls.
//!
//! [`run_simulation`] drives [`run_tick`] from an async loop with:
//!
//! - **Bounded runs**: stop after `max_ticks`
//! - **Pause/resume** through the shared [`RunControl`]
//! - **Variable speed**: the wall-clock pause between ticks is adjustable
//! - **Clean stop**: a stop request ends the loop before the next tick
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::control::{RunControl, SimulationEndReason};
use crate::terminal::TerminalState;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Front ends use this to pull a [`TerminalSnapshot`] from the state.
///
/// [`TerminalSnapshot`]: lantern_types::TerminalSnapshot
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &TerminalState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &TerminalState) {}
}

/// Logs a one-line progress summary every `every` ticks.
pub struct SummaryLogger {
    every: u64,
}

impl SummaryLogger {
    /// Log every `every` ticks. Zero disables logging.
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl TickCallback for SummaryLogger {
    fn on_tick(&mut self, summary: &TickSummary, _state: &TerminalState) {
        if summary.tick.checked_rem(self.every) != Some(0) {
            return;
        }
        info!(
            tick = summary.tick,
            sim_time = %summary.sim_time,
            trucks = summary.trucks_active,
            paused = summary.trucks_paused,
            pending = summary.job_stats.pending,
            active = summary.job_stats.active,
            completed = summary.job_stats.completed,
            "Terminal status"
        );
    }
}

/// Run the simulation loop until a termination condition is met.
///
/// # Returns
///
/// Returns a [`SimulationResult`] describing why the simulation ended
/// and the final tick summary.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    state: &mut TerminalState,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_ms = state.tick_ms,
        tick_interval_ms = control.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            let reason = SimulationEndReason::OperatorStop;
            control.set_end_reason(reason).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            let reason = SimulationEndReason::MaxTicksReached;
            control.set_end_reason(reason).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            sim_time = %summary.sim_time,
            trucks = summary.trucks_active,
            pending = summary.job_stats.pending,
            active = summary.job_stats.active,
            completed = summary.job_stats.completed,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, TerminalConfig};
    use crate::layout::TerminalLayout;

    fn setup(max_ticks: u64) -> (TerminalState, Arc<RunControl>) {
        let mut config = TerminalConfig::default();
        config.yard.seed_on_start = false;
        let state = TerminalState::new(&config, TerminalLayout::builtin()).unwrap();
        let control = Arc::new(RunControl::new(&SimulationConfig {
            max_ticks,
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        }));
        (state, control)
    }

    /// Counts callback invocations.
    struct Counter(u64);

    impl TickCallback for Counter {
        fn on_tick(&mut self, _summary: &TickSummary, _state: &TerminalState) {
            self.0 = self.0.saturating_add(1);
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let (mut state, control) = setup(5);
        let mut counter = Counter(0);
        let result = run_simulation(&mut state, &control, &mut counter)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert_eq!(counter.0, 5);
        assert_eq!(state.clock.tick(), 5);
        assert_eq!(
            control.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let (mut state, control) = setup(0);
        control.request_stop();
        let result = run_simulation(&mut state, &control, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        log_simulation_end(&result);
    }

    /// Requests a stop once the given tick has run.
    struct StopAt {
        tick: u64,
        control: Arc<RunControl>,
    }

    impl TickCallback for StopAt {
        fn on_tick(&mut self, summary: &TickSummary, _state: &TerminalState) {
            if summary.tick == self.tick {
                self.control.request_stop();
            }
        }
    }

    #[tokio::test]
    async fn stop_from_callback_ends_after_tick() {
        let (mut state, control) = setup(0);
        let mut stopper = StopAt {
            tick: 3,
            control: Arc::clone(&control),
        };
        let result = run_simulation(&mut state, &control, &mut stopper)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(result.final_summary.unwrap().tick, 3);
    }

    #[tokio::test]
    async fn summary_logger_runs() {
        let (mut state, control) = setup(4);
        let mut logger = SummaryLogger::new(2);
        let result = run_simulation(&mut state, &control, &mut logger)
            .await
            .unwrap();
        assert_eq!(result.total_ticks, 4);
    }
}

//! Engine binary for the Lantern terminal simulation.
//!
//! This is the main entry point that wires together configuration, the
//! terminal layout, the tick cycle, and run controls. It runs the
//! simulation loop until the tick limit is reached or the process is
//! interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lantern-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the zone and road tables
//! 4. Build the terminal state (yard, fleet, vessels)
//! 5. Create run controls and hook Ctrl-C to a clean stop
//! 6. Run the simulation loop
//! 7. Log the result and write the final snapshot

mod error;
mod snapshot_callback;

use std::path::Path;
use std::sync::Arc;

use lantern_core::control::RunControl;
use lantern_core::runner;
use lantern_core::{TerminalConfig, TerminalLayout, TerminalState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_callback::SnapshotCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "lantern-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config = load_config(config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("lantern-engine starting");
    if !config_path.exists() {
        info!("Config file not found, using defaults");
    }
    info!(
        terminal = %config.world.name,
        seed = config.world.seed,
        start_time = %config.world.start_time,
        tick_ms = config.simulation.tick_ms,
        tick_interval_ms = config.simulation.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        "Configuration loaded"
    );

    // 3. Load the layout.
    let layout = TerminalLayout::load(config.simulation.layout_path.as_deref())?;
    info!(
        zones = layout.zones.len(),
        roads = layout.roads.len(),
        builtin = config.simulation.layout_path.is_none(),
        "Layout ready"
    );

    // 4. Build the terminal state.
    let mut state = TerminalState::new(&config, layout)?;

    // 5. Create run controls.
    let control = Arc::new(RunControl::new(&config.simulation));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the simulation.
    let snapshot_path = config.simulation.snapshot_path.clone();
    let mut callback = SnapshotCallback::new(
        config.logging.summary_interval_ticks,
        snapshot_path.clone(),
        config.simulation.snapshot_interval_ticks,
    );
    let result = runner::run_simulation(&mut state, &control, &mut callback).await?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    if let Some(path) = snapshot_path {
        let bytes = snapshot_callback::write_snapshot(&path, &state.snapshot())?;
        info!(path = %path.display(), bytes, "Final snapshot written");
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "lantern-engine shutdown complete"
    );

    Ok(())
}

/// Load the terminal configuration.
///
/// Falls back to defaults when the file does not exist. Environment
/// overrides apply either way.
fn load_config(path: &Path) -> Result<TerminalConfig, EngineError> {
    if path.exists() {
        Ok(TerminalConfig::from_file(path)?)
    } else {
        let mut config = TerminalConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

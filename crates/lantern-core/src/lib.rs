//! Virtual clock, scheduling, and tick orchestration for the Lantern
//! terminal simulation.
//!
//! This crate owns the tick cycle that drives the terminal: truck
//! arrivals, the gate cycle, job assignment, job execution, and fleet
//! movement, all against a virtual clock with deferred timed stages.
//!
//! # Modules
//!
//! - [`clock`] -- Virtual clock with tick counter and simulated time.
//! - [`timers`] -- Deferred actions keyed on simulated milliseconds.
//! - [`config`] -- Configuration loading from `lantern-config.yaml` into
//!   strongly-typed structs.
//! - [`layout`] -- Zone and road tables, built-in or from YAML.
//! - [`jobs`] -- [`JobScheduler`]: job lifecycle and execution by yard
//!   vehicles.
//! - [`trucks`] -- [`TruckScheduler`]: the gate cycle for road trucks.
//! - [`terminal`] -- [`TerminalState`] and its read-only snapshot.
//! - [`tick`] -- The phase-ordered tick cycle.
//! - [`control`] -- Shared pause, speed, and stop state.
//! - [`runner`] -- The async loop around the tick cycle.
//!
//! [`JobScheduler`]: jobs::JobScheduler
//! [`TruckScheduler`]: trucks::TruckScheduler
//! [`TerminalState`]: terminal::TerminalState

pub mod clock;
pub mod config;
pub mod control;
pub mod jobs;
pub mod layout;
pub mod runner;
pub mod terminal;
pub mod tick;
pub mod timers;
pub mod trucks;

pub use config::TerminalConfig;
pub use layout::TerminalLayout;
pub use terminal::TerminalState;

//! Terminal vehicle registry and dispatch for the Lantern simulation.
//!
//! Owns the fleet of terminal tractors, reach stackers, and straddle
//! carriers: where they may work, which one is closest to a job, and how
//! they move along routed paths between ticks.
//!
//! # Modules
//!
//! - [`compatibility`] -- Static zone-type rules per vehicle type.
//! - [`config`] -- Fleet composition and speed ([`FleetConfig`]).
//! - [`dispatch`] -- The vehicle registry ([`FleetDispatch`]).
//! - [`error`] -- Error types for fleet operations ([`FleetError`]).

pub mod compatibility;
pub mod config;
pub mod dispatch;
pub mod error;

// Re-export primary types at crate root for convenience.
pub use compatibility::{allowed_zone_types, can_operate};
pub use config::FleetConfig;
pub use dispatch::FleetDispatch;
pub use error::FleetError;

//! Terminal geometry, road routing, and yard storage for the Lantern simulation.
//!
//! This crate models the physical terminal: named zone polygons with
//! distance and containment primitives, a drivable road graph with an A*
//! router, constant-speed travel along routed waypoints, and the stacked
//! container yard.
//!
//! # Modules
//!
//! - [`error`] -- Error types for zone, routing, and yard operations.
//! - [`geo`] -- Haversine distance, ray-casting containment, centroids,
//!   bearings.
//! - [`zones`] -- [`ZoneModel`] registry with slot capacity and random
//!   interior points.
//! - [`spatial`] -- Uniform grid hash used to snap points onto the graph.
//! - [`road_network`] -- [`RoadNetwork`] built from road polylines or a
//!   zone lattice, with A* path search.
//! - [`travel`] -- Route planning with straight-line fallback and
//!   per-tick advancement along waypoints.
//! - [`yard`] -- [`YardStore`] LIFO stacks with digging penalty.
//! - [`starting_layout`] -- Default Genoa terminal layout and yard seeding.

pub mod error;
pub mod geo;
pub mod road_network;
pub mod spatial;
pub mod starting_layout;
pub mod travel;
pub mod yard;
pub mod zones;

// Re-export primary types at crate root.
pub use error::{RouteError, WorldError, YardError};
pub use road_network::{GraphMode, NodeId, RoadNetwork, RoutePlan, RoutingConfig};
pub use starting_layout::{SeedOptions, default_roads, default_zones, seed_yard};
pub use travel::{Step, advance_along, plan_route};
pub use yard::{DEFAULT_MAX_TIERS, StackKey, YardLocation, YardStore};
pub use zones::{ZoneCapacity, ZoneModel};

//! Error types for the `lantern-world` crate.
//!
//! Zone registry failures are [`WorldError`], routing failures are
//! [`RouteError`], and stack operations fail with [`YardError`].

use lantern_types::{ContainerId, ZoneId};

/// Errors raised while registering or querying zones.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The zone is not registered.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// A zone with this code is already registered.
    #[error("zone already registered: {0}")]
    DuplicateZone(ZoneId),

    /// The zone outline has too few vertices to enclose an area.
    #[error("zone {zone} has {vertices} vertices, at least 3 required")]
    DegeneratePolygon {
        /// The rejected zone.
        zone: ZoneId,
        /// Number of vertices supplied.
        vertices: usize,
    },
}

/// Errors raised by path queries.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The network has no nodes to snap to.
    #[error("road network is empty")]
    EmptyNetwork,

    /// The destination zone is not registered.
    #[error("destination zone not found: {0}")]
    UnknownZone(ZoneId),

    /// No directed path connects the snapped endpoints.
    #[error("no path from node {from} to node {to}")]
    Unreachable {
        /// Snapped start node.
        from: u32,
        /// Snapped goal node.
        to: u32,
    },

    /// The search was abandoned after the expansion cap.
    #[error("path search abandoned after {expansions} expansions")]
    SearchLimit {
        /// Expansions performed.
        expansions: u32,
    },
}

/// Errors raised by yard stack operations.
#[derive(Debug, thiserror::Error)]
pub enum YardError {
    /// The destination stack is at the tier limit.
    #[error("stack {zone}/{bay}/{row} is full ({max_tiers} tiers)")]
    StackFull {
        /// Zone of the full stack.
        zone: ZoneId,
        /// Bay of the full stack.
        bay: u32,
        /// Row of the full stack.
        row: u32,
        /// Tier limit.
        max_tiers: usize,
    },

    /// The source stack holds no containers.
    #[error("stack {zone}/{bay}/{row} is empty")]
    SourceEmpty {
        /// Zone of the empty stack.
        zone: ZoneId,
        /// Bay of the empty stack.
        bay: u32,
        /// Row of the empty stack.
        row: u32,
    },

    /// Source and destination name the same stack.
    #[error("cannot move a container onto its own stack")]
    SameStack,

    /// The container is not stored anywhere in the yard.
    #[error("container not in yard: {0}")]
    ContainerNotFound(ContainerId),

    /// Every stack of the zone is at the tier limit.
    #[error("no free slot in zone {0}")]
    ZoneFull(ZoneId),
}

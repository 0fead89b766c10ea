//! Error types for the lantern-fleet crate.

use lantern_types::{VehicleId, VehicleType, ZoneId, ZoneType};

/// Errors that can occur during fleet operations.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// No vehicle with this fleet number.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// The zone is not registered in the layout.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// The vehicle type may not operate in this kind of zone.
    #[error("{vehicle} ({vehicle_type:?}) cannot operate in {zone} ({zone_type:?})")]
    IncompatibleZone {
        /// Vehicle that was refused.
        vehicle: VehicleId,
        /// Its equipment type.
        vehicle_type: VehicleType,
        /// Requested zone.
        zone: ZoneId,
        /// Type of the requested zone.
        zone_type: ZoneType,
    },
}

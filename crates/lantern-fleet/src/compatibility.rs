//! Which zone types each kind of equipment may work in.

use lantern_types::{VehicleType, ZoneType};

/// Zone types a terminal tractor may enter.
const TRACTOR_ZONES: &[ZoneType] = &[
    ZoneType::Quay,
    ZoneType::Road,
    ZoneType::Gate,
    ZoneType::ConcretePad,
    ZoneType::Loading,
    ZoneType::Depot,
];

/// Zone types a yard handler (reach stacker or straddle carrier) may enter.
const YARD_HANDLER_ZONES: &[ZoneType] = &[
    ZoneType::Yard,
    ZoneType::ConcretePad,
    ZoneType::Road,
    ZoneType::Loading,
    ZoneType::Depot,
    ZoneType::Standard,
    ZoneType::Reefer,
    ZoneType::Imo,
    ZoneType::Damaged,
];

/// Every zone type the vehicle type may operate in.
pub const fn allowed_zone_types(vehicle_type: VehicleType) -> &'static [ZoneType] {
    match vehicle_type {
        VehicleType::TerminalTractor => TRACTOR_ZONES,
        VehicleType::ReachStacker | VehicleType::StraddleCarrier => YARD_HANDLER_ZONES,
    }
}

/// Whether the vehicle type may operate in the zone type.
pub fn can_operate(vehicle_type: VehicleType, zone_type: ZoneType) -> bool {
    allowed_zone_types(vehicle_type).contains(&zone_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tractors_work_the_quay_not_the_blocks() {
        assert!(can_operate(VehicleType::TerminalTractor, ZoneType::Quay));
        assert!(can_operate(VehicleType::TerminalTractor, ZoneType::Gate));
        assert!(!can_operate(VehicleType::TerminalTractor, ZoneType::Standard));
        assert!(!can_operate(VehicleType::TerminalTractor, ZoneType::Reefer));
    }

    #[test]
    fn yard_handlers_share_one_table() {
        for zone_type in [ZoneType::Standard, ZoneType::Imo, ZoneType::Damaged, ZoneType::Depot] {
            assert!(can_operate(VehicleType::ReachStacker, zone_type));
            assert!(can_operate(VehicleType::StraddleCarrier, zone_type));
        }
        assert!(!can_operate(VehicleType::ReachStacker, ZoneType::Quay));
        assert!(!can_operate(VehicleType::StraddleCarrier, ZoneType::Water));
    }

    #[test]
    fn nobody_drives_into_buildings() {
        for vehicle_type in [
            VehicleType::TerminalTractor,
            VehicleType::ReachStacker,
            VehicleType::StraddleCarrier,
        ] {
            assert!(!can_operate(vehicle_type, ZoneType::Building));
            assert!(!can_operate(vehicle_type, ZoneType::Rail));
        }
    }
}

//! Fleet composition and driving parameters.
//!
//! Loaded from the `fleet` section of `lantern-config.yaml`. Every field
//! has a default so a partial section is valid.

use lantern_types::{Vehicle, VehicleId, VehicleType, ZoneId};
use serde::Deserialize;

/// Fleet size, numbering, and speed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FleetConfig {
    /// Terminal tractors, numbered `R-101` upwards.
    #[serde(default = "default_terminal_tractors")]
    pub terminal_tractors: u32,

    /// Reach stackers, numbered `RS-201` upwards.
    #[serde(default = "default_reach_stackers")]
    pub reach_stackers: u32,

    /// Straddle carriers, numbered `SC-301` upwards.
    #[serde(default)]
    pub straddle_carriers: u32,

    /// Driving speed in metres per second (about 30 km/h).
    #[serde(default = "default_speed_mps")]
    pub speed_mps: f64,

    /// Zone every vehicle is parked in and returns to.
    #[serde(default = "default_depot_zone")]
    pub depot_zone: String,
}

const fn default_terminal_tractors() -> u32 {
    25
}

const fn default_reach_stackers() -> u32 {
    25
}

const fn default_speed_mps() -> f64 {
    8.33
}

fn default_depot_zone() -> String {
    "DEPOT_RALLE".to_owned()
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            terminal_tractors: default_terminal_tractors(),
            reach_stackers: default_reach_stackers(),
            straddle_carriers: 0,
            speed_mps: default_speed_mps(),
            depot_zone: default_depot_zone(),
        }
    }
}

impl FleetConfig {
    /// Depot zone as a typed code.
    pub fn depot(&self) -> ZoneId {
        ZoneId::new(self.depot_zone.as_str())
    }

    /// Build the starting fleet, every vehicle parked idle at the depot.
    pub fn build_fleet(&self) -> Vec<Vehicle> {
        let depot = self.depot();
        let groups = [
            ("R", 100_u32, self.terminal_tractors, VehicleType::TerminalTractor),
            ("RS", 200, self.reach_stackers, VehicleType::ReachStacker),
            ("SC", 300, self.straddle_carriers, VehicleType::StraddleCarrier),
        ];
        groups
            .into_iter()
            .flat_map(|(prefix, base, count, vehicle_type)| {
                let depot = depot.clone();
                (1..=count).map(move |n| {
                    let id = VehicleId::new(format!("{prefix}-{}", base.saturating_add(n)));
                    Vehicle::parked(id, vehicle_type, depot.clone())
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_fleet_numbering() {
        let fleet = FleetConfig::default().build_fleet();
        assert_eq!(fleet.len(), 50);
        let ids: Vec<&str> = fleet.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"R-101"));
        assert!(ids.contains(&"R-125"));
        assert!(ids.contains(&"RS-201"));
        assert_eq!(ids.last(), Some(&"RS-225"));
        assert!(fleet.iter().all(|v| v.home_zone.as_str() == "DEPOT_RALLE"));
    }

    #[test]
    fn straddle_carriers_are_optional() {
        let config = FleetConfig {
            straddle_carriers: 2,
            ..FleetConfig::default()
        };
        let fleet = config.build_fleet();
        let carriers: Vec<&str> = fleet
            .iter()
            .filter(|v| v.vehicle_type == VehicleType::StraddleCarrier)
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(carriers, vec!["SC-301", "SC-302"]);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: FleetConfig = serde_yml::from_str("reach_stackers: 3\n").unwrap();
        assert_eq!(config.reach_stackers, 3);
        assert_eq!(config.terminal_tractors, 25);
        assert!((config.speed_mps - 8.33).abs() < f64::EPSILON);
    }
}

//! Configuration loading and typed config structures for the Lantern
//! simulation.
//!
//! The canonical configuration lives in `lantern-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure. Every field has a default, so a missing file, a missing
//! section, or a missing key all fall back to the stock Genoa terminal
//! settings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lantern_fleet::FleetConfig;
use lantern_types::ZoneId;
use lantern_world::{RoutingConfig, SeedOptions};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level terminal configuration.
///
/// Mirrors the structure of `lantern-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TerminalConfig {
    /// Run identity, random seed, and simulated start time.
    #[serde(default)]
    pub world: WorldConfig,

    /// Vehicle fleet composition and speed.
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Yard stacking limits and initial fill.
    #[serde(default)]
    pub yard: YardConfig,

    /// Road graph construction and path search.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Job execution timings.
    #[serde(default)]
    pub jobs: JobConfig,

    /// Truck gate cycle zones, timings, and arrivals.
    #[serde(default)]
    pub trucks: TruckConfig,

    /// Vessel calls and demurrage.
    #[serde(default)]
    pub vessels: VesselConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tick size and run bounds.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl TerminalConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `LANTERN_SEED` overrides `world.seed`
    /// - `LANTERN_LAYOUT` overrides `simulation.layout_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the simulation misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("trucks.import_probability", self.trucks.import_probability)?;
        check_probability("yard.seed.fill_rate", self.yard.seed.fill_rate)?;
        check_probability("yard.seed.second_tier_rate", self.yard.seed.second_tier_rate)?;

        let distances = [
            ("trucks.speed_mps", self.trucks.speed_mps),
            ("trucks.arrival_radius_m", self.trucks.arrival_radius_m),
            ("trucks.yard_arrival_radius_m", self.trucks.yard_arrival_radius_m),
            ("trucks.spawn_clearance_m", self.trucks.spawn_clearance_m),
            ("trucks.collision_radius_m", self.trucks.collision_radius_m),
            ("trucks.spawn_jitter_deg", self.trucks.spawn_jitter_deg),
            ("jobs.arrival_radius_m", self.jobs.arrival_radius_m),
            ("fleet.speed_mps", self.fleet.speed_mps),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Override selected values with environment variables when set.
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("LANTERN_SEED")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.world.seed = seed;
        }
        if let Ok(path) = std::env::var("LANTERN_LAYOUT") {
            self.simulation.layout_path = Some(PathBuf::from(path));
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a probability between 0 and 1, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Display name of the terminal.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for every random draw in the run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated wall-clock time at tick 0.
    #[serde(default = "default_start_time")]
    pub start_time: DateTime<Utc>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            start_time: default_start_time(),
        }
    }
}

/// Yard settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YardConfig {
    /// Maximum containers per stack.
    #[serde(default = "default_max_tiers")]
    pub max_tiers: usize,

    /// Whether storage zones are filled with random containers at startup.
    #[serde(default = "default_true")]
    pub seed_on_start: bool,

    /// Fill density used when `seed_on_start` is set.
    #[serde(default)]
    pub seed: SeedOptions,
}

impl Default for YardConfig {
    fn default() -> Self {
        Self {
            max_tiers: default_max_tiers(),
            seed_on_start: true,
            seed: SeedOptions::default(),
        }
    }
}

/// Job execution settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobConfig {
    /// Time a vehicle spends lifting a container, in simulated ms.
    #[serde(default = "default_handling_ms")]
    pub pickup_ms: u64,

    /// Time a vehicle spends setting a container down, in simulated ms.
    #[serde(default = "default_handling_ms")]
    pub dropoff_ms: u64,

    /// Distance from a zone centroid that counts as arrival, in metres.
    #[serde(default = "default_arrival_radius_m")]
    pub arrival_radius_m: f64,

    /// Blocks the symbolic `YARD` zone resolves to.
    #[serde(default = "default_yard_blocks")]
    pub yard_blocks: Vec<ZoneId>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            pickup_ms: default_handling_ms(),
            dropoff_ms: default_handling_ms(),
            arrival_radius_m: default_arrival_radius_m(),
            yard_blocks: default_yard_blocks(),
        }
    }
}

/// Truck gate cycle settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TruckConfig {
    /// Where trucks enter the map.
    #[serde(default = "default_spawn_zone")]
    pub spawn_zone: ZoneId,

    /// Inbound customs checkpoint.
    #[serde(default = "default_customs_in_zone")]
    pub customs_in_zone: ZoneId,

    /// Plate and container-number scanner.
    #[serde(default = "default_ocr_zone")]
    pub ocr_zone: ZoneId,

    /// Inbound gate where jobs are created.
    #[serde(default = "default_gate_in_zone")]
    pub gate_in_zone: ZoneId,

    /// Truck parking where the yard vehicle meets the truck.
    #[serde(default = "default_service_zone")]
    pub service_zone: ZoneId,

    /// Outbound gate.
    #[serde(default = "default_gate_out_zone")]
    pub gate_out_zone: ZoneId,

    /// Outbound customs checkpoint.
    #[serde(default = "default_customs_out_zone")]
    pub customs_out_zone: ZoneId,

    /// Where trucks leave the map.
    #[serde(default = "default_despawn_zone")]
    pub despawn_zone: ZoneId,

    /// Driving speed in metres per second (about 40 km/h).
    #[serde(default = "default_truck_speed_mps")]
    pub speed_mps: f64,

    /// Distance that counts as arrival at a checkpoint, in metres.
    #[serde(default = "default_arrival_radius_m")]
    pub arrival_radius_m: f64,

    /// Distance that counts as arrival at the service zone, in metres.
    #[serde(default = "default_yard_arrival_radius_m")]
    pub yard_arrival_radius_m: f64,

    /// Spawning is refused while a truck is this close to the entry, in
    /// metres.
    #[serde(default = "default_spawn_clearance_m")]
    pub spawn_clearance_m: f64,

    /// Trucks closer than this to each other queue, in metres.
    #[serde(default = "default_collision_radius_m")]
    pub collision_radius_m: f64,

    /// Random offset applied to the spawn point, in degrees.
    #[serde(default = "default_spawn_jitter_deg")]
    pub spawn_jitter_deg: f64,

    /// Inbound and outbound customs inspection time, in simulated ms.
    #[serde(default = "default_customs_ms")]
    pub customs_ms: u64,

    /// OCR scan time, in simulated ms.
    #[serde(default = "default_ocr_ms")]
    pub ocr_ms: u64,

    /// Inbound gate check time, in simulated ms.
    #[serde(default = "default_gate_check_ms")]
    pub gate_check_ms: u64,

    /// Outbound gate clearance time, in simulated ms.
    #[serde(default = "default_gate_exit_ms")]
    pub gate_exit_ms: u64,

    /// Chance a randomly spawned truck comes to pick up an import.
    #[serde(default = "default_import_probability")]
    pub import_probability: f64,

    /// Simulated ms between automatic arrivals. Zero disables them.
    #[serde(default = "default_arrival_interval_ms")]
    pub arrival_interval_ms: u64,

    /// Automatic arrivals stop while this many trucks are on the map.
    #[serde(default = "default_max_active")]
    pub max_active: u32,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            spawn_zone: default_spawn_zone(),
            customs_in_zone: default_customs_in_zone(),
            ocr_zone: default_ocr_zone(),
            gate_in_zone: default_gate_in_zone(),
            service_zone: default_service_zone(),
            gate_out_zone: default_gate_out_zone(),
            customs_out_zone: default_customs_out_zone(),
            despawn_zone: default_despawn_zone(),
            speed_mps: default_truck_speed_mps(),
            arrival_radius_m: default_arrival_radius_m(),
            yard_arrival_radius_m: default_yard_arrival_radius_m(),
            spawn_clearance_m: default_spawn_clearance_m(),
            collision_radius_m: default_collision_radius_m(),
            spawn_jitter_deg: default_spawn_jitter_deg(),
            customs_ms: default_customs_ms(),
            ocr_ms: default_ocr_ms(),
            gate_check_ms: default_gate_check_ms(),
            gate_exit_ms: default_gate_exit_ms(),
            import_probability: default_import_probability(),
            arrival_interval_ms: default_arrival_interval_ms(),
            max_active: default_max_active(),
        }
    }
}

/// Vessel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VesselConfig {
    /// Demurrage charged per started hour past ETD.
    #[serde(default = "default_penalty_per_hour")]
    pub penalty_per_hour: Decimal,

    /// Calls scheduled when the terminal starts.
    #[serde(default)]
    pub calls: Vec<VesselPlan>,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            penalty_per_hour: default_penalty_per_hour(),
            calls: Vec::new(),
        }
    }
}

/// One vessel call scheduled at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VesselPlan {
    /// Vessel name.
    pub name: String,

    /// Seconds after the simulated start time the vessel arrives.
    #[serde(default)]
    pub eta_offset_secs: i64,

    /// Seconds between arrival and scheduled departure.
    #[serde(default = "default_call_duration_secs")]
    pub duration_secs: i64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is
    /// unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log a one-line tick summary every N ticks (0 = never).
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_interval_ticks: default_summary_interval_ticks(),
        }
    }
}

/// Tick size and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Simulated milliseconds per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Real milliseconds to sleep between ticks (0 = as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Zone and road tables to load instead of the built-in layout.
    #[serde(default)]
    pub layout_path: Option<PathBuf>,

    /// Write the terminal snapshot as JSON to this file.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Rewrite the snapshot file every N ticks (0 = only at the end).
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            layout_path: None,
            snapshot_path: None,
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Genoa PSA SECH".to_owned()
}

const fn default_seed() -> u64 {
    42
}

/// 2025-01-01 06:00 UTC.
fn default_start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_711_200, 0).unwrap_or_default()
}

const fn default_max_tiers() -> usize {
    lantern_world::DEFAULT_MAX_TIERS
}

const fn default_handling_ms() -> u64 {
    5000
}

const fn default_arrival_radius_m() -> f64 {
    20.0
}

fn default_yard_blocks() -> Vec<ZoneId> {
    ["BLOCK_A", "BLOCK_B", "BLOCK_C", "BLOCK_D", "BLOCK_LT"]
        .into_iter()
        .map(ZoneId::from)
        .collect()
}

fn default_spawn_zone() -> ZoneId {
    ZoneId::from("SPAWN_POINT_1")
}

fn default_customs_in_zone() -> ZoneId {
    ZoneId::from("DOGANA_IN")
}

fn default_ocr_zone() -> ZoneId {
    ZoneId::from("OCR_GATE")
}

fn default_gate_in_zone() -> ZoneId {
    ZoneId::from("GATE_IN")
}

fn default_service_zone() -> ZoneId {
    ZoneId::from("WAITING_CAMION")
}

fn default_gate_out_zone() -> ZoneId {
    ZoneId::from("GATE_OUT")
}

fn default_customs_out_zone() -> ZoneId {
    ZoneId::from("DOGANA_OUT")
}

fn default_despawn_zone() -> ZoneId {
    ZoneId::from("DESPAWN_POINT_1")
}

const fn default_truck_speed_mps() -> f64 {
    11.11
}

const fn default_yard_arrival_radius_m() -> f64 {
    25.0
}

const fn default_spawn_clearance_m() -> f64 {
    30.0
}

const fn default_collision_radius_m() -> f64 {
    15.0
}

const fn default_spawn_jitter_deg() -> f64 {
    0.000_025
}

const fn default_customs_ms() -> u64 {
    2000
}

const fn default_ocr_ms() -> u64 {
    1000
}

const fn default_gate_check_ms() -> u64 {
    2000
}

const fn default_gate_exit_ms() -> u64 {
    3000
}

const fn default_import_probability() -> f64 {
    0.4
}

const fn default_arrival_interval_ms() -> u64 {
    60_000
}

const fn default_max_active() -> u32 {
    20
}

const fn default_penalty_per_hour() -> Decimal {
    lantern_ledger::DEFAULT_PENALTY_PER_HOUR
}

const fn default_call_duration_secs() -> i64 {
    86_400
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_ticks() -> u64 {
    60
}

const fn default_tick_ms() -> u64 {
    1000
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    3600
}

const fn default_snapshot_interval_ticks() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TerminalConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.yard.max_tiers, 5);
        assert_eq!(config.jobs.pickup_ms, 5000);
        assert_eq!(config.jobs.yard_blocks.len(), 5);
        assert_eq!(config.trucks.customs_ms, 2000);
        assert_eq!(config.trucks.gate_exit_ms, 3000);
        assert_eq!(config.vessels.penalty_per_hour, Decimal::new(1000, 0));
        assert_eq!(config.fleet.reach_stackers, 25);
        assert_eq!(config.simulation.tick_ms, 1000);
    }

    #[test]
    fn default_start_time_is_fixed() {
        let config = TerminalConfig::default();
        assert_eq!(config.world.start_time.to_rfc3339(), "2025-01-01T06:00:00+00:00");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Terminal"
  seed: 123
  start_time: "2024-06-01T00:00:00Z"

fleet:
  terminal_tractors: 2
  reach_stackers: 3

yard:
  max_tiers: 4
  seed_on_start: false
  seed:
    fill_rate: 0.5

jobs:
  pickup_ms: 1000
  yard_blocks: [BLOCK_A]

trucks:
  speed_mps: 20.0
  arrival_interval_ms: 0
  import_probability: 1.0

vessels:
  penalty_per_hour: 250.5
  calls:
    - name: "MSC Aurora"
      eta_offset_secs: 3600
      duration_secs: 7200

logging:
  level: "debug"

simulation:
  tick_ms: 500
  tick_interval_ms: 0
  max_ticks: 10
  layout_path: "layout.yaml"
  snapshot_path: "snapshot.json"
"#;

        let config = TerminalConfig::parse(yaml).unwrap();

        assert_eq!(config.world.name, "Test Terminal");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.fleet.terminal_tractors, 2);
        assert_eq!(config.fleet.reach_stackers, 3);
        assert_eq!(config.yard.max_tiers, 4);
        assert!(!config.yard.seed_on_start);
        assert_eq!(config.jobs.pickup_ms, 1000);
        assert_eq!(config.jobs.dropoff_ms, 5000);
        assert_eq!(config.jobs.yard_blocks, vec![ZoneId::from("BLOCK_A")]);
        assert_eq!(config.trucks.arrival_interval_ms, 0);
        assert_eq!(config.trucks.ocr_zone, ZoneId::from("OCR_GATE"));
        assert_eq!(config.vessels.penalty_per_hour, Decimal::new(2505, 1));
        assert_eq!(config.vessels.calls.len(), 1);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.max_ticks, 10);
        assert_eq!(config.simulation.layout_path, Some(PathBuf::from("layout.yaml")));
        assert_eq!(
            config.simulation.snapshot_path,
            Some(PathBuf::from("snapshot.json"))
        );
        assert_eq!(config.simulation.snapshot_interval_ticks, 10);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = TerminalConfig::parse("world:\n  seed: 7\n").unwrap();

        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.world.name, "Genoa PSA SECH");
        assert!((config.trucks.collision_radius_m - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn nan_import_probability_is_rejected() {
        let result = TerminalConfig::parse("trucks:\n  import_probability: .nan\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "trucks.import_probability",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_fill_rate_is_rejected() {
        let result = TerminalConfig::parse("yard:\n  seed:\n    fill_rate: 1.5\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "yard.seed.fill_rate",
                ..
            })
        ));
    }

    #[test]
    fn negative_truck_speed_is_rejected() {
        let result = TerminalConfig::parse("trucks:\n  speed_mps: -3.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(TerminalConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(TerminalConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = TerminalConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("lantern-config.yaml");
        if path.exists() {
            let config = TerminalConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

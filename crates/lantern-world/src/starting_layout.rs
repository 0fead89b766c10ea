//! Built-in terminal layout and yard seeding.
//!
//! The zone table describes a container terminal on the Genoa waterfront:
//! stacking blocks, crane areas, the quay, rail, the truck gate complex with
//! customs posts, and the highway toll booths where trucks appear and
//! leave. The road table links them into one drivable network: a one-way
//! inbound lane through customs, OCR and the gate to the truck waiting
//! area, a one-way outbound lane back to the highway, and two-way spokes
//! from the waiting area to every storage zone, the depot and the quay.

use lantern_types::{Container, ContainerId, ContainerType, LatLng, RoadSegment, Zone, ZoneId, ZoneType};
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::yard::{StackKey, YardStore};
use crate::zones::ZoneModel;

/// Helper to build a [`Zone`] from `(lat, lng)` pairs.
fn zone(id: &str, zone_type: ZoneType, description: Option<&str>, vertices: &[(f64, f64)]) -> Zone {
    Zone {
        id: ZoneId::from(id),
        zone_type,
        polygon: vertices.iter().map(|&(lat, lng)| LatLng::new(lat, lng)).collect(),
        description: description.map(str::to_owned),
    }
}

/// Helper to build a service [`RoadSegment`].
fn road(points: &[LatLng], one_way: bool) -> RoadSegment {
    RoadSegment {
        path: points.to_vec(),
        one_way,
        road_type: "service".to_owned(),
    }
}

/// Create the default zone table.
#[allow(clippy::too_many_lines)]
pub fn default_zones() -> Vec<Zone> {
    vec![
        // --- Stacking blocks ---
        zone("AREA_FRIGO", ZoneType::Reefer, None, &[
            (44.406_491, 8.908_23),
            (44.406_244, 8.909_443),
            (44.405_952, 8.909_341),
            (44.406_19, 8.908_12),
        ]),
        zone("AREA_1", ZoneType::Standard, None, &[
            (44.405_979, 8.909_381),
            (44.406_23, 8.909_478),
            (44.406_035, 8.910_419),
            (44.405_741, 8.910_328),
            (44.405_793, 8.910_076),
            (44.405_853, 8.910_108),
        ]),
        zone("BLOCK_A", ZoneType::Standard, Some("No gantry crane"), &[
            (44.406_034, 8.908_11),
            (44.405_42, 8.911_242),
            (44.405_209, 8.911_165),
            (44.405_846, 8.907_984),
        ]),
        zone("BLOCK_B", ZoneType::Standard, Some("No gantry crane"), &[
            (44.405_539, 8.907_906),
            (44.404_891, 8.911_079),
            (44.405_129, 8.911_167),
            (44.405_727, 8.907_978),
        ]),
        zone("BLOCK_C", ZoneType::Standard, Some("No gantry crane"), &[
            (44.404_665, 8.910_851),
            (44.404_828, 8.910_915),
            (44.405_451, 8.907_82),
            (44.405_265, 8.907_753),
        ]),
        zone("BLOCK_D", ZoneType::Standard, Some("No gantry crane"), &[
            (44.404_995, 8.908_169),
            (44.404_903, 8.908_241),
            (44.404_83, 8.908_399),
            (44.404_665, 8.909_209),
            (44.404_828, 8.909_271),
            (44.405_037, 8.908_15),
        ]),
        zone("BLOCK_LT", ZoneType::Standard, Some("Long-term storage"), &[
            (44.404_78, 8.909_295),
            (44.404_421, 8.909_158),
            (44.404_174, 8.910_32),
            (44.404_592, 8.910_475),
        ]),
        zone("BLOCK_BC_CRANES", ZoneType::CraneArea, None, &[
            (44.404_056, 8.910_797),
            (44.404_359, 8.910_905),
            (44.403_277, 8.916_129),
            (44.402_913, 8.916_001),
        ]),
        zone("BLOCK_AC_CRANES", ZoneType::CraneArea, None, &[
            (44.404_816, 8.911_985),
            (44.404_504, 8.911_865),
            (44.403_416, 8.917_106),
            (44.403_753, 8.917_235),
        ]),
        zone("IMO", ZoneType::Imo, None, &[
            (44.404_532, 8.911_79),
            (44.404_862, 8.911_913),
            (44.404_969, 8.911_361),
            (44.404_647, 8.911_221),
        ]),
        zone("DAMAGED", ZoneType::Damaged, None, &[
            (44.405_828, 8.911_065),
            (44.405_628, 8.910_993),
            (44.405_557, 8.911_323),
            (44.405_766, 8.911_401),
        ]),
        zone("DEPOT_RALLE", ZoneType::Depot, None, &[
            (44.405_995, 8.911_484),
            (44.405_834, 8.911_626),
            (44.405_561, 8.911_583),
            (44.405_379, 8.912_331),
            (44.406_424, 8.912_763),
            (44.406_495, 8.912_46),
            (44.406_106, 8.912_334),
            (44.406_235, 8.911_626),
        ]),
        // --- Infrastructure ---
        zone("QUAY", ZoneType::Quay, Some("Crane quay"), &[
            (44.405_217, 8.912_407),
            (44.403_914, 8.918_602),
            (44.403_768, 8.918_549),
            (44.405_067, 8.912_321),
        ]),
        zone("RAIL", ZoneType::Rail, None, &[
            (44.404_162, 8.909_134),
            (44.402_772, 8.915_625),
            (44.402_53, 8.915_55),
            (44.403_937, 8.909_027),
            (44.404_136, 8.908_512),
            (44.404_558, 8.907_89),
            (44.404_735, 8.907_643),
            (44.404_785, 8.907_761),
            (44.404_478, 8.908_238),
            (44.404_221, 8.908_812),
        ]),
        zone("GATE_IN", ZoneType::Gate, None, &[
            (44.406_212, 8.904_971),
            (44.406_091, 8.904_794),
            (44.405_93, 8.905_038),
            (44.406_055, 8.905_205),
        ]),
        zone("GATE_OUT", ZoneType::Gate, None, &[
            (44.407_14, 8.904_792),
            (44.406_961, 8.904_899),
            (44.407_042, 8.905_175),
            (44.407_228, 8.905_057),
        ]),
        zone("OCR_GATE", ZoneType::Gate, Some("Pre-gate OCR scanner"), &[
            (44.406_584, 8.907_822),
            (44.406_652, 8.907_822),
            (44.406_652, 8.907_897),
            (44.406_584, 8.907_897),
        ]),
        zone("DOGANA_IN", ZoneType::Gate, Some("Inbound customs"), &[
            (44.409_50, 8.905_50),
            (44.409_80, 8.905_50),
            (44.409_80, 8.906_00),
            (44.409_50, 8.906_00),
        ]),
        zone("DOGANA_OUT", ZoneType::Gate, Some("Outbound customs"), &[
            (44.408_50, 8.904_00),
            (44.408_80, 8.904_00),
            (44.408_80, 8.904_50),
            (44.408_50, 8.904_50),
        ]),
        zone("SPAWN_POINT_1", ZoneType::Gate, Some("Highway toll, entry"), &[
            (44.417_907, 8.902_442),
            (44.417_76, 8.902_517),
            (44.417_541, 8.901_873),
            (44.417_758, 8.901_777),
        ]),
        zone("DESPAWN_POINT_1", ZoneType::Gate, Some("Highway toll, exit"), &[
            (44.417_907, 8.902_442),
            (44.417_971, 8.902_777),
            (44.417_829, 8.902_86),
            (44.417_76, 8.902_517),
        ]),
        zone("GATE_OOG", ZoneType::Gate, Some("Out-of-gauge gate"), &[
            (44.406_271, 8.907_463),
            (44.406_179, 8.907_428),
            (44.406_169, 8.907_53),
            (44.406_269, 8.907_576),
        ]),
        zone("OFFICE", ZoneType::Building, None, &[
            (44.405_737, 8.910_854),
            (44.405_81, 8.910_47),
            (44.405_965, 8.910_542),
            (44.405_901, 8.910_95),
        ]),
        // --- Transfer areas ---
        zone("LOADING_RAIL", ZoneType::Loading, None, &[
            (44.404_162, 8.909_134),
            (44.404_344, 8.909_22),
            (44.403_375, 8.913_753),
            (44.403_188, 8.913_683),
        ]),
        zone("WAITING_CAMION", ZoneType::Loading, Some("Truck service lane"), &[
            (44.405_781, 8.909_399),
            (44.405_924, 8.909_464),
            (44.405_793, 8.910_076),
            (44.405_741, 8.910_328),
            (44.405_628, 8.910_993),
            (44.405_478, 8.910_947),
        ]),
        zone("LOADING_AB", ZoneType::Loading, None, &[
            (44.405_846, 8.907_984),
            (44.405_727, 8.907_978),
            (44.405_129, 8.911_167),
            (44.405_209, 8.911_165),
        ]),
        zone("LOADING_BC", ZoneType::Loading, None, &[
            (44.405_451, 8.907_82),
            (44.405_539, 8.907_906),
            (44.404_918, 8.910_947),
            (44.404_828, 8.910_915),
        ]),
        zone("LOADING_CD_LT", ZoneType::Loading, None, &[
            (44.405_265, 8.907_753),
            (44.405_037, 8.908_15),
            (44.404_619, 8.910_491),
            (44.404_725, 8.910_541),
        ]),
        zone("LOADING_BC_CRANES", ZoneType::Loading, None, &[
            (44.404_493, 8.911_205),
            (44.404_312, 8.911_134),
            (44.403_408, 8.915_498),
            (44.403_573, 8.915_545),
        ]),
        zone("LOADING_AC_CRANES", ZoneType::Loading, None, &[
            (44.404_816, 8.911_985),
            (44.404_98, 8.912_074),
            (44.403_898, 8.917_277),
            (44.403_753, 8.917_235),
        ]),
    ]
}

// Road junctions, placed on zone centroids.
const SPAWN: LatLng = LatLng::new(44.417_742, 8.902_152);
const DESPAWN: LatLng = LatLng::new(44.417_867, 8.902_649);
const HIGHWAY_IN: LatLng = LatLng::new(44.413_5, 8.903_0);
const HIGHWAY_OUT: LatLng = LatLng::new(44.413_5, 8.904_5);
const DOGANA_IN: LatLng = LatLng::new(44.409_65, 8.905_75);
const DOGANA_OUT: LatLng = LatLng::new(44.408_65, 8.904_25);
const OCR_GATE: LatLng = LatLng::new(44.406_618, 8.907_86);
const GATE_IN: LatLng = LatLng::new(44.406_072, 8.905_002);
const GATE_OUT: LatLng = LatLng::new(44.407_093, 8.904_981);
const EXIT_BEND: LatLng = LatLng::new(44.406_8, 8.907_0);
const WAITING: LatLng = LatLng::new(44.405_724, 8.910_201);
const AREA_1: LatLng = LatLng::new(44.405_939, 8.909_965);
const AREA_FRIGO: LatLng = LatLng::new(44.406_219, 8.908_784);
const BLOCK_A: LatLng = LatLng::new(44.405_627, 8.909_625);
const BLOCK_B: LatLng = LatLng::new(44.405_322, 8.909_533);
const BLOCK_C: LatLng = LatLng::new(44.405_052, 8.909_335);
const BLOCK_D: LatLng = LatLng::new(44.404_876, 8.908_573);
const BLOCK_LT: LatLng = LatLng::new(44.404_492, 8.909_812);
const DEPOT: LatLng = LatLng::new(44.406_004, 8.912_026);
const DAMAGED: LatLng = LatLng::new(44.405_695, 8.911_196);
const IMO: LatLng = LatLng::new(44.404_753, 8.911_571);
const QUAY: LatLng = LatLng::new(44.404_492, 8.915_47);

/// Create the default road table.
pub fn default_roads() -> Vec<RoadSegment> {
    vec![
        // Truck lanes.
        road(&[SPAWN, HIGHWAY_IN, DOGANA_IN, OCR_GATE, GATE_IN], true),
        road(&[GATE_IN, WAITING], false),
        road(&[WAITING, EXIT_BEND, GATE_OUT], true),
        road(&[GATE_OUT, DOGANA_OUT, HIGHWAY_OUT, DESPAWN], true),
        // Yard spokes.
        road(&[WAITING, AREA_1], false),
        road(&[AREA_1, AREA_FRIGO], false),
        road(&[WAITING, BLOCK_A], false),
        road(&[BLOCK_A, BLOCK_B], false),
        road(&[BLOCK_B, BLOCK_C], false),
        road(&[BLOCK_C, BLOCK_D], false),
        road(&[BLOCK_C, BLOCK_LT], false),
        road(&[WAITING, DEPOT], false),
        road(&[DEPOT, DAMAGED], false),
        road(&[DEPOT, IMO], false),
        road(&[DEPOT, QUAY], false),
    ]
}

// ---------------------------------------------------------------------------
// Yard seeding
// ---------------------------------------------------------------------------

/// How densely [`seed_yard`] fills storage zones.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedOptions {
    /// Chance that a ground slot receives a container.
    #[serde(default = "default_fill_rate")]
    pub fill_rate: f64,
    /// Chance that a filled slot receives a second tier.
    #[serde(default = "default_second_tier_rate")]
    pub second_tier_rate: f64,
    /// Bays seeded per zone, at most.
    #[serde(default = "default_max_bays")]
    pub max_bays: u32,
    /// Rows seeded per zone, at most.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
}

const fn default_fill_rate() -> f64 {
    0.3
}

const fn default_second_tier_rate() -> f64 {
    0.3
}

const fn default_max_bays() -> u32 {
    10
}

const fn default_max_rows() -> u32 {
    5
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            fill_rate: default_fill_rate(),
            second_tier_rate: default_second_tier_rate(),
            max_bays: default_max_bays(),
            max_rows: default_max_rows(),
        }
    }
}

/// Clamp a configured rate into `random_bool` range. NaN counts as never.
const fn chance(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Populate every storage zone with a random scattering of containers.
///
/// Reefer and IMO zones receive boxes of their own kind. Returns the number
/// of containers placed.
pub fn seed_yard<R: Rng + ?Sized>(
    zones: &ZoneModel,
    yard: &mut YardStore,
    options: &SeedOptions,
    rng: &mut R,
) -> usize {
    let fill = chance(options.fill_rate);
    let stack = chance(options.second_tier_rate);
    let mut placed = 0_usize;

    for z in zones.zones().filter(|z| z.zone_type.is_storage()) {
        let Some(capacity) = zones.capacity(&z.id) else {
            continue;
        };
        let container_type = match z.zone_type {
            ZoneType::Reefer => ContainerType::Reefer,
            ZoneType::Imo => ContainerType::Imo,
            _ => ContainerType::Standard,
        };
        for bay in 1..=capacity.bays.min(options.max_bays) {
            for row in 1..=capacity.rows.min(options.max_rows) {
                if !rng.random_bool(fill) {
                    continue;
                }
                let key = StackKey::new(z.id.clone(), bay, row);
                let ground = Container {
                    container_type,
                    ..Container::new(ContainerId::new(format!("CNT-{}-{bay:02}{row:02}", z.id)))
                };
                if yard.add(ground, key.clone()).is_ok() {
                    placed = placed.saturating_add(1);
                }
                if rng.random_bool(stack) {
                    let top = Container {
                        container_type,
                        ..Container::new(ContainerId::new(format!("TOP-{}-{bay:02}{row:02}", z.id)))
                    };
                    if yard.add(top, key).is_ok() {
                        placed = placed.saturating_add(1);
                    }
                }
            }
        }
    }

    info!(containers = placed, "Yard seeded");
    placed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::geo;
    use crate::road_network::{GraphMode, RoadNetwork, RoutingConfig};

    fn model() -> ZoneModel {
        ZoneModel::from_zones(default_zones()).unwrap()
    }

    #[test]
    fn default_zones_register_cleanly() {
        let zones = model();
        assert_eq!(zones.len(), 30);
        for id in ["BLOCK_A", "WAITING_CAMION", "DEPOT_RALLE", "SPAWN_POINT_1", "QUAY"] {
            assert!(zones.contains(&ZoneId::from(id)), "missing {id}");
        }
    }

    #[test]
    fn junctions_sit_inside_their_zones() {
        let zones = model();
        for (id, point) in [
            ("SPAWN_POINT_1", SPAWN),
            ("DOGANA_IN", DOGANA_IN),
            ("OCR_GATE", OCR_GATE),
            ("GATE_IN", GATE_IN),
            ("WAITING_CAMION", WAITING),
            ("DEPOT_RALLE", DEPOT),
            ("BLOCK_A", BLOCK_A),
        ] {
            let centroid = zones.centroid(&ZoneId::from(id)).unwrap();
            assert!(geo::distance_meters(centroid, point) < 5.0, "{id} junction off centre");
        }
    }

    #[test]
    fn default_roads_link_gate_cycle() {
        let zones = model();
        let network = RoadNetwork::build(&zones, &default_roads(), RoutingConfig::default());
        assert_eq!(network.mode(), GraphMode::Polyline);
        let legs = [
            ("SPAWN_POINT_1", "DOGANA_IN"),
            ("DOGANA_IN", "OCR_GATE"),
            ("OCR_GATE", "GATE_IN"),
            ("GATE_IN", "WAITING_CAMION"),
            ("WAITING_CAMION", "GATE_OUT"),
            ("GATE_OUT", "DOGANA_OUT"),
            ("DOGANA_OUT", "DESPAWN_POINT_1"),
            ("DEPOT_RALLE", "BLOCK_LT"),
            ("BLOCK_D", "WAITING_CAMION"),
        ];
        for (from, to) in legs {
            let start = zones.centroid(&ZoneId::from(from)).unwrap();
            let path = network.find_path(start, &ZoneId::from(to), &zones);
            assert!(path.is_ok(), "{from} -> {to}: {path:?}");
        }
    }

    #[test]
    fn seeding_only_touches_storage_zones() {
        let zones = model();
        let mut yard = YardStore::default();
        let mut rng = StdRng::seed_from_u64(42);
        let placed = seed_yard(&zones, &mut yard, &SeedOptions::default(), &mut rng);
        assert!(placed > 0);
        assert_eq!(yard.len(), placed);
        assert!(yard.containers_in_zone(&ZoneId::from("QUAY")).is_empty());
        assert!(yard.containers_in_zone(&ZoneId::from("WAITING_CAMION")).is_empty());
        for (_, c) in yard.containers_in_zone(&ZoneId::from("AREA_FRIGO")) {
            assert_eq!(c.container_type, ContainerType::Reefer);
        }
    }

    #[test]
    fn seeding_is_reproducible() {
        let zones = model();
        let run = |seed| {
            let mut yard = YardStore::default();
            let mut rng = StdRng::seed_from_u64(seed);
            seed_yard(&zones, &mut yard, &SeedOptions::default(), &mut rng);
            yard.containers_in_zone(&ZoneId::from("BLOCK_A"))
                .into_iter()
                .map(|(l, c)| (l.key.bay, l.key.row, l.tier, c.id.to_string()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn zero_fill_rate_leaves_yard_empty() {
        let zones = model();
        let mut yard = YardStore::default();
        let options = SeedOptions {
            fill_rate: 0.0,
            ..SeedOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(seed_yard(&zones, &mut yard, &options, &mut rng), 0);
        assert!(yard.is_empty());
    }

    #[test]
    fn nan_fill_rate_is_treated_as_zero() {
        let zones = model();
        let mut yard = YardStore::default();
        let options = SeedOptions {
            fill_rate: f64::NAN,
            ..SeedOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(seed_yard(&zones, &mut yard, &options, &mut rng), 0);
    }
}

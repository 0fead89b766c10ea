//! Registry of terminal zone polygons.
//!
//! The [`ZoneModel`] is loaded once from the layout table and never mutated
//! afterwards. Every spatial question the simulation asks about a named area
//! (where is its centre, how many slots fit, is this point inside, give me a
//! random spot in it) goes through here.

use std::collections::BTreeMap;

use lantern_types::{LatLng, Zone, ZoneId, ZoneType};
use rand::Rng;

use crate::error::WorldError;
use crate::geo;

/// Length of one 20ft ground slot along a bay, in metres.
pub const SLOT_LENGTH_M: f64 = 6.4;

/// Width of one ground slot across a row, in metres.
pub const SLOT_WIDTH_M: f64 = 2.6;

/// Draws attempted by [`ZoneModel::random_point_inside`] before falling back
/// to the bounding-box centre.
pub const RANDOM_POINT_ATTEMPTS: u32 = 10;

/// Ground-slot grid that fits inside a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCapacity {
    /// Slots along the first edge.
    pub bays: u32,
    /// Slots along the second edge.
    pub rows: u32,
    /// Length of the first edge in metres.
    pub width_m: f64,
    /// Length of the second edge in metres.
    pub height_m: f64,
}

impl ZoneCapacity {
    /// Total ground slots.
    pub const fn slots(&self) -> u32 {
        self.bays.saturating_mul(self.rows)
    }
}

/// Immutable zone registry in layout-table order.
#[derive(Debug, Clone, Default)]
pub struct ZoneModel {
    zones: Vec<Zone>,
    index: BTreeMap<ZoneId, usize>,
}

impl ZoneModel {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            zones: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Build a registry from a zone table.
    ///
    /// # Errors
    ///
    /// Fails on the first zone [`insert`](Self::insert) rejects.
    pub fn from_zones(zones: impl IntoIterator<Item = Zone>) -> Result<Self, WorldError> {
        let mut model = Self::new();
        for zone in zones {
            model.insert(zone)?;
        }
        Ok(model)
    }

    /// Register a zone.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DegeneratePolygon`] for outlines with fewer than
    /// three vertices and [`WorldError::DuplicateZone`] for a repeated code.
    pub fn insert(&mut self, zone: Zone) -> Result<(), WorldError> {
        if zone.polygon.len() < 3 {
            return Err(WorldError::DegeneratePolygon {
                zone: zone.id,
                vertices: zone.polygon.len(),
            });
        }
        if self.index.contains_key(&zone.id) {
            return Err(WorldError::DuplicateZone(zone.id));
        }
        self.index.insert(zone.id.clone(), self.zones.len());
        self.zones.push(zone);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Look up a zone by code.
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.index.get(id).and_then(|&i| self.zones.get(i))
    }

    /// Whether a zone with this code is registered.
    pub fn contains(&self, id: &ZoneId) -> bool {
        self.index.contains_key(id)
    }

    /// All zones in table order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Zones of one type in table order.
    pub fn zones_of_type(&self, zone_type: ZoneType) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.zone_type == zone_type)
    }

    /// Number of registered zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no zones are registered.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Outline of a zone.
    pub fn polygon(&self, id: &ZoneId) -> Option<&[LatLng]> {
        self.zone(id).map(|z| z.polygon.as_slice())
    }

    /// Mean of a zone's vertices.
    pub fn centroid(&self, id: &ZoneId) -> Option<LatLng> {
        self.polygon(id).and_then(geo::centroid)
    }

    // -------------------------------------------------------------------
    // Derived geometry
    // -------------------------------------------------------------------

    /// Ground-slot grid derived from the first two edges of the outline.
    ///
    /// Each count is floored and never below 1.
    pub fn capacity(&self, id: &ZoneId) -> Option<ZoneCapacity> {
        let polygon = self.polygon(id)?;
        let (p0, p1, p2) = (polygon.first()?, polygon.get(1)?, polygon.get(2)?);
        let width_m = geo::distance_meters(*p0, *p1);
        let height_m = geo::distance_meters(*p1, *p2);
        Some(ZoneCapacity {
            bays: slot_count(width_m, SLOT_LENGTH_M),
            rows: slot_count(height_m, SLOT_WIDTH_M),
            width_m,
            height_m,
        })
    }

    /// A uniformly drawn point inside the zone.
    ///
    /// Draws up to [`RANDOM_POINT_ATTEMPTS`] points from the bounding box and
    /// returns the first that falls inside; thin or concave zones that miss
    /// every draw get the bounding-box centre, which may lie outside.
    pub fn random_point_inside<R: Rng + ?Sized>(&self, id: &ZoneId, rng: &mut R) -> Option<LatLng> {
        let polygon = self.polygon(id)?;
        let bbox = geo::bounding_box(polygon)?;
        for _ in 0..RANDOM_POINT_ATTEMPTS {
            let candidate = LatLng::new(
                (bbox.max_lat - bbox.min_lat).mul_add(rng.random::<f64>(), bbox.min_lat),
                (bbox.max_lng - bbox.min_lng).mul_add(rng.random::<f64>(), bbox.min_lng),
            );
            if geo::contains_point(candidate, polygon) {
                return Some(candidate);
            }
        }
        Some(bbox.center())
    }
}

/// Whole slots of `slot_m` that fit along `length_m`, at least one.
fn slot_count(length_m: f64, slot_m: f64) -> u32 {
    let slots = (length_m / slot_m).floor();
    if slots < 1.0 {
        return 1;
    }
    if slots >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    // Bounded to [1, u32::MAX) above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = slots as u32;
    n
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rect(id: &str, zone_type: ZoneType) -> Zone {
        // Roughly 64 m east-west by 26 m north-south near Genoa.
        Zone {
            id: ZoneId::from(id),
            zone_type,
            polygon: vec![
                LatLng::new(44.4050, 8.9100),
                LatLng::new(44.4050, 8.910_805),
                LatLng::new(44.405_234, 8.910_805),
                LatLng::new(44.405_234, 8.9100),
            ],
            description: None,
        }
    }

    #[test]
    fn rejects_degenerate_polygon() {
        let mut model = ZoneModel::new();
        let mut zone = rect("THIN", ZoneType::Road);
        zone.polygon.truncate(2);
        assert!(matches!(
            model.insert(zone),
            Err(WorldError::DegeneratePolygon { vertices: 2, .. })
        ));
        assert!(model.is_empty());
    }

    #[test]
    fn rejects_duplicate_zone() {
        let mut model = ZoneModel::new();
        assert!(model.insert(rect("A", ZoneType::Standard)).is_ok());
        assert!(matches!(
            model.insert(rect("A", ZoneType::Reefer)),
            Err(WorldError::DuplicateZone(_))
        ));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn zones_of_type_keeps_table_order() {
        let model = ZoneModel::from_zones([
            rect("B2", ZoneType::Standard),
            rect("G", ZoneType::Gate),
            rect("B1", ZoneType::Standard),
        ]);
        assert!(model.is_ok());
        let model = model.unwrap_or_default();
        let ids: Vec<&str> = model
            .zones_of_type(ZoneType::Standard)
            .map(|z| z.id.as_str())
            .collect();
        assert_eq!(ids, vec!["B2", "B1"]);
    }

    #[test]
    fn capacity_from_first_edges() {
        let model = ZoneModel::from_zones([rect("A", ZoneType::Standard)]).unwrap_or_default();
        let cap = model.capacity(&ZoneId::from("A"));
        assert!(cap.is_some());
        let cap = cap.unwrap_or(ZoneCapacity {
            bays: 0,
            rows: 0,
            width_m: 0.0,
            height_m: 0.0,
        });
        // ~64 m / 6.4 m and ~26 m / 2.6 m.
        assert!((9..=10).contains(&cap.bays), "bays {}", cap.bays);
        assert!((9..=10).contains(&cap.rows), "rows {}", cap.rows);
        assert_eq!(cap.slots(), cap.bays.saturating_mul(cap.rows));
    }

    #[test]
    fn capacity_never_below_one() {
        assert_eq!(slot_count(0.5, SLOT_LENGTH_M), 1);
        assert_eq!(slot_count(12.9, SLOT_LENGTH_M), 2);
    }

    #[test]
    fn unknown_zone_has_no_geometry() {
        let model = ZoneModel::new();
        let id = ZoneId::from("NOPE");
        assert!(model.centroid(&id).is_none());
        assert!(model.capacity(&id).is_none());
    }

    #[test]
    fn random_points_fall_inside() {
        let model = ZoneModel::from_zones([rect("A", ZoneType::Standard)]).unwrap_or_default();
        let id = ZoneId::from("A");
        let polygon = model.polygon(&id).map(<[LatLng]>::to_vec).unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = model.random_point_inside(&id, &mut rng);
            assert!(p.is_some_and(|p| geo::contains_point(p, &polygon)));
        }
    }
}

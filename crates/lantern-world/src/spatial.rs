//! Uniform grid index over node coordinates.
//!
//! Coordinates are projected onto a local metric plane (equirectangular,
//! scaled at a fixed reference latitude) and bucketed into square cells.
//! Range queries return every id stored in the cells covering the query
//! circle plus one ring of margin; callers filter by true distance.

use std::collections::BTreeMap;

use lantern_types::LatLng;

/// Metres per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 111_132.0;

/// Metres per degree of longitude at the equator.
const METERS_PER_DEG_LNG_EQUATOR: f64 = 111_320.0;

/// Bucketed point index keyed by integer cell coordinates.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_m: f64,
    meters_per_deg_lng: f64,
    cells: BTreeMap<(i64, i64), Vec<u32>>,
}

impl SpatialHash {
    /// Create an index with square cells of `cell_m` metres, projected at
    /// `reference_lat`.
    pub fn new(cell_m: f64, reference_lat: f64) -> Self {
        Self {
            cell_m: cell_m.max(0.1),
            meters_per_deg_lng: METERS_PER_DEG_LNG_EQUATOR * reference_lat.to_radians().cos(),
            cells: BTreeMap::new(),
        }
    }

    /// Store an id at a coordinate.
    pub fn insert(&mut self, id: u32, point: LatLng) {
        self.cells.entry(self.cell_of(point)).or_default().push(id);
    }

    /// Ids stored in the cells that cover a circle of `radius_m` around `point`.
    pub fn candidates(&self, point: LatLng, radius_m: f64) -> Vec<u32> {
        let (cx, cy) = self.cell_of(point);
        let ring = to_cell_index((radius_m / self.cell_m).ceil()).saturating_add(1);
        let mut out = Vec::new();
        for dx in ring.saturating_neg()..=ring {
            for dy in ring.saturating_neg()..=ring {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(ids) = self.cells.get(&key) {
                    out.extend_from_slice(ids);
                }
            }
        }
        out
    }

    fn cell_of(&self, point: LatLng) -> (i64, i64) {
        let x = point.lng * self.meters_per_deg_lng / self.cell_m;
        let y = point.lat * METERS_PER_DEG_LAT / self.cell_m;
        (to_cell_index(x.floor()), to_cell_index(y.floor()))
    }
}

/// Clamp a floored float into the cell index range.
fn to_cell_index(v: f64) -> i64 {
    if !v.is_finite() {
        return 0;
    }
    // Terminal coordinates in metres sit far inside the i64 range; the clamp
    // keeps the cast total for any input.
    #[allow(clippy::cast_possible_truncation)]
    let idx = v.clamp(-1.0e15, 1.0e15) as i64;
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo;

    #[test]
    fn finds_neighbours_across_cell_edges() {
        let mut hash = SpatialHash::new(12.0, 44.4);
        let a = LatLng::new(44.405_000, 8.910_000);
        // About 10 m east.
        let b = LatLng::new(44.405_000, 8.910_125);
        hash.insert(0, a);
        hash.insert(1, b);
        assert!(geo::distance_meters(a, b) < 12.0);
        let found = hash.candidates(a, 12.0);
        assert!(found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn far_points_are_not_candidates() {
        let mut hash = SpatialHash::new(12.0, 44.4);
        hash.insert(7, LatLng::new(44.41, 8.91));
        let found = hash.candidates(LatLng::new(44.40, 8.90), 12.0);
        assert!(found.is_empty());
    }
}

//! Spherical-earth distance and planar polygon primitives.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_M`]. Containment and bounding boxes treat latitude and
//! longitude as planar coordinates, which is accurate at terminal scale.

use lantern_types::LatLng;

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Axis-aligned bounds of a polygon in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BoundingBox {
    /// Midpoint of the box.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Great-circle distance between two coordinates in metres.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (phi1.cos() * phi2.cos())
        .mul_add((d_lambda / 2.0).sin().powi(2), (d_phi / 2.0).sin().powi(2));
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Even-odd ray-casting containment test.
///
/// Points exactly on an edge may land on either side.
pub fn contains_point(point: LatLng, polygon: &[LatLng]) -> bool {
    let mut inside = false;
    let Some(mut prev) = polygon.last().copied() else {
        return false;
    };
    for &cur in polygon {
        let crosses = (cur.lng > point.lng) != (prev.lng > point.lng);
        if crosses {
            let slope = (prev.lat - cur.lat) / (prev.lng - cur.lng);
            let intersect_lat = slope.mul_add(point.lng - cur.lng, cur.lat);
            if point.lat < intersect_lat {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}

/// Arithmetic mean of the vertices. `None` for an empty slice.
pub fn centroid(polygon: &[LatLng]) -> Option<LatLng> {
    if polygon.is_empty() {
        return None;
    }
    let (sum_lat, sum_lng) = polygon
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    let n = f64::from(u32::try_from(polygon.len()).ok()?);
    Some(LatLng::new(sum_lat / n, sum_lng / n))
}

/// Bounding box of the vertices. `None` for an empty slice.
pub fn bounding_box(polygon: &[LatLng]) -> Option<BoundingBox> {
    let first = polygon.first()?;
    let init = BoundingBox {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lng: first.lng,
        max_lng: first.lng,
    };
    Some(polygon.iter().fold(init, |b, p| BoundingBox {
        min_lat: b.min_lat.min(p.lat),
        max_lat: b.max_lat.max(p.lat),
        min_lng: b.min_lng.min(p.lng),
        max_lng: b.max_lng.max(p.lng),
    }))
}

/// Linear interpolation between two coordinates, `t` in `[0, 1]`.
pub fn interpolate(a: LatLng, b: LatLng, t: f64) -> LatLng {
    LatLng::new(
        (b.lat - a.lat).mul_add(t, a.lat),
        (b.lng - a.lng).mul_add(t, a.lng),
    )
}

/// Initial bearing from `a` to `b` in degrees clockwise from north, `[0, 360)`.
pub fn bearing_degrees(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();
    let y = d_lambda.sin() * phi2.cos();
    let x = phi1
        .cos()
        .mul_add(phi2.sin(), -(phi1.sin() * phi2.cos() * d_lambda.cos()));
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(1.0, 0.0),
        ]
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_meters(LatLng::new(44.0, 8.9), LatLng::new(45.0, 8.9));
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = LatLng::new(44.4057, 8.9102);
        let b = LatLng::new(44.4060, 8.9120);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-9);
        assert!(distance_meters(a, a).abs() < 1e-9);
    }

    #[test]
    fn containment() {
        let poly = square();
        assert!(contains_point(LatLng::new(0.5, 0.5), &poly));
        assert!(!contains_point(LatLng::new(1.5, 0.5), &poly));
        assert!(!contains_point(LatLng::new(0.5, -0.1), &poly));
        assert!(!contains_point(LatLng::new(0.5, 0.5), &[]));
    }

    #[test]
    fn concave_containment() {
        // An L shape: the notch at the top right is outside.
        let poly = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(1.0, 2.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(2.0, 1.0),
            LatLng::new(2.0, 0.0),
        ];
        assert!(contains_point(LatLng::new(1.5, 0.5), &poly));
        assert!(!contains_point(LatLng::new(1.5, 1.5), &poly));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let c = centroid(&square());
        assert!(c.is_some_and(|c| (c.lat - 0.5).abs() < 1e-12 && (c.lng - 0.5).abs() < 1e-12));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn bbox_center() {
        let b = bounding_box(&square());
        assert!(b.is_some());
        let center = b.map(|b| b.center()).unwrap_or_default();
        assert!((center.lat - 0.5).abs() < 1e-12);
    }

    #[test]
    fn bearing_east_is_ninety() {
        let b = bearing_degrees(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        assert!((b - 90.0).abs() < 1e-6);
    }
}

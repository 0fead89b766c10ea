//! Constant-speed movement along routed waypoints.
//!
//! Vehicles and trucks carry a `route: Vec<LatLng>` of waypoints still to
//! visit. [`plan_route`] fills it from the road network, and
//! [`advance_along`] consumes it a tick at a time.

use lantern_types::LatLng;
use tracing::warn;

use crate::geo;
use crate::road_network::RoadNetwork;

/// Outcome of moving along a route for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Position after the move.
    pub position: LatLng,
    /// Heading of the last leg travelled, if any movement happened.
    pub heading: Option<f64>,
    /// Metres covered this tick.
    pub travelled_m: f64,
}

/// Waypoints from `from` to `to` over the road network.
///
/// The graph path is followed by the exact destination so arrival checks
/// against `to` succeed. When no graph path exists the route degrades to a
/// single straight leg and a warning is logged.
pub fn plan_route(network: &RoadNetwork, from: LatLng, to: LatLng) -> Vec<LatLng> {
    match network.find_path_to_point(from, to) {
        Ok(plan) => {
            let mut waypoints = plan.waypoints;
            waypoints.push(to);
            waypoints
        }
        Err(e) => {
            warn!(
                error = %e,
                from_lat = from.lat,
                from_lng = from.lng,
                to_lat = to.lat,
                to_lng = to.lng,
                "Route unavailable, driving straight"
            );
            vec![to]
        }
    }
}

/// Move from `position` along `route` by up to `budget_m` metres.
///
/// Waypoints that are reached are removed from the front of `route`.
pub fn advance_along(position: LatLng, route: &mut Vec<LatLng>, budget_m: f64) -> Step {
    let mut current = position;
    let mut remaining = budget_m.max(0.0);
    let mut heading = None;
    let mut reached = 0_usize;

    for &waypoint in route.iter() {
        if remaining <= 0.0 {
            break;
        }
        let leg = geo::distance_meters(current, waypoint);
        if leg > 0.0 {
            heading = Some(geo::bearing_degrees(current, waypoint));
        }
        if leg <= remaining {
            current = waypoint;
            remaining -= leg;
            reached = reached.saturating_add(1);
        } else {
            current = geo::interpolate(current, waypoint, remaining / leg);
            remaining = 0.0;
        }
    }
    route.drain(..reached.min(route.len()));

    Step {
        position: current,
        heading,
        travelled_m: budget_m.max(0.0) - remaining,
    }
}

#[cfg(test)]
mod tests {
    use lantern_types::RoadSegment;

    use super::*;
    use crate::road_network::RoutingConfig;

    fn east(meters: f64) -> LatLng {
        LatLng::new(44.405, 8.910 + meters / 79_500.0)
    }

    #[test]
    fn partial_leg_interpolates() {
        let mut route = vec![east(100.0)];
        let step = advance_along(east(0.0), &mut route, 30.0);
        assert_eq!(route.len(), 1);
        assert!((geo::distance_meters(east(0.0), step.position) - 30.0).abs() < 0.5);
        assert!(step.heading.is_some_and(|h| (h - 90.0).abs() < 1.0));
    }

    #[test]
    fn consumes_reached_waypoints() {
        let mut route = vec![east(10.0), east(20.0), east(60.0)];
        let step = advance_along(east(0.0), &mut route, 25.0);
        assert_eq!(route.len(), 1);
        assert!((step.travelled_m - 25.0).abs() < 1e-9);
    }

    #[test]
    fn stops_at_end_of_route() {
        let mut route = vec![east(5.0)];
        let step = advance_along(east(0.0), &mut route, 50.0);
        assert!(route.is_empty());
        assert!(step.travelled_m < 5.5);
        assert!(geo::distance_meters(step.position, east(5.0)) < 1e-6);
    }

    #[test]
    fn empty_network_falls_back_to_straight_line() {
        let network = RoadNetwork::from_segments(&[], RoutingConfig::default());
        let route = plan_route(&network, east(0.0), east(40.0));
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn planned_route_ends_at_destination() {
        let network = RoadNetwork::from_segments(
            &[RoadSegment {
                path: vec![east(0.0), east(30.0)],
                one_way: false,
                road_type: "service".to_owned(),
            }],
            RoutingConfig::default(),
        );
        let route = plan_route(&network, east(1.0), east(29.0));
        assert!(route.len() >= 2);
        assert!(route.last().is_some_and(|p| geo::distance_meters(*p, east(29.0)) < 1e-6));
    }
}

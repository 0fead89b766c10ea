//! Drivable road graph and A* router.
//!
//! The [`RoadNetwork`] is built once from the layout and replaced wholesale
//! whenever the road table changes. It has two construction modes:
//!
//! - **Polyline**: drawn road segments are densified to short steps and
//!   every point is snapped onto the graph through a [`SpatialHash`], so
//!   segments that end near each other join at a shared node.
//! - **Grid**: when no usable road data exists, a lattice of points is laid
//!   inside every navigable zone and neighbouring points are connected.
//!
//! Adjacency is a per-node `BTreeMap<NodeId, f64>`, so an ordered pair
//! `(from, to)` can exist at most once and neighbour iteration is
//! deterministic.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use lantern_types::{LatLng, RoadSegment, ZoneId};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::geo;
use crate::spatial::SpatialHash;
use crate::zones::ZoneModel;

/// Index of a node in the road graph.
pub type NodeId = u32;

/// Road classifications that never carry traffic.
const INACTIVE_ROAD_TYPES: &[&str] = &[
    "construction",
    "proposed",
    "razed",
    "abandoned",
    "disused",
    "demolished",
    "rail",
];

/// Tunables for graph construction and path search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutingConfig {
    /// Lattice spacing in degrees for grid mode.
    #[serde(default = "default_grid_step_deg")]
    pub grid_step_deg: f64,
    /// Grid-mode nodes closer than this (metres) are connected.
    #[serde(default = "default_grid_connect_m")]
    pub grid_connect_m: f64,
    /// Polyline pairs longer than this (metres) are subdivided.
    #[serde(default = "default_densify_m")]
    pub densify_m: f64,
    /// Snap radius for the first and last point of a segment.
    #[serde(default = "default_snap_endpoint_m")]
    pub snap_endpoint_m: f64,
    /// Snap radius for every other point of a segment.
    #[serde(default = "default_snap_interior_m")]
    pub snap_interior_m: f64,
    /// A* gives up after this many node expansions.
    #[serde(default = "default_max_expansions")]
    pub max_expansions: u32,
    /// Snaps longer than this (metres) are reported as off-network.
    #[serde(default = "default_far_snap_m")]
    pub far_snap_m: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            grid_step_deg: default_grid_step_deg(),
            grid_connect_m: default_grid_connect_m(),
            densify_m: default_densify_m(),
            snap_endpoint_m: default_snap_endpoint_m(),
            snap_interior_m: default_snap_interior_m(),
            max_expansions: default_max_expansions(),
            far_snap_m: default_far_snap_m(),
        }
    }
}

/// How a network was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode {
    /// Lattice inside navigable zones.
    Grid,
    /// Snapped road polylines.
    Polyline,
}

/// A graph vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    /// Node index.
    pub id: NodeId,
    /// Coordinate.
    pub point: LatLng,
    /// Zone the node was generated inside (grid mode only).
    pub origin_zone: Option<ZoneId>,
}

/// Result of a node-to-node search.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePath {
    /// Nodes from start to goal inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights in metres.
    pub cost_m: f64,
}

/// Result of a point-to-point route query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Node coordinates from the start node to the goal node.
    pub waypoints: Vec<LatLng>,
    /// Distance from the query start to its snapped node.
    pub start_snap_m: f64,
    /// Distance from the query goal to its snapped node.
    pub goal_snap_m: f64,
    /// Length of the graph path in metres.
    pub length_m: f64,
}

/// Directed weighted road graph.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    mode: GraphMode,
    nodes: Vec<RoadNode>,
    adjacency: Vec<BTreeMap<NodeId, f64>>,
    config: RoutingConfig,
}

impl RoadNetwork {
    /// Build from road segments when any are usable, otherwise from zones.
    pub fn build(zones: &ZoneModel, segments: &[RoadSegment], config: RoutingConfig) -> Self {
        let usable = segments
            .iter()
            .any(|s| s.path.len() >= 2 && !is_inactive_road(&s.road_type));
        let network = if usable {
            Self::from_segments(segments, config)
        } else {
            Self::from_zones(zones, config)
        };
        debug!(
            mode = ?network.mode,
            nodes = network.node_count(),
            edges = network.edge_count(),
            "Road network built"
        );
        network
    }

    /// Build a lattice inside every navigable zone.
    pub fn from_zones(zones: &ZoneModel, config: RoutingConfig) -> Self {
        let mut network = Self::empty(GraphMode::Grid, config);
        let step = network.config.grid_step_deg.max(1.0e-6);

        for zone in zones.zones().filter(|z| z.zone_type.is_navigable()) {
            let Some(bbox) = geo::bounding_box(&zone.polygon) else {
                continue;
            };
            let lat_steps = lattice_steps(bbox.max_lat - bbox.min_lat, step);
            let lng_steps = lattice_steps(bbox.max_lng - bbox.min_lng, step);
            for i in 0..=lat_steps {
                for j in 0..=lng_steps {
                    let point = LatLng::new(
                        f64::from(i).mul_add(step, bbox.min_lat),
                        f64::from(j).mul_add(step, bbox.min_lng),
                    );
                    if geo::contains_point(point, &zone.polygon) {
                        network.add_node(point, Some(zone.id.clone()));
                    }
                }
            }
        }

        let connect_m = network.config.grid_connect_m;
        let reference_lat = network.nodes.first().map_or(0.0, |n| n.point.lat);
        let mut hash = SpatialHash::new(connect_m, reference_lat);
        for node in &network.nodes {
            hash.insert(node.id, node.point);
        }
        let mut edges = Vec::new();
        for node in &network.nodes {
            for other in hash.candidates(node.point, connect_m) {
                if other == node.id {
                    continue;
                }
                let Some(o) = network.node(other) else {
                    continue;
                };
                let close_in_degrees = (node.point.lat - o.point.lat).abs() < 0.001
                    && (node.point.lng - o.point.lng).abs() < 0.001;
                let d = geo::distance_meters(node.point, o.point);
                if close_in_degrees && d < connect_m {
                    edges.push((node.id, other, d));
                }
            }
        }
        for (from, to, d) in edges {
            network.add_edge(from, to, d);
        }
        network
    }

    /// Build from drawn road polylines.
    pub fn from_segments(segments: &[RoadSegment], config: RoutingConfig) -> Self {
        let mut network = Self::empty(GraphMode::Polyline, config);
        let reference_lat = segments
            .iter()
            .find_map(|s| s.path.first())
            .map_or(0.0, |p| p.lat);
        let cell_m = network
            .config
            .snap_endpoint_m
            .max(network.config.snap_interior_m);
        let mut hash = SpatialHash::new(cell_m, reference_lat);

        for segment in segments {
            if segment.path.len() < 2 || is_inactive_road(&segment.road_type) {
                continue;
            }
            // Nodes this segment created may not absorb its own endpoints,
            // except the first node of a drawn loop.
            let closed_loop = segment
                .path
                .first()
                .zip(segment.path.last())
                .is_some_and(|(a, b)| geo::distance_meters(*a, *b) < network.config.snap_interior_m);
            let mut own_nodes: BTreeSet<NodeId> = BTreeSet::new();
            let mut prev: Option<NodeId> = None;
            for (index, (point, is_endpoint)) in network.densify(&segment.path).into_iter().enumerate() {
                let radius = if is_endpoint {
                    network.config.snap_endpoint_m
                } else {
                    network.config.snap_interior_m
                };
                let (cur, created) = network.snap_or_insert(&mut hash, point, radius, &own_nodes);
                if created && !(index == 0 && closed_loop) {
                    own_nodes.insert(cur);
                }
                if let Some(p) = prev.filter(|&p| p != cur) {
                    let d = network
                        .node(p)
                        .zip(network.node(cur))
                        .map_or(0.0, |(a, b)| geo::distance_meters(a.point, b.point));
                    network.add_edge(p, cur, d);
                    if !segment.one_way {
                        network.add_edge(cur, p, d);
                    }
                }
                prev = Some(cur);
            }
        }
        network
    }

    fn empty(mode: GraphMode, config: RoutingConfig) -> Self {
        Self {
            mode,
            nodes: Vec::new(),
            adjacency: Vec::new(),
            config,
        }
    }

    // -------------------------------------------------------------------
    // Construction helpers
    // -------------------------------------------------------------------

    /// Points of a polyline subdivided to at most `densify_m` apart, each
    /// flagged with whether it is the polyline's first or last point.
    fn densify(&self, path: &[LatLng]) -> Vec<(LatLng, bool)> {
        let mut out = Vec::new();
        let Some(&first) = path.first() else {
            return out;
        };
        out.push((first, true));
        let pair_count = path.len().saturating_sub(1);
        for (i, pair) in path.windows(2).enumerate() {
            let (Some(&a), Some(&b)) = (pair.first(), pair.get(1)) else {
                continue;
            };
            let d = geo::distance_meters(a, b);
            let steps = if d > self.config.densify_m {
                lattice_steps(d, self.config.densify_m.max(0.1)).max(1)
            } else {
                1
            };
            let is_last_pair = i.saturating_add(1) == pair_count;
            for k in 1..=steps {
                let point = geo::interpolate(a, b, f64::from(k) / f64::from(steps));
                out.push((point, is_last_pair && k == steps));
            }
        }
        out
    }

    /// Reuse the nearest node closer than `radius_m` that is not in
    /// `exclude`, or create one. Returns the node and whether it is new.
    fn snap_or_insert(
        &mut self,
        hash: &mut SpatialHash,
        point: LatLng,
        radius_m: f64,
        exclude: &BTreeSet<NodeId>,
    ) -> (NodeId, bool) {
        let nearest = hash
            .candidates(point, radius_m)
            .into_iter()
            .filter(|id| !exclude.contains(id))
            .filter_map(|id| {
                self.node(id)
                    .map(|n| (id, geo::distance_meters(n.point, point)))
            })
            .filter(|&(_, d)| d < radius_m)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((id, _)) = nearest {
            return (id, false);
        }
        let id = self.add_node(point, None);
        hash.insert(id, point);
        (id, true)
    }

    fn add_node(&mut self, point: LatLng, origin_zone: Option<ZoneId>) -> NodeId {
        let id = NodeId::try_from(self.nodes.len()).unwrap_or(NodeId::MAX);
        self.nodes.push(RoadNode {
            id,
            point,
            origin_zone,
        });
        self.adjacency.push(BTreeMap::new());
        id
    }

    /// Insert a directed edge. Self-loops, duplicates, and edges touching
    /// unknown nodes are ignored.
    fn add_edge(&mut self, from: NodeId, to: NodeId, weight_m: f64) {
        if from == to || self.node(to).is_none() {
            return;
        }
        if let Some(out) = self.adjacency.get_mut(from as usize) {
            out.entry(to).or_insert(weight_m);
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Construction mode.
    pub const fn mode(&self) -> GraphMode {
        self.mode
    }

    /// Construction and search tunables.
    pub const fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeMap::len).sum()
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.nodes.get(id as usize)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.nodes.iter()
    }

    /// Outgoing edges of a node as `(neighbour, weight_m)`.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adjacency
            .get(id as usize)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&to, &w)| (to, w)))
    }

    /// Whether the directed edge `from -> to` exists.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.adjacency
            .get(from as usize)
            .is_some_and(|m| m.contains_key(&to))
    }

    /// Nearest node to a point, with its distance. No distance cap; ties
    /// go to the lowest id.
    pub fn nearest_node(&self, point: LatLng) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        for node in &self.nodes {
            let d = geo::distance_meters(node.point, point);
            if best.is_none_or(|(_, b)| d < b) {
                best = Some((node.id, d));
            }
        }
        best
    }

    /// A* shortest path between two nodes with a haversine heuristic.
    ///
    /// Among open nodes with equal f-score the one discovered first is
    /// expanded first. Lowering a node's score keeps its place in that
    /// order.
    ///
    /// # Errors
    ///
    /// [`RouteError::Unreachable`] when the goal cannot be reached and
    /// [`RouteError::SearchLimit`] when the expansion cap is hit. Partial
    /// paths are never returned.
    pub fn shortest_path(&self, start: NodeId, goal: NodeId) -> Result<NodePath, RouteError> {
        let unreachable = RouteError::Unreachable {
            from: start,
            to: goal,
        };
        let (Some(_), Some(goal_node)) = (self.node(start), self.node(goal)) else {
            return Err(unreachable);
        };
        if start == goal {
            return Ok(NodePath {
                nodes: vec![start],
                cost_m: 0.0,
            });
        }
        let goal_point = goal_node.point;
        let heuristic =
            |id: NodeId| self.node(id).map_or(0.0, |n| geo::distance_meters(n.point, goal_point));

        let mut g_score: BTreeMap<NodeId, f64> = BTreeMap::new();
        let mut came_from: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut closed: BTreeSet<NodeId> = BTreeSet::new();
        let mut open = OpenSet::new();
        let mut expansions: u32 = 0;

        g_score.insert(start, 0.0);
        open.upsert(start, heuristic(start));

        while let Some(current) = open.pop() {
            if current == goal {
                let cost_m = g_score.get(&goal).copied().unwrap_or(0.0);
                return Ok(NodePath {
                    nodes: reconstruct(&came_from, start, goal),
                    cost_m,
                });
            }
            if !closed.insert(current) {
                continue;
            }
            expansions = expansions.saturating_add(1);
            if expansions > self.config.max_expansions {
                return Err(RouteError::SearchLimit { expansions });
            }

            let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);
            for (neighbor, weight) in self.neighbors(current) {
                if closed.contains(&neighbor) {
                    continue;
                }
                let tentative = current_g + weight;
                let improves = g_score
                    .get(&neighbor)
                    .is_none_or(|&existing| tentative < existing);
                if improves {
                    g_score.insert(neighbor, tentative);
                    came_from.insert(neighbor, current);
                    open.upsert(neighbor, tentative + heuristic(neighbor));
                }
            }
        }
        Err(unreachable)
    }

    /// Route from an arbitrary point to a zone's centroid.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownZone`] when the zone is not registered, plus
    /// everything [`find_path_to_point`](Self::find_path_to_point) returns.
    pub fn find_path(
        &self,
        start: LatLng,
        target: &ZoneId,
        zones: &ZoneModel,
    ) -> Result<RoutePlan, RouteError> {
        let goal = zones
            .centroid(target)
            .ok_or_else(|| RouteError::UnknownZone(target.clone()))?;
        self.find_path_to_point(start, goal)
    }

    /// Route between two arbitrary points.
    ///
    /// Both points are snapped to their nearest node regardless of distance;
    /// snaps beyond `far_snap_m` are logged and reported in the plan so
    /// callers can tell the point lies off the network.
    ///
    /// # Errors
    ///
    /// [`RouteError::EmptyNetwork`] when there are no nodes, otherwise
    /// whatever [`shortest_path`](Self::shortest_path) returns.
    pub fn find_path_to_point(&self, start: LatLng, goal: LatLng) -> Result<RoutePlan, RouteError> {
        let (start_node, start_snap_m) =
            self.nearest_node(start).ok_or(RouteError::EmptyNetwork)?;
        let (goal_node, goal_snap_m) = self.nearest_node(goal).ok_or(RouteError::EmptyNetwork)?;

        if start_snap_m > self.config.far_snap_m {
            warn!(snap_m = start_snap_m, node = start_node, "Route start is far from the road network");
        }
        if goal_snap_m > self.config.far_snap_m {
            warn!(snap_m = goal_snap_m, node = goal_node, "Route goal is far from the road network");
        }

        let path = self.shortest_path(start_node, goal_node)?;
        let waypoints = path
            .nodes
            .iter()
            .filter_map(|&id| self.node(id).map(|n| n.point))
            .collect();
        Ok(RoutePlan {
            waypoints,
            start_snap_m,
            goal_snap_m,
            length_m: path.cost_m,
        })
    }
}

/// Whether a road classification is excluded from the graph.
pub fn is_inactive_road(road_type: &str) -> bool {
    INACTIVE_ROAD_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(road_type))
}

/// Totally ordered f-score for the open set.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A* frontier ordered by (f-score, discovery order).
///
/// Each node appears at most once. A node keeps its discovery number while
/// it stays open; once popped and rediscovered it gets a new one.
struct OpenSet {
    queue: BTreeSet<(Score, u64, NodeId)>,
    entries: BTreeMap<NodeId, (Score, u64)>,
    next_seq: u64,
}

impl OpenSet {
    const fn new() -> Self {
        Self {
            queue: BTreeSet::new(),
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Add `node` or move it to a new f-score.
    fn upsert(&mut self, node: NodeId, f: f64) {
        let score = Score(f);
        let seq = self.entries.get(&node).copied().map_or_else(
            || {
                let seq = self.next_seq;
                self.next_seq = seq.saturating_add(1);
                seq
            },
            |(old, seq)| {
                self.queue.remove(&(old, seq, node));
                seq
            },
        );
        self.entries.insert(node, (score, seq));
        self.queue.insert((score, seq, node));
    }

    /// Remove and return the lowest-f, earliest-discovered node.
    fn pop(&mut self) -> Option<NodeId> {
        let (_, _, node) = self.queue.pop_first()?;
        self.entries.remove(&node);
        Some(node)
    }
}

fn reconstruct(came_from: &BTreeMap<NodeId, NodeId>, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = VecDeque::new();
    let mut current = goal;
    path.push_front(current);
    while let Some(&predecessor) = came_from.get(&current) {
        path.push_front(predecessor);
        current = predecessor;
        if current == start {
            break;
        }
    }
    path.into_iter().collect()
}

/// Whole steps of `step` in `span`, rounded up, saturating at `u32::MAX`.
fn lattice_steps(span: f64, step: f64) -> u32 {
    let n = (span / step).ceil();
    if !n.is_finite() || n <= 0.0 {
        return 0;
    }
    if n >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    // Bounded to [0, u32::MAX) above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = n as u32;
    steps
}

const fn default_grid_step_deg() -> f64 {
    0.0003
}

const fn default_grid_connect_m() -> f64 {
    80.0
}

const fn default_densify_m() -> f64 {
    5.0
}

const fn default_snap_endpoint_m() -> f64 {
    12.0
}

const fn default_snap_interior_m() -> f64 {
    1.0
}

const fn default_max_expansions() -> u32 {
    50_000
}

const fn default_far_snap_m() -> f64 {
    20.0
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use lantern_types::{Zone, ZoneType};

    use super::*;

    /// Metres of longitude per degree at 44.4 N, close enough for building
    /// test geometry.
    const M_PER_DEG_LNG: f64 = 79_500.0;
    const M_PER_DEG_LAT: f64 = 111_132.0;

    fn east_of(origin: LatLng, meters: f64) -> LatLng {
        LatLng::new(origin.lat, origin.lng + meters / M_PER_DEG_LNG)
    }

    fn north_of(origin: LatLng, meters: f64) -> LatLng {
        LatLng::new(origin.lat + meters / M_PER_DEG_LAT, origin.lng)
    }

    fn origin() -> LatLng {
        LatLng::new(44.405, 8.910)
    }

    fn segment(path: Vec<LatLng>, one_way: bool) -> RoadSegment {
        RoadSegment {
            path,
            one_way,
            road_type: "service".to_owned(),
        }
    }

    /// Build a polyline network whose nodes are exactly `points` (no
    /// densification) and whose edges are the given undirected pairs.
    fn explicit_graph(points: &[LatLng], pairs: &[(usize, usize)]) -> RoadNetwork {
        let config = RoutingConfig {
            densify_m: 1.0e9,
            snap_endpoint_m: 0.01,
            snap_interior_m: 0.01,
            ..RoutingConfig::default()
        };
        let segments: Vec<RoadSegment> = pairs
            .iter()
            .map(|&(a, b)| segment(vec![points[a], points[b]], false))
            .collect();
        RoadNetwork::from_segments(&segments, config)
    }

    #[test]
    fn densifies_long_pairs() {
        let a = origin();
        let b = east_of(a, 23.0);
        let net = RoadNetwork::from_segments(&[segment(vec![a, b], false)], RoutingConfig::default());
        // ceil(23 / 5) = 5 steps -> 6 nodes, 5 pairs, both directions.
        assert_eq!(net.node_count(), 6);
        assert_eq!(net.edge_count(), 10);
        assert_eq!(net.mode(), GraphMode::Polyline);
    }

    #[test]
    fn one_way_segments_merge_at_shared_endpoint() {
        let a = origin();
        let b = east_of(a, 10.0);
        // Second segment starts 4 m past the first one's end, on the same line.
        let b2 = east_of(a, 14.0);
        let c = east_of(a, 24.0);
        let segments = [segment(vec![a, b], true), segment(vec![b2, c], true)];
        let net = RoadNetwork::from_segments(&segments, RoutingConfig::default());

        // Segment 1: a + 2 steps = 3 nodes. Segment 2 snaps b2 onto b, then
        // adds 2 steps = 2 new nodes.
        assert_eq!(net.node_count(), 5);
        let (b_node, _) = net.nearest_node(b).unwrap();
        let (b2_node, _) = net.nearest_node(b2).unwrap();
        assert_eq!(b_node, b2_node);

        // Forward only: 4 directed edges along the chain.
        assert_eq!(net.edge_count(), 4);
        let (a_node, _) = net.nearest_node(a).unwrap();
        let (c_node, _) = net.nearest_node(c).unwrap();
        for node in net.nodes() {
            for (to, _) in net.neighbors(node.id) {
                assert!(!net.has_edge(to, node.id), "reverse edge {to}->{}", node.id);
            }
        }
        assert!(net.shortest_path(a_node, c_node).is_ok());
        assert!(net.shortest_path(c_node, a_node).is_err());
    }

    #[test]
    fn interior_points_do_not_snap_loosely() {
        // Two parallel roads 3 m apart only merge at endpoints, never midway.
        let a = origin();
        let b = east_of(a, 40.0);
        let a2 = north_of(a, 3.0);
        let b2 = east_of(a2, 40.0);
        let net = RoadNetwork::from_segments(
            &[segment(vec![a, b], false), segment(vec![a2, b2], false)],
            RoutingConfig::default(),
        );
        // Each road: 9 nodes. Endpoints of road 2 snap onto road 1 (3 m < 12 m),
        // interior points (3 m > 1 m) do not.
        assert_eq!(net.node_count(), 9 + 7);
    }

    #[test]
    fn duplicate_edges_suppressed() {
        let a = origin();
        let b = east_of(a, 4.0);
        let net = RoadNetwork::from_segments(
            &[segment(vec![a, b], false), segment(vec![a, b], false)],
            RoutingConfig::default(),
        );
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn inactive_roads_skipped() {
        let a = origin();
        let b = east_of(a, 4.0);
        let mut seg = segment(vec![a, b], false);
        seg.road_type = "Construction".to_owned();
        let net = RoadNetwork::from_segments(&[seg], RoutingConfig::default());
        assert_eq!(net.node_count(), 0);
        assert!(is_inactive_road("rail"));
        assert!(!is_inactive_road("primary"));
    }

    #[test]
    fn improved_open_node_keeps_discovery_order() {
        let mut open = OpenSet::new();
        open.upsert(7, 40.0);
        open.upsert(3, 25.0);
        // Node 7 drops to a tie with node 3 and still goes first.
        open.upsert(7, 25.0);
        assert_eq!(open.pop(), Some(7));
        assert_eq!(open.pop(), Some(3));
        assert_eq!(open.pop(), None);

        // Rediscovered after popping: queued behind everything open.
        open.upsert(1, 5.0);
        open.upsert(7, 5.0);
        assert_eq!(open.pop(), Some(1));
        assert_eq!(open.pop(), Some(7));
    }

    #[test]
    fn astar_prefers_cheaper_detour() {
        // Square a-b-c-d with a long direct a-c diagonal replaced by a
        // far-out bend e: a-e-c costs more than a-b-c.
        let a = origin();
        let b = east_of(a, 50.0);
        let c = north_of(b, 50.0);
        let e = north_of(east_of(a, -200.0), 200.0);
        let points = [a, b, c, e];
        let net = explicit_graph(&points, &[(0, 1), (1, 2), (0, 3), (3, 2)]);
        let path = net.shortest_path(0, 2).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert!((path.cost_m - 100.0).abs() < 2.0, "cost {}", path.cost_m);
    }

    #[test]
    fn astar_matches_brute_force() {
        // 5x5 lattice with irregular spacing and a few missing links.
        let mut points = Vec::new();
        for i in 0..5_u32 {
            for j in 0..5_u32 {
                let jitter = f64::from((i * 7 + j * 3) % 5);
                points.push(north_of(
                    east_of(origin(), f64::from(j) * 30.0 + jitter),
                    f64::from(i) * 25.0 + jitter,
                ));
            }
        }
        let mut pairs = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let k = i * 5 + j;
                if j < 4 && (i + j) % 4 != 1 {
                    pairs.push((k, k + 1));
                }
                if i < 4 && (i * j) % 3 != 2 {
                    pairs.push((k, k + 5));
                }
            }
        }
        let net = explicit_graph(&points, &pairs);
        assert_eq!(net.node_count(), 25);

        let brute = floyd_warshall(&net);
        for s in 0..25_u32 {
            for t in 0..25_u32 {
                let expected = brute[s as usize][t as usize];
                match net.shortest_path(s, t) {
                    Ok(p) => assert!(
                        (p.cost_m - expected).abs() < 1e-6,
                        "{s}->{t}: astar {} brute {expected}",
                        p.cost_m
                    ),
                    Err(_) => assert!(expected.is_infinite(), "{s}->{t} should be reachable"),
                }
            }
        }
    }

    fn floyd_warshall(net: &RoadNetwork) -> Vec<Vec<f64>> {
        let n = net.node_count();
        let mut d = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in d.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        for node in net.nodes() {
            for (to, w) in net.neighbors(node.id) {
                let cell = &mut d[node.id as usize][to as usize];
                *cell = cell.min(w);
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let via = d[i][k] + d[k][j];
                    if via < d[i][j] {
                        d[i][j] = via;
                    }
                }
            }
        }
        d
    }

    #[test]
    fn search_limit_is_enforced() {
        let a = origin();
        let far = east_of(a, 500.0);
        let config = RoutingConfig {
            max_expansions: 3,
            ..RoutingConfig::default()
        };
        let net = RoadNetwork::from_segments(&[segment(vec![a, far], false)], config);
        let (s, _) = net.nearest_node(a).unwrap();
        let (t, _) = net.nearest_node(far).unwrap();
        assert!(matches!(
            net.shortest_path(s, t),
            Err(RouteError::SearchLimit { .. })
        ));
    }

    #[test]
    fn grid_mode_covers_navigable_zones_only() {
        let road = Zone {
            id: ZoneId::from("ROAD_1"),
            zone_type: ZoneType::Road,
            polygon: vec![
                origin(),
                east_of(origin(), 120.0),
                north_of(east_of(origin(), 120.0), 60.0),
                north_of(origin(), 60.0),
            ],
            description: None,
        };
        let mut block = road.clone();
        block.id = ZoneId::from("BLOCK_X");
        block.zone_type = ZoneType::Standard;
        let zones = ZoneModel::from_zones([road, block]).unwrap();

        let net = RoadNetwork::build(&zones, &[], RoutingConfig::default());
        assert_eq!(net.mode(), GraphMode::Grid);
        assert!(net.node_count() > 0);
        assert!(
            net.nodes()
                .all(|n| n.origin_zone.as_ref().is_some_and(|z| z.as_str() == "ROAD_1"))
        );
        // Every edge is shorter than the connect radius and never a self-loop.
        for node in net.nodes() {
            for (to, w) in net.neighbors(node.id) {
                assert_ne!(to, node.id);
                assert!(w < 80.0);
            }
        }
        let plan = net.find_path(origin(), &ZoneId::from("ROAD_1"), &zones);
        assert!(plan.is_ok());
    }

    #[test]
    fn empty_network_reports_error() {
        let net = RoadNetwork::from_segments(&[], RoutingConfig::default());
        assert!(matches!(
            net.find_path_to_point(origin(), east_of(origin(), 5.0)),
            Err(RouteError::EmptyNetwork)
        ));
    }

    #[test]
    fn unknown_target_zone() {
        let net = RoadNetwork::from_segments(&[], RoutingConfig::default());
        let zones = ZoneModel::new();
        assert!(matches!(
            net.find_path(origin(), &ZoneId::from("NOWHERE"), &zones),
            Err(RouteError::UnknownZone(_))
        ));
    }
}

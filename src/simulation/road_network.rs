//! Road network graph for pathfinding
//!
//! The graph is rebuilt from the live city and road tables on every query,
//! so it always reflects the current topology and congestion and keeps no
//! state between queries.

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::config::CongestionModel;
use super::world::{CityTable, RoadTable};

/// Shortest road length used in cost and movement math
pub(crate) const MIN_ROAD_LENGTH: f64 = 1e-6;

/// Where a generated trip should end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Any city other than the source, picked uniformly
    Random,
    City(String),
}

/// Congestion-weighted cost of a road: free-flow travel time scaled by the
/// local vehicle density.
///
/// Roads without a positive speed limit cost infinity and are left out of
/// path search.
pub fn congestion_weight(
    distance: f64,
    max_speed: f64,
    vehicles: usize,
    model: &CongestionModel,
) -> f64 {
    if max_speed <= 0.0 || max_speed.is_nan() {
        return f64::INFINITY;
    }
    let distance = distance.max(MIN_ROAD_LENGTH);
    let travel_time = model.free_flow_scale * distance / max_speed;
    let density = vehicles as f64 * model.density_scale / distance;
    model.base_cost + travel_time * density
}

/// Directed, weighted view of the network. Nodes carry the index of their
/// city in the city table.
pub(crate) struct RoadGraph {
    graph: DiGraph<usize, f64>,
    nodes: Vec<NodeIndex>,
}

impl RoadGraph {
    pub(crate) fn build(cities: &CityTable, roads: &RoadTable) -> Self {
        let mut graph = DiGraph::with_capacity(cities.len(), roads.len());
        let nodes: Vec<NodeIndex> = (0..cities.len()).map(|index| graph.add_node(index)).collect();

        for road in roads.iter() {
            let (Some(src), Some(dst)) = (
                cities.index_of(road.src_name()),
                cities.index_of(road.dst_name()),
            ) else {
                continue;
            };
            let weight = road.weight();
            if !weight.is_finite() || weight < 0.0 {
                continue;
            }
            graph.add_edge(nodes[src], nodes[dst], weight);
        }

        Self { graph, nodes }
    }

    /// Finds the cheapest path using A* (Dijkstra with null heuristic).
    /// Returns city indices from `from` to `to`, both included.
    pub(crate) fn shortest_path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        let start = *self.nodes.get(from)?;
        let goal = *self.nodes.get(to)?;

        let (_, node_path) = astar(
            &self.graph,
            start,
            |node| node == goal,
            |edge| *edge.weight(),
            |_| 0.0, // Null heuristic = Dijkstra
        )?;

        Some(node_path.into_iter().map(|node| self.graph[node]).collect())
    }
}

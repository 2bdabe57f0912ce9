//! A* search for single-net routing.
//!
//! Finds the lowest-cost path from a driver pin to a sink pin through the
//! device routing graph. The cost function includes wire delay, history
//! penalty, and congestion penalty from the [`CongestionMap`].

use crate::route_tree::{RouteNode, RouteResource, RouteTree};
use crate::routing::congestion::CongestionMap;
use aion_arch::ids::WireId;
use aion_arch::types::RoutingGraph;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A search state in the A* priority queue.
#[derive(Debug, Clone)]
struct AStarState {
    /// The wire currently being explored.
    wire: WireId,
    /// Total cost from start to this wire (g-score).
    cost: f64,
    /// Estimated total cost including heuristic (f-score = g + h).
    estimated_total: f64,
}

impl PartialEq for AStarState {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_total == other.estimated_total
    }
}

impl Eq for AStarState {}

impl Ord for AStarState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default)
        other
            .estimated_total
            .partial_cmp(&self.estimated_total)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for AStarState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds a route from `start_wire` to `end_wire` using A* search.
///
/// Returns a [`RouteTree`] representing the path, or `None` if no route
/// exists. Uses the routing graph's wire and PIP connectivity, with costs
/// from the congestion map. Callers are responsible for resolving site
/// pins to routing-graph wires (via [`aion_arch::Architecture::site_routing_wire`]
/// or an equivalent site-pin lookup) before calling this.
pub(crate) fn astar_route(
    routing_graph: &RoutingGraph,
    congestion: &CongestionMap,
    start_wire: WireId,
    end_wire: WireId,
) -> Option<RouteTree> {
    if routing_graph.wires.is_empty() {
        // No routing graph available — return stub
        return Some(RouteTree::stub());
    }

    // Build adjacency from PIPs
    let mut adjacency: HashMap<WireId, Vec<(WireId, f64)>> = HashMap::new();
    for pip in &routing_graph.pips {
        let base_cost = pip.delay.max_ns + congestion.wire_cost(pip.dst_wire);
        adjacency
            .entry(pip.src_wire)
            .or_default()
            .push((pip.dst_wire, base_cost));
    }

    // A* search
    let mut open = BinaryHeap::new();
    let mut g_scores: HashMap<WireId, f64> = HashMap::new();
    let mut came_from: HashMap<WireId, WireId> = HashMap::new();

    g_scores.insert(start_wire, 0.0);
    open.push(AStarState {
        wire: start_wire,
        cost: 0.0,
        estimated_total: heuristic(start_wire, end_wire),
    });

    while let Some(current) = open.pop() {
        if current.wire == end_wire {
            // Reconstruct path
            return Some(reconstruct_path(&came_from, start_wire, end_wire));
        }

        let current_g = *g_scores.get(&current.wire).unwrap_or(&f64::INFINITY);
        if current.cost > current_g {
            continue; // Stale entry
        }

        if let Some(neighbors) = adjacency.get(&current.wire) {
            for &(next_wire, edge_cost) in neighbors {
                let tentative_g = current_g + edge_cost;
                if tentative_g < *g_scores.get(&next_wire).unwrap_or(&f64::INFINITY) {
                    g_scores.insert(next_wire, tentative_g);
                    came_from.insert(next_wire, current.wire);
                    open.push(AStarState {
                        wire: next_wire,
                        cost: tentative_g,
                        estimated_total: tentative_g + heuristic(next_wire, end_wire),
                    });
                }
            }
        }
    }

    None // No path found
}

/// Manhattan distance heuristic between two wire IDs (synthetic coordinates).
fn heuristic(from: WireId, to: WireId) -> f64 {
    let dx = (from.as_raw() as i64 - to.as_raw() as i64).unsigned_abs();
    dx as f64 * 0.1 // Scale factor for heuristic
}

/// Reconstructs the route tree from the came_from map.
fn reconstruct_path(came_from: &HashMap<WireId, WireId>, start: WireId, end: WireId) -> RouteTree {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();

    // Build route tree from path
    let mut root = RouteNode {
        resource: RouteResource::Wire(path[0]),
        children: Vec::new(),
    };

    let mut current_node = &mut root;
    for &wire in &path[1..] {
        let child = RouteNode {
            resource: RouteResource::Wire(wire),
            children: Vec::new(),
        };
        current_node.children.push(child);
        current_node = current_node.children.last_mut().unwrap();
    }

    RouteTree::new(root)
}

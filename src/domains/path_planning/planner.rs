use super::interpolate::{interpolate, interpolate_route};
use super::types::{Path, PlanningAlgorithm, Route};
use crate::domains::mapping::{MapGraph, MapNode};
use crate::domains::world::{Coordinate, ObservationWindow};
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct RoutePlanner {
    algorithm: PlanningAlgorithm,
}

impl RoutePlanner {
    pub fn new(algorithm: PlanningAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> PlanningAlgorithm {
        self.algorithm
    }

    /// Minimum-cost node sequence between two existing graph nodes.
    pub fn shortest_route(&self, graph: &MapGraph, start: Coordinate, goal: Coordinate) -> Option<Route> {
        let from = graph.index_of(&start)?;
        let to = graph.index_of(&goal)?;
        let inner = graph.inner();
        let (cost, indices) = match self.algorithm {
            PlanningAlgorithm::Dijkstra => dijkstra(inner, from, to)?,
            PlanningAlgorithm::AStar => astar(
                inner,
                from,
                |n| n == to,
                |e| *e.weight(),
                |n| inner[n].coordinate.chebyshev(&goal),
            )?,
        };
        Some(Route {
            nodes: indices.into_iter().map(|i| inner[i].coordinate).collect(),
            cost,
        })
    }

    /// Single-step path from `start` to `goal` through the map graph.
    ///
    /// When `start` is not a node yet, the path first walks to the closest
    /// Free node visible in `window` and plans from there. Returns an empty
    /// path when the goal is unknown or unreachable.
    pub fn plan(
        &self,
        graph: &MapGraph,
        start: Coordinate,
        goal: Coordinate,
        window: &ObservationWindow,
    ) -> Path {
        if start == goal || !graph.node_exists(&goal) {
            return Path::default();
        }
        if graph.node_exists(&start) {
            return match self.shortest_route(graph, start, goal) {
                Some(route) => Path::new(goal, interpolate_route(&route.nodes)),
                None => Path::default(),
            };
        }
        let Some(entry) = graph.closest_free_node(&start, window) else {
            return Path::default();
        };
        let tail = self.plan(graph, entry, goal, window);
        if tail.is_empty() && entry != goal {
            return Path::default();
        }
        let mut steps = interpolate(start, entry);
        steps.extend(tail.steps);
        Path::new(goal, steps)
    }
}

/// Dijkstra over the undirected map graph. Equal-cost entries leave the heap
/// in the order they were pushed.
fn dijkstra(
    graph: &UnGraph<MapNode, u32>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<(u32, Vec<NodeIndex>)> {
    let mut dist: HashMap<NodeIndex, u32> = HashMap::new();
    let mut prev: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq: u64 = 0;

    dist.insert(start, 0);
    heap.push(Reverse((0u32, seq, start.index())));

    while let Some(Reverse((cost, _, raw))) = heap.pop() {
        let node = NodeIndex::new(raw);
        if node == goal {
            let mut nodes = vec![goal];
            let mut cursor = goal;
            while let Some(&p) = prev.get(&cursor) {
                nodes.push(p);
                cursor = p;
            }
            nodes.reverse();
            return Some((cost, nodes));
        }
        if dist.get(&node).is_some_and(|&d| cost > d) {
            continue;
        }
        for edge in graph.edges(node) {
            let next = if edge.source() == node { edge.target() } else { edge.source() };
            let next_cost = cost + *edge.weight();
            if dist.get(&next).map_or(true, |&d| next_cost < d) {
                dist.insert(next, next_cost);
                prev.insert(next, node);
                seq += 1;
                heap.push(Reverse((next_cost, seq, next.index())));
            }
        }
    }
    None
}

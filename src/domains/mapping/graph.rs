use crate::domains::world::{Coordinate, NodeKind, ObservationWindow};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub coordinate: Coordinate,
    pub kind: NodeKind,
}

/// Map of the explored area. One node per discovered coordinate, undirected
/// edges weighted with the traversal cost between their endpoints.
///
/// Nodes are never removed, so petgraph indices stay valid for the lifetime
/// of the graph and the coordinate index never goes stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "MapGraphRepr", into = "MapGraphRepr")]
pub struct MapGraph {
    graph: UnGraph<MapNode, u32>,
    index: HashMap<Coordinate, NodeIndex>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph holding a single Free node where the agent starts.
    pub fn seeded(at: Coordinate) -> Self {
        let mut graph = Self::new();
        graph.add_node(at, NodeKind::Free);
        graph
    }

    /// Insert a node, or refine an existing Free node to `kind`. A node that
    /// already has a specific kind keeps it.
    pub fn add_node(&mut self, coordinate: Coordinate, kind: NodeKind) -> NodeIndex {
        if let Some(&idx) = self.index.get(&coordinate) {
            let node = &mut self.graph[idx];
            if node.kind.is_free() && !kind.is_free() {
                node.kind = kind;
            }
            return idx;
        }
        let idx = self.graph.add_node(MapNode { coordinate, kind });
        self.index.insert(coordinate, idx);
        idx
    }

    /// Connect `a` and `b`, creating Free endpoints as needed.
    pub fn add_edge(&mut self, a: Coordinate, b: Coordinate) {
        if a == b {
            return;
        }
        let ia = self.add_node(a, NodeKind::Free);
        let ib = self.add_node(b, NodeKind::Free);
        self.graph.update_edge(ia, ib, a.traversal_cost(&b));
    }

    pub fn node_exists(&self, coordinate: &Coordinate) -> bool {
        self.index.contains_key(coordinate)
    }

    pub fn node_kind(&self, coordinate: &Coordinate) -> Option<&NodeKind> {
        self.index.get(coordinate).map(|&idx| &self.graph[idx].kind)
    }

    pub fn edge_cost(&self, a: &Coordinate, b: &Coordinate) -> Option<u32> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        self.graph.find_edge(ia, ib).map(|e| self.graph[e])
    }

    pub fn neighbours(&self, coordinate: &Coordinate) -> Vec<(Coordinate, u32)> {
        let Some(&idx) = self.index.get(coordinate) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (self.graph[other].coordinate, *e.weight())
            })
            .collect()
    }

    /// Degrade a target node back to Free once its target is gone. The node
    /// and its edges stay so connectivity is preserved.
    pub fn mark_free(&mut self, coordinate: &Coordinate) {
        if let Some(&idx) = self.index.get(coordinate) {
            self.graph[idx].kind = NodeKind::Free;
        }
    }

    /// The Free node cheapest to reach from `from`, considering only nodes
    /// inside the current observation window.
    pub fn closest_free_node(
        &self,
        from: &Coordinate,
        window: &ObservationWindow,
    ) -> Option<Coordinate> {
        let mut best: Option<(u32, Coordinate)> = None;
        for node in self.graph.node_weights() {
            if !node.kind.is_free() || !window.contains(&node.coordinate) {
                continue;
            }
            let cost = from.traversal_cost(&node.coordinate);
            if best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, node.coordinate));
            }
        }
        best.map(|(_, c)| c)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.graph.node_weights()
    }

    /// Every edge as `(a, b, cost)`, in insertion order.
    pub fn edges(&self) -> Vec<(Coordinate, Coordinate, u32)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].coordinate,
                    self.graph[e.target()].coordinate,
                    *e.weight(),
                )
            })
            .collect()
    }

    pub(crate) fn inner(&self) -> &UnGraph<MapNode, u32> {
        &self.graph
    }

    pub(crate) fn index_of(&self, coordinate: &Coordinate) -> Option<NodeIndex> {
        self.index.get(coordinate).copied()
    }
}

/// Wire form of the graph. Decoding replays every node and edge through
/// `add_node`/`add_edge`, so a hand-edited blob still yields a graph with
/// unique nodes and symmetric, correctly weighted edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapGraphRepr {
    nodes: Vec<MapNode>,
    edges: Vec<(Coordinate, Coordinate)>,
}

impl From<MapGraphRepr> for MapGraph {
    fn from(repr: MapGraphRepr) -> Self {
        let mut graph = MapGraph::new();
        for node in repr.nodes {
            graph.add_node(node.coordinate, node.kind);
        }
        for (a, b) in repr.edges {
            graph.add_edge(a, b);
        }
        graph
    }
}

impl From<MapGraph> for MapGraphRepr {
    fn from(graph: MapGraph) -> Self {
        MapGraphRepr {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().into_iter().map(|(a, b, _)| (a, b)).collect(),
        }
    }
}

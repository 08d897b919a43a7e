use super::graph::MapGraph;
use crate::domains::world::{Coordinate, NodeKind};
use serde::{Deserialize, Serialize};

/// Grows a [`MapGraph`] from the agent's own trajectory.
///
/// Only direction changes produce nodes: while the agent keeps moving along
/// the line through `edge_start` and its current position, the straight
/// segment is the (implicit) edge. When the previous position falls off that
/// line, it becomes a node, the segment is committed as an edge and the
/// next segment starts there. Edge count therefore tracks turns, not ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphBuilder {
    edge_start: Option<Coordinate>,
    previous: Option<Coordinate>,
}

impl GraphBuilder {
    pub fn starting_at(start: Coordinate) -> Self {
        Self { edge_start: Some(start), previous: Some(start) }
    }

    pub fn edge_start(&self) -> Option<Coordinate> {
        self.edge_start
    }

    pub fn previous(&self) -> Option<Coordinate> {
        self.previous
    }

    /// Feed this tick's position. Returns the turn point when a segment was
    /// committed.
    pub fn record_position(&mut self, graph: &mut MapGraph, current: Coordinate) -> Option<Coordinate> {
        let Some(start) = self.edge_start else {
            graph.add_node(current, NodeKind::Free);
            self.edge_start = Some(current);
            self.previous = Some(current);
            return None;
        };
        let previous = self.previous.replace(current).unwrap_or(start);
        if previous == current || is_collinear(start, current, previous) {
            return None;
        }
        graph.add_node(previous, NodeKind::Free);
        graph.add_edge(start, previous);
        self.edge_start = Some(previous);
        Some(previous)
    }

    /// Commit the implicit segment ending at `current` so `current` becomes a
    /// graph node. `edge_start` is left where it is.
    pub fn anchor(&self, graph: &mut MapGraph, current: Coordinate) {
        graph.add_node(current, NodeKind::Free);
        if let Some(start) = self.edge_start {
            graph.add_edge(start, current);
        }
    }

    /// Record a freshly observed target: make sure the agent's position is in
    /// the graph, then hang the target off it.
    pub fn connect_target(
        &self,
        graph: &mut MapGraph,
        current: Coordinate,
        target: Coordinate,
        kind: NodeKind,
    ) {
        if !graph.node_exists(&current) {
            self.anchor(graph, current);
        }
        graph.add_node(target, kind);
        graph.add_edge(current, target);
    }
}

/// Whether `point` lies on the line through `start` and `end`.
fn is_collinear(start: Coordinate, end: Coordinate, point: Coordinate) -> bool {
    let norm_x = i64::from(start.y) - i64::from(end.y);
    let norm_y = i64::from(end.x) - i64::from(start.x);
    let d = norm_x * i64::from(start.x) + norm_y * i64::from(start.y);
    norm_x * i64::from(point.x) + norm_y * i64::from(point.y) == d
}

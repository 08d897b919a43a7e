use crate::domains::world::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanningAlgorithm {
    #[default]
    Dijkstra,
    AStar,
}

/// Sparse result of a graph search: the graph nodes visited and the summed
/// edge cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub nodes: Vec<Coordinate>,
    pub cost: u32,
}

/// Single-step moves still to be taken towards `goal`, consumed from the
/// front. An empty path means "no plan, replan at the next opportunity".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub goal: Option<Coordinate>,
    pub steps: VecDeque<Coordinate>,
    /// Where the agent should be if the last emitted step succeeded.
    pub expected: Option<Coordinate>,
}

impl Path {
    pub fn new(goal: Coordinate, steps: impl IntoIterator<Item = Coordinate>) -> Self {
        Self { goal: Some(goal), steps: steps.into_iter().collect(), expected: None }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn clear(&mut self) {
        self.goal = None;
        self.steps.clear();
        self.expected = None;
    }

    /// Take the next step and remember it as the expected position.
    pub fn advance(&mut self) -> Option<Coordinate> {
        let next = self.steps.pop_front()?;
        self.expected = Some(next);
        Some(next)
    }

    /// A path is usable when it leads to `goal` and the agent actually stands
    /// where the previous step should have taken it.
    pub fn is_valid_for(&self, goal: &Coordinate, position: &Coordinate) -> bool {
        !self.steps.is_empty()
            && self.goal.as_ref() == Some(goal)
            && self.expected.map_or(true, |e| e == *position)
    }
}

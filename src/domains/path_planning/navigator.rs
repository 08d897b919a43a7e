use super::planner::RoutePlanner;
use super::types::Path;
use crate::domains::mapping::{GraphBuilder, MapGraph};
use crate::domains::world::{Coordinate, ObservationWindow};
use rand::seq::SliceRandom;
use rand::Rng;

/// Turns a goal into this tick's step.
pub struct Navigator<'a> {
    planner: &'a RoutePlanner,
}

impl<'a> Navigator<'a> {
    pub fn new(planner: &'a RoutePlanner) -> Self {
        Self { planner }
    }

    /// Next cell to step to on the way to `goal`, or `None` when boxed in.
    ///
    /// A goal inside the window is approached greedily, which reacts to
    /// obstacles the graph does not know about yet. Otherwise the in-flight
    /// path is followed; it is rebuilt from the true position when the goal
    /// changed or the last step did not land where expected. A goal the graph
    /// cannot route to yet (learned from a peer, say) is approached greedily.
    pub fn next_step<R: Rng + ?Sized>(
        &self,
        graph: &mut MapGraph,
        builder: &GraphBuilder,
        window: &ObservationWindow,
        position: Coordinate,
        goal: Coordinate,
        path: &mut Path,
        rng: &mut R,
    ) -> Option<Coordinate> {
        if window.contains(&goal) {
            path.clear();
            return greedy_step(window, position, goal, rng);
        }

        if !path.is_valid_for(&goal, &position) {
            builder.anchor(graph, position);
            *path = self.planner.plan(graph, position, goal, window);
        }

        match path.advance() {
            Some(next) if next.is_adjacent(&position) && window.is_walkable(&next) => Some(next),
            Some(_) => {
                path.clear();
                random_step(window, position, rng)
            }
            None => greedy_step(window, position, goal, rng),
        }
    }
}

/// Straight towards `goal` when that cell is free, else a random neighbour.
fn greedy_step<R: Rng + ?Sized>(
    window: &ObservationWindow,
    position: Coordinate,
    goal: Coordinate,
    rng: &mut R,
) -> Option<Coordinate> {
    let step = position.step_towards(&goal);
    if window.is_walkable(&step) {
        return Some(step);
    }
    random_step(window, position, rng)
}

/// Uniformly random walkable neighbour.
pub fn random_step<R: Rng + ?Sized>(
    window: &ObservationWindow,
    position: Coordinate,
    rng: &mut R,
) -> Option<Coordinate> {
    window.walkable_neighbours(&position).choose(rng).copied()
}

/// Exploration move: keep the current heading while the cell ahead is free,
/// otherwise turn to a random free neighbour and adopt its direction.
pub fn explore_step<R: Rng + ?Sized>(
    window: &ObservationWindow,
    position: Coordinate,
    heading: &mut Option<(i32, i32)>,
    rng: &mut R,
) -> Option<Coordinate> {
    if let Some((dx, dy)) = *heading {
        let ahead = position.offset(dx, dy);
        if window.is_walkable(&ahead) {
            return Some(ahead);
        }
    }
    let next = random_step(window, position, rng);
    *heading = next.map(|n| (n.x - position.x, n.y - position.y));
    next
}

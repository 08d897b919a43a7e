use packet_courier::domains::mapping::{GraphBuilder, MapGraph};
use packet_courier::domains::path_planning::{
    explore_step, interpolate, Navigator, Path, PlanningAlgorithm, RoutePlanner,
};
use packet_courier::domains::world::{Cell, Coordinate, ObservationWindow};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

/// A small map with a cheap detour and an expensive shortcut-free branch.
fn sample_graph() -> MapGraph {
    let mut graph = MapGraph::seeded(c(0, 0));
    graph.add_edge(c(0, 0), c(0, 4));
    graph.add_edge(c(0, 4), c(4, 4));
    graph.add_edge(c(0, 0), c(6, 0));
    graph.add_edge(c(6, 0), c(4, 4));
    graph.add_edge(c(4, 4), c(8, 8));
    graph.add_node(c(20, 20), Default::default());
    graph
}

#[test]
fn test_interpolate_steps_are_unit_and_end_at_target() {
    let pairs = [
        (c(0, 0), c(5, 2)),
        (c(3, 3), c(-1, 7)),
        (c(2, -4), c(2, 3)),
        (c(-6, 0), c(0, 0)),
        (c(1, 1), c(-3, -3)),
    ];
    for (a, b) in pairs {
        let steps = interpolate(a, b);
        assert_eq!(steps.last(), Some(&b));
        assert_eq!(steps.len() as u32, a.chebyshev(&b));
        let mut previous = a;
        for step in steps {
            assert_eq!(previous.chebyshev(&step), 1, "{a} -> {b}");
            previous = step;
        }
    }
    assert!(interpolate(c(4, 4), c(4, 4)).is_empty());
}

#[test]
fn test_dijkstra_finds_cheapest_route() {
    let planner = RoutePlanner::new(PlanningAlgorithm::Dijkstra);
    let route = planner.shortest_route(&sample_graph(), c(0, 0), c(8, 8)).unwrap();
    assert_eq!(route.nodes, vec![c(0, 0), c(0, 4), c(4, 4), c(8, 8)]);
    assert_eq!(route.cost, 12);
}

#[test]
fn test_astar_agrees_with_dijkstra_on_cost() {
    let graph = sample_graph();
    let dijkstra = RoutePlanner::new(PlanningAlgorithm::Dijkstra);
    let astar = RoutePlanner::new(PlanningAlgorithm::AStar);
    for goal in [c(8, 8), c(6, 0), c(4, 4)] {
        let a = dijkstra.shortest_route(&graph, c(0, 0), goal).unwrap();
        let b = astar.shortest_route(&graph, c(0, 0), goal).unwrap();
        assert_eq!(a.cost, b.cost, "goal {goal}");
    }
}

#[test]
fn test_plan_cost_is_never_below_chebyshev_distance() {
    let graph = sample_graph();
    let planner = RoutePlanner::default();
    let window = ObservationWindow::open_around(c(0, 0), 3);
    for goal in [c(0, 4), c(4, 4), c(6, 0), c(8, 8)] {
        let path = planner.plan(&graph, c(0, 0), goal, &window);
        assert!(path.len() as u32 >= c(0, 0).chebyshev(&goal));
        assert_eq!(path.steps.back(), Some(&goal));
        let route = planner.shortest_route(&graph, c(0, 0), goal).unwrap();
        assert!(route.cost >= c(0, 0).chebyshev(&goal));
    }
}

#[test]
fn test_unknown_or_unreachable_goal_gives_empty_path() {
    let graph = sample_graph();
    let planner = RoutePlanner::default();
    let window = ObservationWindow::open_around(c(0, 0), 3);
    assert!(planner.plan(&graph, c(0, 0), c(30, 30), &window).is_empty());
    assert!(planner.plan(&graph, c(0, 0), c(20, 20), &window).is_empty());
    assert!(planner.plan(&graph, c(0, 0), c(0, 0), &window).is_empty());
}

#[test]
fn test_off_graph_start_routes_through_closest_free_node() {
    let graph = sample_graph();
    let planner = RoutePlanner::default();
    let start = c(1, 1);
    let window = ObservationWindow::open_around(start, 3);

    let path = planner.plan(&graph, start, c(4, 4), &window);
    assert!(!path.is_empty());
    // (0,0) is the nearest Free node in view
    assert_eq!(path.steps.front(), Some(&c(0, 0)));
    assert_eq!(path.steps.back(), Some(&c(4, 4)));
}

#[test]
fn test_navigator_steps_greedily_inside_window() {
    let planner = RoutePlanner::default();
    let navigator = Navigator::new(&planner);
    let mut graph = MapGraph::seeded(c(0, 0));
    let builder = GraphBuilder::starting_at(c(0, 0));
    let window = ObservationWindow::open_around(c(0, 0), 3);
    let mut path = Path::default();
    let mut rng = StdRng::seed_from_u64(1);

    let step = navigator.next_step(&mut graph, &builder, &window, c(0, 0), c(3, 2), &mut path, &mut rng);
    assert_eq!(step, Some(c(1, 1)));
}

#[test]
fn test_navigator_falls_back_to_random_when_greedy_cell_blocked() {
    let planner = RoutePlanner::default();
    let navigator = Navigator::new(&planner);
    let mut graph = MapGraph::seeded(c(0, 0));
    let builder = GraphBuilder::starting_at(c(0, 0));
    let mut window = ObservationWindow::open_around(c(0, 0), 3);
    window.set_cell(c(1, 1), Some(Cell::wall()));
    let mut path = Path::default();
    let mut rng = StdRng::seed_from_u64(3);

    let step = navigator
        .next_step(&mut graph, &builder, &window, c(0, 0), c(3, 2), &mut path, &mut rng)
        .unwrap();
    assert_ne!(step, c(1, 1));
    assert!(step.is_adjacent(&c(0, 0)));
}

#[test]
fn test_navigator_replans_when_last_step_failed() {
    let planner = RoutePlanner::default();
    let navigator = Navigator::new(&planner);
    let mut graph = MapGraph::seeded(c(0, 0));
    graph.add_edge(c(0, 0), c(10, 0));
    graph.add_edge(c(0, 0), c(0, 1));
    let builder = GraphBuilder::starting_at(c(0, 0));
    let window = ObservationWindow::open_around(c(0, 0), 2);
    let mut rng = StdRng::seed_from_u64(5);

    let mut path = Path::default();
    let first = navigator.next_step(&mut graph, &builder, &window, c(0, 0), c(10, 0), &mut path, &mut rng);
    assert_eq!(first, Some(c(1, 0)));
    assert_eq!(path.expected, Some(c(1, 0)));

    // The step was refused: still at (0,0), so the remaining plan is stale.
    assert!(!path.is_valid_for(&c(10, 0), &c(0, 0)));
    let retry = navigator.next_step(&mut graph, &builder, &window, c(0, 0), c(10, 0), &mut path, &mut rng);
    assert_eq!(retry, Some(c(1, 0)));
    assert_eq!(path.len(), 9);
}

#[test]
fn test_exploration_keeps_heading_until_blocked() {
    let mut window = ObservationWindow::open_around(c(0, 0), 3);
    let mut heading = Some((1, 0));
    let mut rng = StdRng::seed_from_u64(8);

    assert_eq!(explore_step(&window, c(0, 0), &mut heading, &mut rng), Some(c(1, 0)));
    assert_eq!(heading, Some((1, 0)));

    window.set_cell(c(1, 0), Some(Cell::wall()));
    let turned = explore_step(&window, c(0, 0), &mut heading, &mut rng).unwrap();
    assert_ne!(turned, c(1, 0));
    assert_eq!(heading, Some((turned.x, turned.y)));
}

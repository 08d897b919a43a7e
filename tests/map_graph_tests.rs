use packet_courier::domains::mapping::{GraphBuilder, MapGraph};
use packet_courier::domains::world::{Color, Coordinate, NodeKind, ObservationWindow};

fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

fn walk(graph: &mut MapGraph, builder: &mut GraphBuilder, positions: &[Coordinate]) {
    for p in positions {
        builder.record_position(graph, *p);
    }
}

#[test]
fn test_edges_are_symmetric() {
    let mut graph = MapGraph::new();
    graph.add_edge(c(0, 0), c(3, 1));
    graph.add_edge(c(3, 1), c(-2, 4));
    graph.add_edge(c(-2, 4), c(0, 0));
    graph.add_edge(c(3, 1), c(0, 0));

    for (a, b, cost) in graph.edges() {
        assert_eq!(graph.edge_cost(&a, &b), Some(cost));
        assert_eq!(graph.edge_cost(&b, &a), Some(cost));
        assert_eq!(cost, a.traversal_cost(&b));
    }
    assert_eq!(graph.edge_count(), 3, "re-adding an edge must not duplicate it");
}

#[test]
fn test_edge_cost_uses_traversal_formula() {
    let mut graph = MapGraph::new();
    graph.add_edge(c(0, 0), c(4, 1));
    // one diagonal step plus three straight ones
    assert_eq!(graph.edge_cost(&c(0, 0), &c(4, 1)), Some(4));
}

#[test]
fn test_add_edge_creates_free_endpoints() {
    let mut graph = MapGraph::new();
    graph.add_edge(c(1, 1), c(2, 2));
    assert_eq!(graph.node_kind(&c(1, 1)), Some(&NodeKind::Free));
    assert_eq!(graph.node_kind(&c(2, 2)), Some(&NodeKind::Free));

    graph.add_edge(c(5, 5), c(5, 5));
    assert!(!graph.node_exists(&c(5, 5)));
}

#[test]
fn test_nodes_persist_and_only_upgrade_from_free() {
    let mut graph = MapGraph::new();
    let red = NodeKind::Packet(Color::new("red"));

    graph.add_node(c(2, 2), NodeKind::Free);
    graph.add_node(c(2, 2), red.clone());
    assert_eq!(graph.node_kind(&c(2, 2)), Some(&red));

    graph.add_node(c(2, 2), NodeKind::ChargingStation);
    assert_eq!(graph.node_kind(&c(2, 2)), Some(&red));

    graph.mark_free(&c(2, 2));
    assert!(graph.node_exists(&c(2, 2)));
    assert_eq!(graph.node_kind(&c(2, 2)), Some(&NodeKind::Free));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_straight_walk_adds_no_intermediate_nodes() {
    let start = c(0, 0);
    let mut graph = MapGraph::seeded(start);
    let mut builder = GraphBuilder::starting_at(start);

    walk(&mut graph, &mut builder, &[c(0, 1), c(0, 2), c(0, 3), c(0, 4), c(0, 5)]);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(builder.edge_start(), Some(start));

    // Discovering something at the end materialises the straight segment.
    builder.anchor(&mut graph, c(0, 5));
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edges(), vec![(c(0, 0), c(0, 5), 5)]);
}

#[test]
fn test_turn_commits_the_turn_point() {
    let start = c(0, 0);
    let mut graph = MapGraph::seeded(start);
    let mut builder = GraphBuilder::starting_at(start);

    walk(&mut graph, &mut builder, &[c(0, 1), c(0, 2), c(0, 3)]);
    assert_eq!(graph.edge_count(), 0);

    let turn = builder.record_position(&mut graph, c(1, 3));
    assert_eq!(turn, Some(c(0, 3)));
    assert!(graph.node_exists(&c(0, 0)));
    assert!(graph.node_exists(&c(0, 3)));
    assert_eq!(graph.edge_cost(&c(0, 0), &c(0, 3)), Some(3));
    assert_eq!(builder.edge_start(), Some(c(0, 3)));

    walk(&mut graph, &mut builder, &[c(2, 3), c(3, 3)]);
    assert_eq!(graph.edge_count(), 1, "the second leg is still implicit");
}

#[test]
fn test_connect_target_hangs_target_off_current_position() {
    let start = c(0, 0);
    let mut graph = MapGraph::seeded(start);
    let mut builder = GraphBuilder::starting_at(start);
    walk(&mut graph, &mut builder, &[c(1, 0), c(2, 0)]);

    let kind = NodeKind::Destination(Color::new("blue"));
    builder.connect_target(&mut graph, c(2, 0), c(4, 2), kind.clone());

    assert_eq!(graph.node_kind(&c(4, 2)), Some(&kind));
    assert_eq!(graph.edge_cost(&c(2, 0), &c(4, 2)), Some(2));
    assert_eq!(graph.edge_cost(&c(0, 0), &c(2, 0)), Some(2));
}

#[test]
fn test_closest_free_node_is_limited_to_window() {
    let mut graph = MapGraph::new();
    graph.add_node(c(10, 10), NodeKind::Free);
    graph.add_node(c(2, 0), NodeKind::Free);
    graph.add_node(c(1, 1), NodeKind::Packet(Color::new("red")));
    graph.add_node(c(0, 2), NodeKind::Free);

    let window = ObservationWindow::open_around(c(0, 0), 3);
    // (2,0) and (0,2) tie; the one inserted first wins
    assert_eq!(graph.closest_free_node(&c(0, 0), &window), Some(c(2, 0)));

    let far = ObservationWindow::open_around(c(20, 20), 3);
    assert_eq!(graph.closest_free_node(&c(0, 0), &far), None);
}

#[test]
fn test_serialized_graph_rebuilds_with_same_shape() {
    let mut graph = MapGraph::seeded(c(0, 0));
    graph.add_edge(c(0, 0), c(0, 3));
    graph.add_edge(c(0, 3), c(3, 3));
    graph.add_node(c(4, 4), NodeKind::ChargingStation);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: MapGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.edges(), graph.edges());
    assert_eq!(restored.node_kind(&c(4, 4)), Some(&NodeKind::ChargingStation));
    assert_eq!(restored.edge_cost(&c(3, 3), &c(0, 3)), Some(3));
}

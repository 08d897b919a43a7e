use packet_courier::config::EnergyConfig;
use packet_courier::domains::energy::BatteryState;
use packet_courier::domains::targets::TargetRegistry;
use packet_courier::domains::tasking::{Task, TaskPhase, TaskSelector};
use packet_courier::domains::world::{Color, Coordinate, Destination, Packet};
use packet_courier::DomainError;

fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

fn selector() -> TaskSelector {
    TaskSelector::new(EnergyConfig::default())
}

#[test]
fn test_no_task_until_matching_destination_is_known() {
    let mut registry = TargetRegistry::new();
    let battery = BatteryState::full(1000);
    registry.add_packet(Packet::new(c(5, 5), "red"));

    assert!(selector().select_task(&mut registry, c(0, 0), &battery, None).is_none());

    registry.add_destination(Destination::new(c(8, 8), "red"));
    let task = selector().select_task(&mut registry, c(0, 0), &battery, None).unwrap();

    assert_eq!(task.packet().map(|p| p.coordinate), Some(c(5, 5)));
    assert_eq!(task.destination().map(|d| d.coordinate), Some(c(8, 8)));
    assert_eq!(task.phase, TaskPhase::ToPacket);
    assert!(registry.is_claimed(&c(5, 5)));
}

#[test]
fn test_selected_task_colors_always_match() {
    let mut registry = TargetRegistry::new();
    let battery = BatteryState::full(5000);
    registry.add_packet(Packet::new(c(1, 0), "red"));
    registry.add_packet(Packet::new(c(2, 0), "blue"));
    registry.add_packet(Packet::new(c(3, 0), "green"));
    registry.add_destination(Destination::new(c(0, 9), "blue"));
    registry.add_destination(Destination::new(c(9, 9), "red"));

    let mut picked = Vec::new();
    while let Some(task) = selector().select_task(&mut registry, c(0, 0), &battery, None) {
        let packet = task.packet().unwrap();
        let destination = task.destination().unwrap();
        assert_eq!(packet.color, destination.color);
        picked.push(packet.coordinate);
    }
    // green has no destination and is never picked
    assert_eq!(picked, vec![c(1, 0), c(2, 0)]);
}

#[test]
fn test_priority_then_known_destination_then_distance() {
    let mut registry = TargetRegistry::new();
    let battery = BatteryState::full(5000);
    registry.add_packet(Packet::new(c(1, 1), "blue"));
    registry.add_packet(Packet::new(c(6, 6), "red"));
    registry.add_packet(Packet::new(c(9, 0), "red").with_priority(true));
    registry.add_destination(Destination::new(c(3, 3), "red"));
    registry.add_destination(Destination::new(c(0, 5), "blue"));

    let order: Vec<Coordinate> = std::iter::from_fn(|| {
        selector()
            .select_task(&mut registry, c(0, 0), &battery, None)
            .and_then(|t| t.packet().map(|p| p.coordinate))
    })
    .collect();
    assert_eq!(order, vec![c(9, 0), c(1, 1), c(6, 6)]);
}

#[test]
fn test_infeasible_energy_is_skipped() {
    let mut registry = TargetRegistry::new();
    registry.add_packet(Packet::new(c(10, 0), "red"));
    registry.add_packet(Packet::new(c(2, 0), "red"));
    registry.add_destination(Destination::new(c(2, 2), "red"));
    let selector = selector();

    // (2,0): 2 steps empty + 2 carrying = 2*10 + 2*25 = 70
    let tight = BatteryState::new(70, 1000);
    let task = selector.select_task(&mut registry, c(0, 0), &tight, None).unwrap();
    assert_eq!(task.packet().map(|p| p.coordinate), Some(c(2, 0)));

    let flat = BatteryState::new(69, 1000);
    registry.release(&c(2, 0));
    assert!(selector.select_task(&mut registry, c(0, 0), &flat, None).is_none());
}

#[test]
fn test_nearest_feasible_destination_is_preferred() {
    let mut registry = TargetRegistry::new();
    registry.add_packet(Packet::new(c(5, 0), "red"));
    registry.add_destination(Destination::new(c(20, 0), "red"));
    registry.add_destination(Destination::new(c(5, 4), "red"));
    let battery = BatteryState::full(1000);

    let task = selector().select_task(&mut registry, c(0, 0), &battery, None).unwrap();
    assert_eq!(task.destination().map(|d| d.coordinate), Some(c(5, 4)));
}

#[test]
fn test_active_task_is_kept_while_packet_known() {
    let mut registry = TargetRegistry::new();
    let battery = BatteryState::full(1000);
    registry.add_packet(Packet::new(c(4, 0), "red"));
    registry.add_destination(Destination::new(c(4, 4), "red"));
    let selector = selector();

    let first = selector.select_task(&mut registry, c(0, 0), &battery, None).unwrap();
    registry.add_packet(Packet::new(c(1, 0), "red").with_priority(true));
    let again = selector.select_task(&mut registry, c(0, 0), &battery, Some(&first)).unwrap();
    assert_eq!(again.id, first.id);

    registry.remove_packet(&c(4, 0));
    let next = selector.select_task(&mut registry, c(0, 0), &battery, Some(&first)).unwrap();
    assert_ne!(next.id, first.id);
    assert_eq!(next.packet().map(|p| p.coordinate), Some(c(1, 0)));
}

#[test]
fn test_task_rejects_mismatched_colors() {
    let result = Task::new(Packet::new(c(0, 0), "red"), Destination::new(c(1, 1), "blue"));
    assert!(matches!(result, Err(DomainError::ColorMismatch { .. })));

    let mut task = Task::carrying(Packet::new(c(0, 0), "red"));
    assert!(task.set_destination(Destination::new(c(1, 1), "blue")).is_err());
    assert!(task.set_destination(Destination::new(c(2, 2), "red")).is_ok());
    assert_eq!(task.color(), Some(&Color::new("red")));
}

#[test]
fn test_select_destination_for_carried_packet() {
    let mut registry = TargetRegistry::new();
    registry.add_destination(Destination::new(c(9, 9), "red"));
    registry.add_destination(Destination::new(c(2, 1), "red"));
    registry.add_destination(Destination::new(c(1, 0), "blue"));

    let found = selector().select_destination(&registry, &Color::new("red"), c(0, 0));
    assert_eq!(found.map(|d| d.coordinate), Some(c(2, 1)));
    assert!(selector().select_destination(&registry, &Color::new("green"), c(0, 0)).is_none());
}

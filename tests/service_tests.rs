use packet_courier::adapters::inbound::{BroadcastHub, InMemoryStore};
use packet_courier::adapters::outbound::{init_noop_logger, ActionSlot};
use packet_courier::application::CONTEXT_KEY;
use packet_courier::config::Config;
use packet_courier::{CourierEvent, CourierMessage, CourierService};
use packet_courier::domains::logger::{DomainLogger, DynLogger};
use packet_courier::domains::world::{
    BroadcastChannel, Coordinate, MemoryStore, Observation, ObservationWindow,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Capture {
    lines: Mutex<Vec<String>>,
}

impl DomainLogger for Capture {
    fn info(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("INFO:{msg}"));
    }
    fn warn(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("WARN:{msg}"));
    }
    fn error(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("ERR:{msg}"));
    }
}

fn open_view(x: i32, y: i32) -> Observation {
    let position = Coordinate::new(x, y);
    Observation::new(position, ObservationWindow::open_around(position, 3)).with_battery(1000)
}

#[test]
fn test_context_survives_between_ticks() {
    let service = CourierService::new("courier-1", &Config::default(), init_noop_logger());
    let hub = BroadcastHub::new();
    let mut endpoint = hub.endpoint("courier-1");
    let mut memory = InMemoryStore::new();
    let mut rng = StdRng::seed_from_u64(3);

    let mut slot = ActionSlot::default();
    let report = service
        .run_tick(&open_view(0, 0), &mut memory, &mut endpoint, &mut slot, &mut rng)
        .unwrap();
    assert!(report.events.iter().any(|e| matches!(e, CourierEvent::AgentInitialized { .. })));
    assert_eq!(slot.take(), Some(report.action));
    assert!(memory.get(CONTEXT_KEY).is_some());

    let mut slot = ActionSlot::default();
    let report = service
        .run_tick(&open_view(1, 0), &mut memory, &mut endpoint, &mut slot, &mut rng)
        .unwrap();
    assert!(report.events.iter().all(|e| !matches!(e, CourierEvent::AgentInitialized { .. })));

    let context = service.load_context(&memory, &open_view(1, 0));
    assert_eq!(context.tick, 2);
    assert_eq!(context.position, Coordinate::new(1, 0));
}

#[test]
fn test_corrupt_context_starts_fresh() {
    let capture = Arc::new(Capture::default());
    let logger: DynLogger = capture.clone();
    let service = CourierService::new("courier-1", &Config::default(), logger);
    let mut memory = InMemoryStore::new();
    memory.set(CONTEXT_KEY, b"{not json".to_vec());

    let context = service.load_context(&memory, &open_view(4, 4));
    assert_eq!(context.tick, 0);
    assert_eq!(context.position, Coordinate::new(4, 4));
    assert!(context.graph.node_exists(&Coordinate::new(4, 4)));

    let lines = capture.lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("WARN:discarding corrupt context")));
}

#[test]
fn test_context_of_another_agent_is_ignored() {
    let config = Config::default();
    let mut memory = InMemoryStore::new();
    let other = CourierService::new("courier-9", &config, init_noop_logger());
    let stranger = other.load_context(&memory, &open_view(7, 7));
    other.save_context(&mut memory, &stranger).unwrap();

    let service = CourierService::new("courier-1", &config, init_noop_logger());
    let context = service.load_context(&memory, &open_view(0, 0));
    assert_eq!(context.id, "courier-1");
    assert_eq!(context.position, Coordinate::new(0, 0));
}

#[test]
fn test_inbox_skips_malformed_messages_and_empties_mailbox() {
    let capture = Arc::new(Capture::default());
    let service = CourierService::new("courier-1", &Config::default(), capture.clone());
    let hub = BroadcastHub::new();
    let mut me = hub.endpoint("courier-1");
    let mut peer = hub.endpoint("courier-2");

    let claimed = CourierMessage::StationClaimed {
        agent: "courier-2".to_string(),
        station: Coordinate::new(5, 5),
        battery: 300,
    };
    peer.send("garbage".to_string());
    peer.send(claimed.encode().unwrap());
    peer.send(r#"{"type":"station_released","agent":"courier-2","station":{"x":5,"y":5}}"#.to_string());

    let inbox = service.read_inbox(&mut me);
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0], claimed);
    assert!(matches!(inbox[1], CourierMessage::StationReleased { .. }));
    assert!(me.receive_all().is_empty());
    assert!(capture.lines.lock().unwrap().iter().any(|l| l.starts_with("WARN:skipping malformed")));
}

#[test]
fn test_forget_clears_courier_keys() {
    let service = CourierService::new("courier-1", &Config::default(), init_noop_logger());
    let mut memory = InMemoryStore::new();
    memory.set(CONTEXT_KEY, vec![1, 2, 3]);
    memory.set("host/other", vec![4]);

    service.forget(&mut memory);
    assert!(memory.get(CONTEXT_KEY).is_none());
    assert_eq!(memory.keys().into_iter().collect::<Vec<_>>(), vec!["host/other".to_string()]);
}

#[test]
fn test_hub_respects_communication_range() {
    let hub = BroadcastHub::with_range(5);
    let mut a = hub.endpoint("a");
    let b = hub.endpoint("b");
    let c = hub.endpoint("c");
    hub.update_position("a", Coordinate::new(0, 0));
    hub.update_position("b", Coordinate::new(5, 3));
    hub.update_position("c", Coordinate::new(6, 0));

    a.send("hello".to_string());
    assert_eq!(b.receive_all(), vec!["hello".to_string()]);
    assert!(c.receive_all().is_empty());
    assert!(a.receive_all().is_empty());
    assert_eq!(hub.pending("b"), 1);
}

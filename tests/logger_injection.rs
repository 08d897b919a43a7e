use packet_courier::adapters::outbound::{init_buffered_logger, init_noop_logger, MultiLogger};
use packet_courier::domains::logger::{AgentLogger, DomainLogger, DynLogger};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self {
        Self { messages: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("INFO:{}", msg));
    }
    fn warn(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("WARN:{}", msg));
    }
    fn error(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("ERR:{}", msg));
    }
}

#[tokio::test]
async fn test_buffered_and_noop_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let bridge: DynLogger = capture.clone();

    let buffered = init_buffered_logger(bridge, 8);
    buffered.info("one");
    buffered.warn("two");
    buffered.error("three");

    tokio::time::sleep(Duration::from_millis(50)).await;

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m.contains("INFO:one")));
    assert!(msgs.iter().any(|m| m.contains("WARN:two")));
    assert!(msgs.iter().any(|m| m.contains("ERR:three")));

    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");
}

#[test]
fn test_agent_logger_prefixes_and_multi_logger_fans_out() {
    let first = Arc::new(BridgeCapture::new());
    let second = Arc::new(BridgeCapture::new());
    let sinks: Vec<DynLogger> = vec![first.clone() as DynLogger, second.clone() as DynLogger];
    let multi: DynLogger = Arc::new(MultiLogger::new(sinks));
    let logger = AgentLogger::shared("courier-2", multi);

    logger.warn("battery low");

    for capture in [&first, &second] {
        let msgs = capture.messages.lock().unwrap();
        assert_eq!(msgs.as_slice(), ["WARN:[courier-2] battery low".to_string()]);
    }
}

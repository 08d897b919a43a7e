use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

struct ConsoleBridge;

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        println!("WARN: {}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("ERROR: {}", msg);
    }
}

/// Console-backed logger, the fallback when no log file is configured.
pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleBridge)
}

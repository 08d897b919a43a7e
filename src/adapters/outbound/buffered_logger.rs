use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;
use tokio::sync::mpsc;

enum Level {
    Info,
    Warn,
    Error,
}

struct LogLine {
    level: Level,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogLine>,
}

impl BufferedLogger {
    // Never blocks the tick: a full buffer drops the line.
    fn push(&self, level: Level, msg: &str) {
        let _ = self.sender.try_send(LogLine { level, msg: msg.to_string() });
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

/// Decouple the simulation loop from slow sinks: lines are queued on a
/// bounded channel of `capacity` and forwarded to `bridge` by a background
/// task. Must be called inside a tokio runtime.
pub fn init_buffered_logger(bridge: DynLogger, capacity: usize) -> DynLogger {
    let (sender, mut receiver) = mpsc::channel::<LogLine>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(line) = receiver.recv().await {
            match line.level {
                Level::Info => bridge.info(&line.msg),
                Level::Warn => bridge.warn(&line.msg),
                Level::Error => bridge.error(&line.msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender })
}

use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Logging port used by the courier core and its application service.
/// Deliberately small and infallible from the caller's side.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Writes through the `log` facade into a `fast_log` file appender.
pub struct FileLogger;

impl FileLogger {
    /// Install `fast_log` as the global logger, appending to `path`.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .file(path)
                .level(log::LevelFilter::Info),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Tags every line with the courier it belongs to, so several agents can
/// share one sink.
pub struct AgentLogger {
    agent_id: String,
    inner: DynLogger,
}

impl AgentLogger {
    pub fn new(agent_id: impl Into<String>, inner: DynLogger) -> Self {
        Self { agent_id: agent_id.into(), inner }
    }

    pub fn shared(agent_id: impl Into<String>, inner: DynLogger) -> DynLogger {
        Arc::new(Self::new(agent_id, inner))
    }
}

impl DomainLogger for AgentLogger {
    fn info(&self, msg: &str) {
        self.inner.info(&format!("[{}] {}", self.agent_id, msg));
    }

    fn warn(&self, msg: &str) {
        self.inner.warn(&format!("[{}] {}", self.agent_id, msg));
    }

    fn error(&self, msg: &str) {
        self.inner.error(&format!("[{}] {}", self.agent_id, msg));
    }
}

use crate::common::ApplicationError;
use crate::domains::logger::{DynLogger, FileLogger};
use std::sync::Arc;

/// Install the `fast_log` file appender and return the logger couriers get
/// injected with.
pub fn init_file_logger(path: &str) -> Result<DynLogger, ApplicationError> {
    FileLogger::init(path)
        .map_err(|e| ApplicationError::Port(format!("failed to initialize fast_log at {path}: {e}")))?;
    Ok(Arc::new(FileLogger))
}

use super::types::Action;
use crate::common::DomainResult;
use std::collections::BTreeSet;

/// Receives the one action an agent emits per tick.
pub trait ActionSink {
    fn submit(&mut self, action: Action) -> DomainResult<()>;
}

/// Message exchange with agents in communication range. Payloads are opaque
/// strings; indices refer to the list returned by `receive_all`.
pub trait BroadcastChannel {
    fn send(&mut self, message: String);
    fn receive_all(&self) -> Vec<String>;
    fn remove(&mut self, index: usize);
}

/// Per-agent key-value memory. Blobs are stored as-is.
pub trait MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&mut self, key: &str, blob: Vec<u8>);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> BTreeSet<String>;
}

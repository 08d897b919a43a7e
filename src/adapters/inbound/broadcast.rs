use crate::domains::world::{BroadcastChannel, Coordinate};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct HubState {
    mailboxes: BTreeMap<String, Vec<String>>,
    positions: HashMap<String, Coordinate>,
}

/// Shared message bus for couriers living in one process. Each agent gets a
/// mailbox; a message reaches every other agent within `range` (Chebyshev
/// distance between last reported positions), or everybody when the hub is
/// unbounded.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    state: Arc<Mutex<HubState>>,
    range: Option<u32>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(range: u32) -> Self {
        Self { state: Arc::default(), range: Some(range) }
    }

    /// Register `agent_id` and hand out its channel endpoint.
    pub fn endpoint(&self, agent_id: impl Into<String>) -> HubEndpoint {
        let agent_id = agent_id.into();
        self.lock().mailboxes.entry(agent_id.clone()).or_default();
        HubEndpoint { agent_id, hub: self.clone() }
    }

    pub fn update_position(&self, agent_id: &str, position: Coordinate) {
        self.lock().positions.insert(agent_id.to_string(), position);
    }

    /// Messages waiting for `agent_id`.
    pub fn pending(&self, agent_id: &str) -> usize {
        self.lock().mailboxes.get(agent_id).map_or(0, Vec::len)
    }

    fn deliver(&self, sender: &str, message: String) {
        let mut state = self.lock();
        let origin = state.positions.get(sender).copied();
        let in_range: Vec<String> = state
            .mailboxes
            .keys()
            .filter(|id| id.as_str() != sender)
            .filter(|id| match (self.range, origin, state.positions.get(id.as_str())) {
                (Some(range), Some(from), Some(to)) => from.chebyshev(to) <= range,
                _ => true,
            })
            .cloned()
            .collect();
        for id in in_range {
            if let Some(mailbox) = state.mailboxes.get_mut(&id) {
                mailbox.push(message.clone());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One agent's view of the hub.
#[derive(Debug, Clone)]
pub struct HubEndpoint {
    agent_id: String,
    hub: BroadcastHub,
}

impl HubEndpoint {
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

impl BroadcastChannel for HubEndpoint {
    fn send(&mut self, message: String) {
        self.hub.deliver(&self.agent_id, message);
    }

    fn receive_all(&self) -> Vec<String> {
        self.hub
            .lock()
            .mailboxes
            .get(&self.agent_id)
            .cloned()
            .unwrap_or_default()
    }

    fn remove(&mut self, index: usize) {
        let mut state = self.hub.lock();
        if let Some(mailbox) = state.mailboxes.get_mut(&self.agent_id) {
            if index < mailbox.len() {
                mailbox.remove(index);
            }
        }
    }
}

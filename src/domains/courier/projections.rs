use super::events::CourierEvent;
use serde::{Deserialize, Serialize};

/// Running totals over a courier's event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierProjection {
    pub targets_discovered: usize,
    pub tasks_selected: usize,
    pub tasks_abandoned: usize,
    pub pickups: usize,
    pub deliveries: usize,
    pub charging_sessions: usize,
    pub last_tick: u64,
}

impl CourierProjection {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a CourierEvent>) -> Self {
        let mut projection = Self::default();
        for event in events {
            projection.apply(event);
        }
        projection
    }

    pub fn apply(&mut self, event: &CourierEvent) {
        use crate::common::DomainEvent;

        match event {
            CourierEvent::TargetsDiscovered { count, .. } => self.targets_discovered += count,
            CourierEvent::TaskSelected { .. } => self.tasks_selected += 1,
            CourierEvent::TaskAbandoned { .. } => self.tasks_abandoned += 1,
            CourierEvent::PacketPickedUp { .. } => self.pickups += 1,
            CourierEvent::PacketDelivered { .. } => self.deliveries += 1,
            CourierEvent::ChargingStarted { .. } => self.charging_sessions += 1,
            CourierEvent::AgentInitialized { .. }
            | CourierEvent::ChargingRequested { .. }
            | CourierEvent::ChargingFinished { .. } => {}
        }
        self.last_tick = self.last_tick.max(event.tick());
    }
}

use crate::common::DomainEvent;
use crate::domains::world::{Color, Coordinate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CourierEvent {
    AgentInitialized {
        agent_id: String,
        position: Coordinate,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    TargetsDiscovered {
        agent_id: String,
        count: usize,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    TaskSelected {
        agent_id: String,
        task_id: Uuid,
        packet: Coordinate,
        destination: Coordinate,
        color: Color,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    TaskAbandoned {
        agent_id: String,
        task_id: Option<Uuid>,
        reason: String,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    PacketPickedUp {
        agent_id: String,
        packet: Coordinate,
        color: Color,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    PacketDelivered {
        agent_id: String,
        destination: Coordinate,
        color: Color,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    ChargingRequested {
        agent_id: String,
        station: Coordinate,
        battery: u32,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    ChargingStarted {
        agent_id: String,
        station: Coordinate,
        battery: u32,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    ChargingFinished {
        agent_id: String,
        station: Coordinate,
        battery: u32,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for CourierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CourierEvent::AgentInitialized { .. } => "AgentInitialized",
            CourierEvent::TargetsDiscovered { .. } => "TargetsDiscovered",
            CourierEvent::TaskSelected { .. } => "TaskSelected",
            CourierEvent::TaskAbandoned { .. } => "TaskAbandoned",
            CourierEvent::PacketPickedUp { .. } => "PacketPickedUp",
            CourierEvent::PacketDelivered { .. } => "PacketDelivered",
            CourierEvent::ChargingRequested { .. } => "ChargingRequested",
            CourierEvent::ChargingStarted { .. } => "ChargingStarted",
            CourierEvent::ChargingFinished { .. } => "ChargingFinished",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            CourierEvent::AgentInitialized { agent_id, .. }
            | CourierEvent::TargetsDiscovered { agent_id, .. }
            | CourierEvent::TaskSelected { agent_id, .. }
            | CourierEvent::TaskAbandoned { agent_id, .. }
            | CourierEvent::PacketPickedUp { agent_id, .. }
            | CourierEvent::PacketDelivered { agent_id, .. }
            | CourierEvent::ChargingRequested { agent_id, .. }
            | CourierEvent::ChargingStarted { agent_id, .. }
            | CourierEvent::ChargingFinished { agent_id, .. } => agent_id,
        }
    }

    fn tick(&self) -> u64 {
        match self {
            CourierEvent::AgentInitialized { tick, .. }
            | CourierEvent::TargetsDiscovered { tick, .. }
            | CourierEvent::TaskSelected { tick, .. }
            | CourierEvent::TaskAbandoned { tick, .. }
            | CourierEvent::PacketPickedUp { tick, .. }
            | CourierEvent::PacketDelivered { tick, .. }
            | CourierEvent::ChargingRequested { tick, .. }
            | CourierEvent::ChargingStarted { tick, .. }
            | CourierEvent::ChargingFinished { tick, .. } => *tick,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CourierEvent::AgentInitialized { timestamp, .. }
            | CourierEvent::TargetsDiscovered { timestamp, .. }
            | CourierEvent::TaskSelected { timestamp, .. }
            | CourierEvent::TaskAbandoned { timestamp, .. }
            | CourierEvent::PacketPickedUp { timestamp, .. }
            | CourierEvent::PacketDelivered { timestamp, .. }
            | CourierEvent::ChargingRequested { timestamp, .. }
            | CourierEvent::ChargingStarted { timestamp, .. }
            | CourierEvent::ChargingFinished { timestamp, .. } => *timestamp,
        }
    }
}

impl CourierEvent {
    /// One-line summary for the domain log.
    pub fn describe(&self) -> String {
        match self {
            CourierEvent::AgentInitialized { agent_id, position, .. } => {
                format!("{agent_id} initialized at {position}")
            }
            CourierEvent::TargetsDiscovered { agent_id, count, .. } => {
                format!("{agent_id} discovered {count} target(s)")
            }
            CourierEvent::TaskSelected { agent_id, packet, destination, color, .. } => {
                format!("{agent_id} takes {color} packet {packet} -> {destination}")
            }
            CourierEvent::TaskAbandoned { agent_id, reason, .. } => {
                format!("{agent_id} abandoned task: {reason}")
            }
            CourierEvent::PacketPickedUp { agent_id, packet, color, .. } => {
                format!("{agent_id} picked up {color} packet at {packet}")
            }
            CourierEvent::PacketDelivered { agent_id, destination, color, .. } => {
                format!("{agent_id} delivered {color} packet to {destination}")
            }
            CourierEvent::ChargingRequested { agent_id, station, battery, .. } => {
                format!("{agent_id} heading to charger {station} with battery {battery}")
            }
            CourierEvent::ChargingStarted { agent_id, station, battery, .. } => {
                format!("{agent_id} charging at {station} from {battery}")
            }
            CourierEvent::ChargingFinished { agent_id, station, battery, .. } => {
                format!("{agent_id} left charger {station} at {battery}")
            }
        }
    }
}

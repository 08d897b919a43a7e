use crate::common::DomainResult;
use crate::domains::world::{Coordinate, Target};
use serde::{Deserialize, Serialize};

/// What couriers tell each other over the broadcast channel. Encoded as
/// tagged JSON so peers built from other revisions can skip what they do
/// not understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CourierMessage {
    StationClaimed {
        agent: String,
        station: Coordinate,
        battery: u32,
    },
    StationHeartbeat {
        agent: String,
        station: Coordinate,
        battery: u32,
    },
    StationReleased {
        agent: String,
        station: Coordinate,
    },
    TargetsShared {
        agent: String,
        targets: Vec<Target>,
    },
}

impl CourierMessage {
    pub fn sender(&self) -> &str {
        match self {
            CourierMessage::StationClaimed { agent, .. }
            | CourierMessage::StationHeartbeat { agent, .. }
            | CourierMessage::StationReleased { agent, .. }
            | CourierMessage::TargetsShared { agent, .. } => agent,
        }
    }

    pub fn encode(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

use crate::common::{DomainError, DomainResult};
use crate::domains::world::{Color, Destination, Packet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPhase {
    #[default]
    Idle,
    ToPacket,
    ToDestination,
    Charging,
}

/// The agent's current commitment. Packet and destination colors always
/// match when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    packet: Option<Packet>,
    destination: Option<Destination>,
    pub phase: TaskPhase,
}

impl Task {
    pub fn new(packet: Packet, destination: Destination) -> DomainResult<Self> {
        ensure_same_color(&packet.color, &destination.color)?;
        Ok(Self {
            id: Uuid::new_v4(),
            packet: Some(packet),
            destination: Some(destination),
            phase: TaskPhase::ToPacket,
        })
    }

    /// Task for a packet already in hand whose destination is still unknown.
    pub fn carrying(packet: Packet) -> Self {
        Self {
            id: Uuid::new_v4(),
            packet: Some(packet),
            destination: None,
            phase: TaskPhase::ToDestination,
        }
    }

    pub fn packet(&self) -> Option<&Packet> {
        self.packet.as_ref()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn color(&self) -> Option<&Color> {
        self.packet
            .as_ref()
            .map(|p| &p.color)
            .or_else(|| self.destination.as_ref().map(|d| &d.color))
    }

    pub fn set_destination(&mut self, destination: Destination) -> DomainResult<()> {
        if let Some(packet) = &self.packet {
            ensure_same_color(&packet.color, &destination.color)?;
        }
        self.destination = Some(destination);
        Ok(())
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
    }
}

fn ensure_same_color(packet: &Color, destination: &Color) -> DomainResult<()> {
    if packet != destination {
        return Err(DomainError::ColorMismatch {
            packet: packet.clone(),
            destination: destination.clone(),
        });
    }
    Ok(())
}

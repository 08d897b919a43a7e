use crate::domains::world::{Color, Coordinate};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Color mismatch: packet is {packet}, destination is {destination}")]
    ColorMismatch { packet: Color, destination: Color },

    #[error("Target at {coordinate} is no longer available")]
    StaleTarget { coordinate: Coordinate },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Corrupt persisted state: {0}")]
    CorruptState(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Port error: {0}")]
    Port(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;

pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use config::Config;

// Re-export common types
pub use common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainError, DomainEvent, DomainResult,
    Snapshot,
};

// Re-export the courier entry points
pub use application::{CourierService, Simulation, SimulationSummary, TickReport};
pub use domains::courier::{Behavior, CourierAgent, CourierEvent, CourierMessage};
pub use domains::world::{Action, Coordinate, Observation, ObservationWindow};

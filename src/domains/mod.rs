pub mod courier;
pub mod energy;
pub mod logger;
pub mod mapping;
pub mod path_planning;
pub mod targets;
pub mod tasking;
pub mod world;

pub use logger::{DomainLogger, DynLogger};

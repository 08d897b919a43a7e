pub mod courier_service;
pub mod simulation;

pub use courier_service::*;
pub use simulation::*;

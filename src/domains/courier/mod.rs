pub mod aggregate;
pub mod events;
pub mod messages;
pub mod projections;
pub mod state_machine;

pub use aggregate::*;
pub use events::*;
pub use messages::*;
pub use projections::*;
pub use state_machine::*;

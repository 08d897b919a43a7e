pub mod broadcast;
pub mod memory_store;

pub use broadcast::*;
pub use memory_store::*;

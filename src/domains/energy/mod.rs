pub mod battery;
pub mod manager;

pub use battery::*;
pub use manager::*;

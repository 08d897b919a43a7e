pub mod observation;
pub mod ports;
pub mod types;

pub use observation::*;
pub use ports::*;
pub use types::*;

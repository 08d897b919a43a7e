pub mod interpolate;
pub mod navigator;
pub mod planner;
pub mod types;

pub use interpolate::*;
pub use navigator::*;
pub use planner::*;
pub use types::*;

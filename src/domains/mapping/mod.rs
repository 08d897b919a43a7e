pub mod builder;
pub mod graph;

pub use builder::*;
pub use graph::*;

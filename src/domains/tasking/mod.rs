pub mod selector;
pub mod task;

pub use selector::*;
pub use task::*;

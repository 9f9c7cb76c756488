//! Task and goal records.
//!
//! Optional attributes are modelled as `Option` fields so every scoring
//! rule has to match on their presence explicitly.

mod goal;
mod task;

pub use goal::Goal;
pub use task::{Difficulty, Priority, Task};

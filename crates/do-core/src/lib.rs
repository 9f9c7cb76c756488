//! # DO Core Library
//!
//! Business logic for DO, a to-do and goal tracker built around a single
//! "Focus" recommendation: instead of a full list, the user states how much
//! energy they have and gets exactly one next task, with a short rationale,
//! and an optional timer to do it.
//!
//! ## Architecture
//!
//! - **Recommendation Engine**: pure scoring and ranking of open tasks under
//!   an energy filter ([`recommend`])
//! - **Momentum Calculator**: seven-day rolling completion profile
//!   ([`calculate_momentum`])
//! - **Focus Session**: caller-owned state (energy, skips, last goal, timer)
//!   threaded into the engine ([`FocusSession`])
//! - **Storage**: SQLite task/goal store and TOML configuration
//!
//! The engines perform no I/O and keep no state between calls.

pub mod celebration;
pub mod energy;
pub mod error;
pub mod model;
pub mod momentum;
pub mod progress;
pub mod recommend;
pub mod session;
pub mod storage;

pub use celebration::{celebration_message, GoalCelebration};
pub use energy::{energy_availability, filter_by_energy, EnergyAvailability, EnergyState};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use model::{Difficulty, Goal, Priority, Task};
pub use momentum::{calculate_momentum, calculate_momentum_at, completed_today, MomentumData, MomentumLevel};
pub use progress::{goal_progress, progress_by_goal, GoalProgress};
pub use recommend::{recommend, wired_recommendation, Recommender, TaskRecommendation};
pub use session::{
    ComparisonKind, FocusSession, FocusView, SkipOutcome, TimeComparison, TimerOutcome, TimerSession,
};
pub use storage::{Config, TaskDb};

//! Self-reported energy states and the eligibility filter they imply.
//!
//! Energy gates which tasks may be recommended at all:
//!
//! - **Low**: easy tasks, short tasks (15 minutes or less), and tasks with
//!   no difficulty or estimate recorded.
//! - **Steady**: everything except hard tasks.
//! - **Wired**: everything. Hard and long work is favored in scoring
//!   instead of being filtered in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::model::{Difficulty, Task};

/// Longest estimate still considered approachable on a low-energy day.
pub const LOW_ENERGY_MAX_MINUTES: u32 = 15;

/// The user's current capacity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnergyState {
    Low,
    Steady,
    Wired,
}

impl EnergyState {
    pub const ALL: [EnergyState; 3] = [EnergyState::Low, EnergyState::Steady, EnergyState::Wired];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyState::Low => "low",
            EnergyState::Steady => "steady",
            EnergyState::Wired => "wired",
        }
    }

    /// Capitalized name for display.
    pub fn label(&self) -> &'static str {
        match self {
            EnergyState::Low => "Low",
            EnergyState::Steady => "Steady",
            EnergyState::Wired => "Wired",
        }
    }

    /// Whether a task is eligible at this energy level.
    pub fn admits(&self, task: &Task) -> bool {
        match self {
            EnergyState::Low => {
                let is_easy = task.difficulty == Some(Difficulty::Easy);
                let is_short = task
                    .estimated_minutes
                    .is_some_and(|m| m <= LOW_ENERGY_MAX_MINUTES);
                is_easy || is_short || task.is_untagged()
            }
            EnergyState::Steady => task.difficulty != Some(Difficulty::Hard),
            EnergyState::Wired => true,
        }
    }
}

impl fmt::Display for EnergyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(EnergyState::Low),
            "steady" => Ok(EnergyState::Steady),
            "wired" => Ok(EnergyState::Wired),
            other => Err(ValidationError::InvalidValue {
                field: "energy".into(),
                message: format!("'{other}' is not one of low, steady, wired"),
            }),
        }
    }
}

/// Keep the tasks eligible at `energy`, preserving order.
///
/// Completion is not considered here; callers that want only open work
/// filter that first.
pub fn filter_by_energy<'a, I>(tasks: I, energy: EnergyState) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| energy.admits(t)).collect()
}

/// How many incomplete tasks each energy level would consider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EnergyAvailability {
    pub low: usize,
    pub steady: usize,
    pub wired: usize,
}

impl EnergyAvailability {
    pub fn get(&self, energy: EnergyState) -> usize {
        match energy {
            EnergyState::Low => self.low,
            EnergyState::Steady => self.steady,
            EnergyState::Wired => self.wired,
        }
    }

    /// Other energy levels that would have something to offer.
    pub fn alternatives(&self, current: EnergyState) -> Vec<(EnergyState, usize)> {
        EnergyState::ALL
            .into_iter()
            .filter(|e| *e != current)
            .map(|e| (e, self.get(e)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// Count eligible incomplete tasks per energy level.
pub fn energy_availability(tasks: &[Task]) -> EnergyAvailability {
    let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    let count = |e: EnergyState| incomplete.iter().filter(|t| e.admits(t)).count();
    EnergyAvailability {
        low: count(EnergyState::Low),
        steady: count(EnergyState::Steady),
        wired: count(EnergyState::Wired),
    }
}

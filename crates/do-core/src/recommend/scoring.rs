//! Recommendation scoring rules.
//!
//! Each rule inspects one signal on a task and yields a [`ScoreComponent`]:
//! integer points plus, for rules the user should hear about, a short
//! reason fragment. Rules that do not fire contribute nothing.
//!
//! | Rule | Points | Reason |
//! |---|---|---|
//! | Due within 48h (or past) | +3 | Time-sensitive |
//! | Due within 7 days | +2 | Coming up this week |
//! | Linked to a goal | +2 | Moves "<goal>" forward |
//! | Same goal as last completion | +2 | Keeps your momentum in this area |
//! | High priority | +1 | High priority |
//! | Has an estimate | +1 | |
//! | Previously skipped | -1 | |
//! | Older than 7 days | +1 | Been waiting patiently |
//! | Wired boost: hard | +3 | |
//! | Wired boost: 30+ minutes | +2 | |

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

use crate::energy::EnergyState;
use crate::model::{Difficulty, Goal, Priority, Task};

/// Shortest estimate that earns the wired duration boost.
pub const WIRED_LONG_TASK_MINUTES: u32 = 30;

/// Whether the energy-dependent boost term is part of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyBoost {
    #[default]
    Disabled,
    Enabled,
}

/// Points and optional explanation contributed by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreComponent {
    pub points: i32,
    pub reason: Option<String>,
}

impl ScoreComponent {
    fn none() -> Self {
        Self::default()
    }

    fn silent(points: i32) -> Self {
        Self { points, reason: None }
    }

    fn with_reason(points: i32, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: Some(reason.into()),
        }
    }
}

/// Everything the rules need besides the task itself.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub goals: HashMap<&'a str, &'a Goal>,
    /// Ids the caller passed as skipped, before any loop reset
    pub skipped_ids: HashSet<&'a str>,
    pub last_completed_goal_id: Option<&'a str>,
    pub energy: EnergyState,
    pub boost: EnergyBoost,
    pub now: DateTime<Utc>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        goals: &'a [Goal],
        skipped_ids: &'a [String],
        last_completed_goal_id: Option<&'a str>,
        energy: EnergyState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            goals: goals.iter().map(|g| (g.id.as_str(), g)).collect(),
            skipped_ids: skipped_ids.iter().map(String::as_str).collect(),
            last_completed_goal_id: last_completed_goal_id.filter(|g| !g.is_empty()),
            energy,
            boost: EnergyBoost::Disabled,
            now,
        }
    }

    pub fn with_boost(mut self, boost: EnergyBoost) -> Self {
        self.boost = boost;
        self
    }
}

/// A task with its accumulated score and reasons.
#[derive(Debug, Clone)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Due date urgency: +3 within 48 hours (including past due), +2 within a week.
pub fn due_date_score(task: &Task, now: DateTime<Utc>) -> ScoreComponent {
    match task.due_date {
        Some(due) if due <= now + Duration::hours(48) => {
            ScoreComponent::with_reason(3, "Time-sensitive")
        }
        Some(due) if due <= now + Duration::days(7) => {
            ScoreComponent::with_reason(2, "Coming up this week")
        }
        _ => ScoreComponent::none(),
    }
}

/// Goal linkage: +2, named when the goal can be resolved.
pub fn goal_score(task: &Task, ctx: &ScoringContext<'_>) -> ScoreComponent {
    let Some(goal_id) = task.goal_id.as_deref().filter(|g| !g.is_empty()) else {
        return ScoreComponent::none();
    };
    match ctx.goals.get(goal_id) {
        Some(goal) => ScoreComponent::with_reason(2, format!("Moves \"{}\" forward", goal.title)),
        None => ScoreComponent::silent(2),
    }
}

/// Context batching: +2 for staying in the goal just worked on.
pub fn context_batching_score(task: &Task, ctx: &ScoringContext<'_>) -> ScoreComponent {
    match (task.goal_id.as_deref(), ctx.last_completed_goal_id) {
        (Some(goal), Some(last)) if goal == last => {
            ScoreComponent::with_reason(2, "Keeps your momentum in this area")
        }
        _ => ScoreComponent::none(),
    }
}

pub fn priority_score(task: &Task) -> ScoreComponent {
    match task.priority {
        Some(Priority::High) => ScoreComponent::with_reason(1, "High priority"),
        _ => ScoreComponent::none(),
    }
}

/// Tasks with an estimate are more ready to start.
pub fn estimate_score(task: &Task) -> ScoreComponent {
    if task.estimated_minutes.is_some_and(|m| m > 0) {
        ScoreComponent::silent(1)
    } else {
        ScoreComponent::none()
    }
}

/// Soft penalty for tasks already declined this session.
pub fn skip_penalty(task: &Task, ctx: &ScoringContext<'_>) -> ScoreComponent {
    if ctx.skipped_ids.contains(task.id.as_str()) {
        ScoreComponent::silent(-1)
    } else {
        ScoreComponent::none()
    }
}

/// Older tasks get a nudge rather than an "overdue" label.
pub fn patience_score(task: &Task, now: DateTime<Utc>) -> ScoreComponent {
    if now - task.created_at > Duration::days(7) {
        ScoreComponent::with_reason(1, "Been waiting patiently")
    } else {
        ScoreComponent::none()
    }
}

/// Wired energy favors hard work: +3 for hard tasks.
pub fn difficulty_boost(task: &Task, energy: EnergyState) -> ScoreComponent {
    match (energy, task.difficulty) {
        (EnergyState::Wired, Some(Difficulty::Hard)) => ScoreComponent::silent(3),
        _ => ScoreComponent::none(),
    }
}

/// Wired energy favors long work: +2 for estimates of 30 minutes or more.
pub fn duration_boost(task: &Task, energy: EnergyState) -> ScoreComponent {
    match (energy, task.estimated_minutes) {
        (EnergyState::Wired, Some(m)) if m >= WIRED_LONG_TASK_MINUTES => ScoreComponent::silent(2),
        _ => ScoreComponent::none(),
    }
}

/// Run every rule against a task.
pub fn score_task<'a>(task: &'a Task, ctx: &ScoringContext<'_>) -> ScoredTask<'a> {
    let mut components = vec![
        due_date_score(task, ctx.now),
        goal_score(task, ctx),
        context_batching_score(task, ctx),
        priority_score(task),
        estimate_score(task),
        skip_penalty(task, ctx),
        patience_score(task, ctx.now),
    ];
    if ctx.boost == EnergyBoost::Enabled {
        components.push(difficulty_boost(task, ctx.energy));
        components.push(duration_boost(task, ctx.energy));
    }

    let score = components.iter().map(|c| c.points).sum();
    let reasons = components.into_iter().filter_map(|c| c.reason).collect();
    ScoredTask { task, score, reasons }
}

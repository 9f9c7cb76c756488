//! Focus session state machine.
//!
//! The recommendation engine is stateless; this is the caller-side state it
//! is fed from. A session tracks:
//!
//! - the selected energy level (none until the user picks one),
//! - tasks declined ("not this one") since energy was last chosen,
//! - the goal of the most recently completed task, for context batching,
//! - the running timer, if the user accepted a recommendation.
//!
//! Every transition is a method on an owned value, so the session can be
//! persisted between invocations and the engine stays a pure function.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::energy::{energy_availability, filter_by_energy, EnergyAvailability, EnergyState};
use crate::model::{Goal, Task};
use crate::recommend::{Recommender, TaskRecommendation};
use crate::storage::FocusConfig;

/// A timed attempt at one recommended task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub task_id: String,
    pub task_title: String,
    pub estimated_minutes: u32,
    pub started_at: DateTime<Utc>,
}

impl TimerSession {
    /// Whole seconds since the timer started, zero if `now` is earlier.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }

    pub fn is_over_estimate(&self, now: DateTime<Utc>) -> bool {
        self.elapsed_seconds(now) > u64::from(self.estimated_minutes) * 60
    }
}

/// How the actual time compared with the user's guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Within 30 seconds either way
    SpotOn,
    Over,
    Under,
}

/// Shame-free feedback on an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeComparison {
    pub kind: ComparisonKind,
    pub estimated_minutes: u32,
    /// Elapsed time rounded to the nearest minute
    pub actual_minutes: u64,
}

impl TimeComparison {
    pub fn new(estimated_minutes: u32, elapsed_seconds: u64) -> Self {
        let diff = elapsed_seconds as i64 - i64::from(estimated_minutes) * 60;
        let kind = if diff.abs() < 30 {
            ComparisonKind::SpotOn
        } else if diff > 0 {
            ComparisonKind::Over
        } else {
            ComparisonKind::Under
        };
        Self {
            kind,
            estimated_minutes,
            actual_minutes: (elapsed_seconds + 30) / 60,
        }
    }

    pub fn message(&self) -> String {
        let (guess, took) = (self.estimated_minutes, self.actual_minutes);
        match self.kind {
            ComparisonKind::SpotOn => {
                format!("You guessed {guess} min, took {took} min. Spot on!")
            }
            ComparisonKind::Over => format!(
                "You guessed {guess} min, took {took} min, that's common, your estimates will get better."
            ),
            ComparisonKind::Under => {
                format!("You guessed {guess} min, took {took} min. Faster than you thought!")
            }
        }
    }
}

/// Result of finishing a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerOutcome {
    pub task_id: String,
    pub comparison: TimeComparison,
}

/// Result of declining the current recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Task added to the skip list
    Skipped,
    /// Everything eligible had been declined, so the list was cleared
    Looped,
    /// No energy selected, nothing to skip
    Ignored,
}

/// What the focus screen should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FocusView {
    /// No energy level picked yet
    ChooseEnergy,
    /// The user has no tasks at all
    NoTasks,
    /// Every task is completed
    AllDone,
    Recommendation(TaskRecommendation),
    /// Open tasks exist but none fit the selected energy
    NoMatch {
        energy: EnergyState,
        availability: EnergyAvailability,
    },
}

/// Caller-owned focus state threaded into the recommendation engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FocusSession {
    #[serde(default)]
    pub energy: Option<EnergyState>,
    #[serde(default)]
    pub skipped_ids: Vec<String>,
    /// Skips since the last reset, drives the energy-change hint
    #[serde(default)]
    pub skip_count: u32,
    #[serde(default)]
    pub last_completed_goal_id: Option<String>,
    #[serde(default)]
    pub timer: Option<TimerSession>,
    #[serde(skip)]
    settings: FocusConfig,
}

impl FocusSession {
    pub fn with_config(mut self, settings: FocusConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &FocusConfig {
        &self.settings
    }

    fn clear_skips(&mut self) {
        self.skipped_ids.clear();
        self.skip_count = 0;
    }

    /// Pick an energy level; declined tasks are forgotten.
    pub fn select_energy(&mut self, energy: EnergyState) {
        self.energy = Some(energy);
        self.clear_skips();
    }

    /// Go back to the energy picker.
    pub fn clear_energy(&mut self) {
        self.energy = None;
        self.clear_skips();
    }

    /// Forget everything except configuration.
    pub fn reset(&mut self) {
        let settings = std::mem::take(&mut self.settings);
        *self = Self::default().with_config(settings);
    }

    /// The engine's pick for the current state, `None` without energy.
    pub fn recommendation(&self, tasks: &[Task], goals: &[Goal]) -> Option<TaskRecommendation> {
        self.recommendation_at(tasks, goals, Utc::now())
    }

    pub fn recommendation_at(
        &self,
        tasks: &[Task],
        goals: &[Goal],
        now: DateTime<Utc>,
    ) -> Option<TaskRecommendation> {
        let energy = self.energy?;
        let engine = Recommender::at(now);
        let last_goal = self.last_completed_goal_id.as_deref();
        if energy == EnergyState::Wired && self.settings.wired_boost {
            return engine.wired(tasks, goals, &self.skipped_ids, last_goal);
        }
        engine.recommend(tasks, goals, energy, &self.skipped_ids, last_goal)
    }

    pub fn view(&self, tasks: &[Task], goals: &[Goal]) -> FocusView {
        self.view_at(tasks, goals, Utc::now())
    }

    pub fn view_at(&self, tasks: &[Task], goals: &[Goal], now: DateTime<Utc>) -> FocusView {
        let Some(energy) = self.energy else {
            return FocusView::ChooseEnergy;
        };
        if tasks.is_empty() {
            return FocusView::NoTasks;
        }
        if tasks.iter().all(|t| t.completed) {
            return FocusView::AllDone;
        }
        match self.recommendation_at(tasks, goals, now) {
            Some(rec) => FocusView::Recommendation(rec),
            None => FocusView::NoMatch {
                energy,
                availability: energy_availability(tasks),
            },
        }
    }

    /// Decline `task_id`.
    ///
    /// When every task eligible at the current energy (or every open task,
    /// if none are eligible) has been declined, the list starts over.
    pub fn skip(&mut self, task_id: &str, tasks: &[Task]) -> SkipOutcome {
        let Some(energy) = self.energy else {
            return SkipOutcome::Ignored;
        };
        let mut skipped = self.skipped_ids.clone();
        if !skipped.iter().any(|id| id == task_id) {
            skipped.push(task_id.to_string());
        }

        let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
        let candidates = filter_by_energy(incomplete.iter().copied(), energy);
        let available = if candidates.is_empty() { incomplete } else { candidates };
        let all_skipped = available
            .iter()
            .all(|t| skipped.iter().any(|id| *id == t.id));

        if all_skipped {
            debug!(%energy, "all candidates skipped, starting over");
            self.clear_skips();
            SkipOutcome::Looped
        } else {
            self.skipped_ids = skipped;
            self.skip_count += 1;
            SkipOutcome::Skipped
        }
    }

    pub fn should_suggest_energy_change(&self) -> bool {
        self.skip_count >= self.settings.skip_hint_threshold
    }

    /// Start timing a recommended task.
    pub fn start_timer(&mut self, rec: &TaskRecommendation, now: DateTime<Utc>) -> &TimerSession {
        let timer = TimerSession {
            task_id: rec.task.id.clone(),
            task_title: rec.task.title.clone(),
            estimated_minutes: rec
                .task
                .estimated_minutes
                .unwrap_or(self.settings.default_timer_minutes),
            started_at: now,
        };
        debug!(task_id = %timer.task_id, minutes = timer.estimated_minutes, "timer started");
        self.timer.insert(timer)
    }

    /// Drop the running timer without completing anything.
    pub fn abandon_timer(&mut self) -> Option<TimerSession> {
        self.timer.take()
    }

    /// Stop the timer after the task was done.
    ///
    /// Records the task's goal for context batching and clears declined
    /// tasks. Marking the task completed is left to the store.
    pub fn finish_timer(&mut self, elapsed_seconds: u64, tasks: &[Task]) -> Option<TimerOutcome> {
        let timer = self.timer.take()?;
        let comparison = TimeComparison::new(timer.estimated_minutes, elapsed_seconds);
        self.last_completed_goal_id = tasks
            .iter()
            .find(|t| t.id == timer.task_id)
            .and_then(|t| t.goal_id.clone());
        self.clear_skips();
        debug!(task_id = %timer.task_id, elapsed_seconds, "timer finished");
        Some(TimerOutcome {
            task_id: timer.task_id,
            comparison,
        })
    }
}

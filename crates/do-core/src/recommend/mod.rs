//! Energy-aware single-task recommendation.
//!
//! Rather than presenting a full list, the engine picks exactly one next
//! task. The pipeline is:
//!
//! 1. drop completed tasks,
//! 2. keep only tasks eligible at the selected [`EnergyState`],
//! 3. drop tasks skipped this session, unless that would leave nothing, in
//!    which case every eligible task is considered again (the user loops
//!    back to the top instead of dead-ending),
//! 4. score each candidate (see [`scoring`]),
//! 5. rank by score, oldest first on ties.
//!
//! The engine is pure: it reads its arguments, never mutates them, and keeps
//! no state between calls. "No task" is a normal result, returned as `None`.

pub mod scoring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::energy::{filter_by_energy, EnergyState};
use crate::model::{Goal, Task};

pub use scoring::{EnergyBoost, ScoreComponent, ScoredTask, ScoringContext};

/// Rationale used when no rule produced a reason.
pub const DEFAULT_RATIONALE: &str = "Ready when you are";

/// Separator between reason fragments in a rationale.
pub const RATIONALE_SEPARATOR: &str = " · ";

/// The task to show next and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecommendation {
    pub task: Task,
    pub rationale: String,
    pub score: i32,
}

impl TaskRecommendation {
    fn from_scored(scored: ScoredTask<'_>) -> Self {
        let rationale = if scored.reasons.is_empty() {
            DEFAULT_RATIONALE.to_string()
        } else {
            scored.reasons.join(RATIONALE_SEPARATOR)
        };
        Self {
            task: scored.task.clone(),
            rationale,
            score: scored.score,
        }
    }
}

/// Recommendation engine with a pinned clock and boost policy.
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    now: DateTime<Utc>,
    boost: EnergyBoost,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Engine reading the current time, boost disabled.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Engine evaluating due dates and task age against `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            boost: EnergyBoost::Disabled,
        }
    }

    /// Add the energy-dependent difficulty/duration boost to every score.
    pub fn with_energy_boost(mut self) -> Self {
        self.boost = EnergyBoost::Enabled;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Best candidate, or `None` when nothing is open or eligible.
    pub fn recommend(
        &self,
        tasks: &[Task],
        goals: &[Goal],
        energy: EnergyState,
        skipped_ids: &[String],
        last_completed_goal_id: Option<&str>,
    ) -> Option<TaskRecommendation> {
        let best = self
            .ranked(tasks, goals, energy, skipped_ids, last_completed_goal_id)
            .into_iter()
            .next()?;
        debug!(task_id = %best.task.id, score = best.score, "recommended task");
        Some(TaskRecommendation::from_scored(best))
    }

    /// Best candidate at wired energy, with hard and long tasks boosted.
    ///
    /// Skip exclusion and the loop reset apply as in [`Recommender::recommend`].
    pub fn wired(
        &self,
        tasks: &[Task],
        goals: &[Goal],
        skipped_ids: &[String],
        last_completed_goal_id: Option<&str>,
    ) -> Option<TaskRecommendation> {
        self.with_energy_boost().recommend(
            tasks,
            goals,
            EnergyState::Wired,
            skipped_ids,
            last_completed_goal_id,
        )
    }

    /// Every candidate in recommendation order.
    pub fn rank(
        &self,
        tasks: &[Task],
        goals: &[Goal],
        energy: EnergyState,
        skipped_ids: &[String],
        last_completed_goal_id: Option<&str>,
    ) -> Vec<TaskRecommendation> {
        self.ranked(tasks, goals, energy, skipped_ids, last_completed_goal_id)
            .into_iter()
            .map(TaskRecommendation::from_scored)
            .collect()
    }

    fn ranked<'a>(
        &self,
        tasks: &'a [Task],
        goals: &[Goal],
        energy: EnergyState,
        skipped_ids: &[String],
        last_completed_goal_id: Option<&str>,
    ) -> Vec<ScoredTask<'a>> {
        let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
        if incomplete.is_empty() {
            debug!("no incomplete tasks");
            return Vec::new();
        }

        let candidates = filter_by_energy(incomplete, energy);
        if candidates.is_empty() {
            debug!(%energy, "no tasks match energy level");
            return Vec::new();
        }

        let ctx = ScoringContext::new(goals, skipped_ids, last_completed_goal_id, energy, self.now)
            .with_boost(self.boost);

        let unskipped: Vec<&Task> = candidates
            .iter()
            .copied()
            .filter(|t| !ctx.skipped_ids.contains(t.id.as_str()))
            .collect();
        let pool = if unskipped.is_empty() {
            debug!(candidates = candidates.len(), "every candidate skipped, looping back");
            candidates
        } else {
            unskipped
        };
        trace!(pool = pool.len(), %energy, "scoring candidates");

        let mut scored: Vec<ScoredTask<'a>> =
            pool.into_iter().map(|t| scoring::score_task(t, &ctx)).collect();
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.task.created_at.cmp(&b.task.created_at))
        });
        scored
    }
}

/// Pick the next task for the given energy and session state.
///
/// Due dates and task age are measured against the current time.
pub fn recommend(
    tasks: &[Task],
    goals: &[Goal],
    energy: EnergyState,
    skipped_ids: &[String],
    last_completed_goal_id: Option<&str>,
) -> Option<TaskRecommendation> {
    Recommender::new().recommend(tasks, goals, energy, skipped_ids, last_completed_goal_id)
}

/// Recommendation for wired energy with hard and long tasks boosted.
pub fn wired_recommendation(
    tasks: &[Task],
    goals: &[Goal],
    skipped_ids: &[String],
    last_completed_goal_id: Option<&str>,
) -> Option<TaskRecommendation> {
    Recommender::new().wired(tasks, goals, skipped_ids, last_completed_goal_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Priority};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn make_task(id: &str) -> Task {
        Task::with_id(id, format!("Task {id}"), now())
    }

    fn engine() -> Recommender {
        Recommender::at(now())
    }

    #[test]
    fn returns_none_when_everything_is_done() {
        let mut a = make_task("a");
        a.completed = true;
        let rec = engine().recommend(&[a], &[], EnergyState::Wired, &[], None);
        assert!(rec.is_none());
    }

    #[test]
    fn returns_none_for_empty_list() {
        assert!(engine().recommend(&[], &[], EnergyState::Steady, &[], None).is_none());
    }

    #[test]
    fn returns_none_when_energy_excludes_everything() {
        let mut hard = make_task("hard");
        hard.difficulty = Some(Difficulty::Hard);
        hard.estimated_minutes = Some(60);
        let rec = engine().recommend(&[hard], &[], EnergyState::Low, &[], None);
        assert!(rec.is_none());
    }

    #[test]
    fn low_energy_picks_the_easy_task() {
        let mut a = make_task("a");
        a.difficulty = Some(Difficulty::Easy);
        let mut b = make_task("b");
        b.difficulty = Some(Difficulty::Hard);

        let rec = engine()
            .recommend(&[a, b], &[], EnergyState::Low, &[], None)
            .unwrap();
        assert_eq!(rec.task.id, "a");
    }

    #[test]
    fn goal_priority_and_estimate_build_rationale() {
        let mut a = make_task("a");
        a.goal_id = Some("g1".into());
        a.priority = Some(Priority::High);
        a.estimated_minutes = Some(10);
        let goals = vec![Goal::with_id("g1", "Launch", now())];

        let rec = engine()
            .recommend(&[a], &goals, EnergyState::Steady, &[], None)
            .unwrap();
        assert_eq!(rec.score, 4);
        assert_eq!(rec.rationale, "Moves \"Launch\" forward · High priority");
    }

    #[test]
    fn no_reasons_yields_default_rationale() {
        let rec = engine()
            .recommend(&[make_task("a")], &[], EnergyState::Steady, &[], None)
            .unwrap();
        assert_eq!(rec.score, 0);
        assert_eq!(rec.rationale, DEFAULT_RATIONALE);
    }

    #[test]
    fn skipped_tasks_are_passed_over() {
        let mut urgent = make_task("urgent");
        urgent.due_date = Some(now() + Duration::hours(2));
        let calm = make_task("calm");

        let skipped = vec!["urgent".to_string()];
        let rec = engine()
            .recommend(&[urgent, calm], &[], EnergyState::Steady, &skipped, None)
            .unwrap();
        assert_eq!(rec.task.id, "calm");
    }

    #[test]
    fn all_skipped_loops_back_with_penalty() {
        let mut urgent = make_task("urgent");
        urgent.due_date = Some(now() + Duration::hours(2));
        let calm = make_task("calm");

        let skipped = vec!["urgent".to_string(), "calm".to_string()];
        let rec = engine()
            .recommend(&[urgent, calm], &[], EnergyState::Steady, &skipped, None)
            .unwrap();
        assert_eq!(rec.task.id, "urgent");
        assert_eq!(rec.score, 3 - 1);
    }

    #[test]
    fn ties_go_to_the_oldest_task() {
        let newer = make_task("newer");
        let mut older = make_task("older");
        older.created_at = now() - Duration::hours(1);

        let rec = engine()
            .recommend(&[newer, older], &[], EnergyState::Steady, &[], None)
            .unwrap();
        assert_eq!(rec.task.id, "older");
    }

    #[test]
    fn context_batching_prefers_last_goal() {
        let mut g1 = make_task("g1-task");
        g1.goal_id = Some("g1".into());
        let mut g2 = make_task("g2-task");
        g2.goal_id = Some("g2".into());
        g2.created_at = now() - Duration::hours(1);

        let rec = engine()
            .recommend(&[g1, g2], &[], EnergyState::Steady, &[], Some("g1"))
            .unwrap();
        assert_eq!(rec.task.id, "g1-task");
        assert_eq!(rec.rationale, "Keeps your momentum in this area");
    }

    #[test]
    fn energy_boost_favors_hard_long_work_when_wired() {
        let mut easy = make_task("easy");
        easy.difficulty = Some(Difficulty::Easy);
        easy.priority = Some(Priority::High);
        easy.created_at = now() - Duration::hours(1);
        let mut hard = make_task("hard");
        hard.difficulty = Some(Difficulty::Hard);
        hard.estimated_minutes = Some(45);

        let tasks = vec![easy, hard];
        let plain = engine()
            .recommend(&tasks, &[], EnergyState::Wired, &[], None)
            .unwrap();
        assert_eq!(plain.task.id, "easy");

        let boosted = engine()
            .with_energy_boost()
            .recommend(&tasks, &[], EnergyState::Wired, &[], None)
            .unwrap();
        assert_eq!(boosted.task.id, "hard");
        assert_eq!(boosted.score, 1 + 3 + 2);
        assert_eq!(tasks[1].skip_count, None);
    }

    #[test]
    fn rank_orders_every_candidate() {
        let mut a = make_task("a");
        a.priority = Some(Priority::High);
        let b = make_task("b");
        let mut c = make_task("c");
        c.due_date = Some(now() + Duration::days(3));

        let ranked = engine().rank(&[a, b, c], &[], EnergyState::Steady, &[], None);
        let ids: Vec<&str> = ranked.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}

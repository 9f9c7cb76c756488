//! Per-goal task completion progress.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::Task;

/// Completed versus total tasks linked to one goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GoalProgress {
    pub completed: u32,
    pub total: u32,
    /// Rounded percentage, 0 when the goal has no tasks
    pub percentage: u32,
}

impl GoalProgress {
    pub fn new(completed: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (f64::from(completed) / f64::from(total) * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Progress for every goal referenced by at least one task.
pub fn progress_by_goal(tasks: &[Task]) -> HashMap<String, GoalProgress> {
    let mut counts: HashMap<String, (u32, u32)> = HashMap::new();
    for task in tasks {
        let Some(goal_id) = task.goal_id.as_deref() else {
            continue;
        };
        let entry = counts.entry(goal_id.to_string()).or_default();
        entry.1 += 1;
        if task.completed {
            entry.0 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(id, (completed, total))| (id, GoalProgress::new(completed, total)))
        .collect()
}

/// Progress for a single goal; zeroed when no task references it.
pub fn goal_progress(tasks: &[Task], goal_id: &str) -> GoalProgress {
    let linked = tasks
        .iter()
        .filter(|t| t.goal_id.as_deref() == Some(goal_id));
    let (completed, total) = linked.fold((0, 0), |(done, all), t| {
        (done + u32::from(t.completed), all + 1)
    });
    GoalProgress::new(completed, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn linked(id: &str, goal: Option<&str>, completed: bool) -> Task {
        let mut t = Task::with_id(id, id, Utc::now());
        t.goal_id = goal.map(str::to_string);
        t.completed = completed;
        t
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(GoalProgress::new(1, 3).percentage, 33);
        assert_eq!(GoalProgress::new(2, 3).percentage, 67);
        assert_eq!(GoalProgress::new(0, 0).percentage, 0);
    }

    #[test]
    fn groups_tasks_by_goal() {
        let tasks = vec![
            linked("a", Some("g1"), true),
            linked("b", Some("g1"), false),
            linked("c", Some("g2"), true),
            linked("d", None, true),
        ];
        let progress = progress_by_goal(&tasks);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress["g1"], GoalProgress::new(1, 2));
        assert!(progress["g2"].is_complete());
    }

    #[test]
    fn unknown_goal_has_zero_progress() {
        let tasks = vec![linked("a", Some("g1"), true)];
        assert_eq!(goal_progress(&tasks, "nope"), GoalProgress::default());
        assert_eq!(goal_progress(&tasks, "g1").percentage, 100);
    }
}

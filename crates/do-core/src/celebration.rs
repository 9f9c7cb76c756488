//! Completion messages shown after finishing a task.

use crate::model::{Priority, Task};
use crate::progress::GoalProgress;

/// Goal context for a finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCelebration {
    pub name: String,
    pub completed: u32,
    pub total: u32,
}

impl GoalCelebration {
    pub fn new(name: impl Into<String>, progress: GoalProgress) -> Self {
        Self {
            name: name.into(),
            completed: progress.completed,
            total: progress.total,
        }
    }
}

/// Pick the message for a just-completed task.
///
/// Finishing a whole goal beats a high-priority task, which beats plain
/// goal progress.
pub fn celebration_message(task: &Task, goal: Option<&GoalCelebration>) -> String {
    if let Some(g) = goal.filter(|g| g.total > 0 && g.completed >= g.total) {
        return format!("GOAL COMPLETE: {}! Every task done.", g.name);
    }

    if task.priority == Some(Priority::High) {
        return "Big one knocked out! That took guts.".to_string();
    }

    if let Some(g) = goal.filter(|g| g.total > 0) {
        let pct = GoalProgress::new(g.completed, g.total).percentage;
        return format!("Done! You're now {pct}% through \"{}\".", g.name);
    }

    "Done! One less thing to worry about.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn goal(completed: u32, total: u32) -> GoalCelebration {
        GoalCelebration {
            name: "Launch".into(),
            completed,
            total,
        }
    }

    #[test]
    fn finished_goal_wins_over_priority() {
        let mut task = Task::new("Ship it", Utc::now());
        task.priority = Some(Priority::High);
        assert_eq!(
            celebration_message(&task, Some(&goal(3, 3))),
            "GOAL COMPLETE: Launch! Every task done."
        );
        assert_eq!(celebration_message(&task, Some(&goal(1, 3))), "Big one knocked out! That took guts.");
    }

    #[test]
    fn partial_goal_reports_percentage() {
        let task = Task::new("Draft copy", Utc::now());
        assert_eq!(
            celebration_message(&task, Some(&goal(1, 4))),
            "Done! You're now 25% through \"Launch\"."
        );
    }

    #[test]
    fn plain_task_and_empty_goal_get_default() {
        let task = Task::new("Water plants", Utc::now());
        assert_eq!(celebration_message(&task, None), "Done! One less thing to worry about.");
        assert_eq!(
            celebration_message(&task, Some(&goal(0, 0))),
            "Done! One less thing to worry about."
        );
    }
}

//! Goal management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use do_core::{progress_by_goal, Goal, GoalProgress, TaskDb};
use serde::Serialize;

use super::parse_when;

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a new goal
    Add {
        /// Goal title
        title: String,
        /// Goal description
        #[arg(long)]
        description: Option<String>,
        /// Target date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        target_date: Option<String>,
        /// Display color
        #[arg(long)]
        color: Option<String>,
        /// Number of tasks the goal is expected to take
        #[arg(long)]
        target_tasks: Option<u32>,
    },
    /// Update a goal
    Edit {
        /// Goal ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New target date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        target_date: Option<String>,
        /// New display color
        #[arg(long)]
        color: Option<String>,
        /// New expected task count
        #[arg(long)]
        target_tasks: Option<u32>,
    },
    /// List goals with progress
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a goal; its tasks are kept
    Delete {
        /// Goal ID
        id: String,
    },
}

#[derive(Serialize)]
struct GoalWithProgress {
    #[serde(flatten)]
    goal: Goal,
    progress: GoalProgress,
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        GoalAction::Add {
            title,
            description,
            target_date,
            color,
            target_tasks,
        } => {
            let mut goal = Goal::new(title, Utc::now());
            goal.description = description;
            goal.target_date = target_date.as_deref().map(parse_when).transpose()?;
            goal.color = color;
            goal.target_task_count = target_tasks;

            db.create_goal(&goal)?;
            println!("Goal created: {}", goal.id);
        }
        GoalAction::Edit {
            id,
            title,
            description,
            target_date,
            color,
            target_tasks,
        } => {
            let mut goal = db
                .get_goal(&id)?
                .ok_or_else(|| format!("goal not found: {id}"))?;
            if let Some(title) = title {
                goal.title = title;
            }
            if description.is_some() {
                goal.description = description;
            }
            if let Some(date) = target_date.as_deref() {
                goal.target_date = Some(parse_when(date)?);
            }
            if color.is_some() {
                goal.color = color;
            }
            if target_tasks.is_some() {
                goal.target_task_count = target_tasks;
            }
            goal.updated_at = Utc::now();

            db.update_goal(&goal)?;
            println!("Goal updated: {}", goal.id);
        }
        GoalAction::List { json } => {
            let tasks = db.list_tasks()?;
            let progress = progress_by_goal(&tasks);
            let goals: Vec<GoalWithProgress> = db
                .list_goals()?
                .into_iter()
                .map(|goal| {
                    let progress = progress
                        .get(&goal.id)
                        .copied()
                        .unwrap_or_else(|| GoalProgress::new(0, 0));
                    GoalWithProgress { goal, progress }
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else if goals.is_empty() {
                println!("No goals.");
            } else {
                for g in &goals {
                    println!(
                        "{}  {}  {}/{} ({}%)",
                        g.goal.id,
                        g.goal.title,
                        g.progress.completed,
                        g.progress.total,
                        g.progress.percentage
                    );
                }
            }
        }
        GoalAction::Delete { id } => {
            db.delete_goal(&id)?;
            println!("Goal deleted: {id}");
        }
    }
    Ok(())
}

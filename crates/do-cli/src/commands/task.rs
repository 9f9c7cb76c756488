//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use do_core::{Difficulty, Priority, Task, TaskDb};

use super::parse_when;

/// Estimates above this get a nudge to split the task.
const BREAK_DOWN_MINUTES: u32 = 30;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Goal ID to associate with
        #[arg(long)]
        goal: Option<String>,
        /// Parent task ID
        #[arg(long)]
        parent: Option<String>,
        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,
        /// Estimated minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// Priority: low, medium or high
        #[arg(long)]
        priority: Option<Priority>,
        /// Difficulty: easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Update a task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New goal ID
        #[arg(long)]
        goal: Option<String>,
        /// New parent task ID
        #[arg(long)]
        parent: Option<String>,
        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,
        /// New estimated minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// New priority
        #[arg(long)]
        priority: Option<Priority>,
        /// New difficulty
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// List tasks
    List {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task as completed
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a completed task as open again
    Undo {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        TaskAction::Add {
            title,
            description,
            goal,
            parent,
            due,
            minutes,
            priority,
            difficulty,
        } => {
            check_goal(&db, goal.as_deref())?;
            let mut task = Task::new(title, Utc::now());
            task.description = description;
            task.goal_id = goal;
            task.parent_task_id = parent;
            task.due_date = due.as_deref().map(parse_when).transpose()?;
            task.estimated_minutes = minutes;
            task.priority = priority;
            task.difficulty = difficulty;

            db.create_task(&task)?;
            println!("Task created: {}", task.id);
            if task.estimated_minutes.is_some_and(|m| m > BREAK_DOWN_MINUTES) {
                println!(
                    "Tasks over {BREAK_DOWN_MINUTES} minutes are harder to start. \
                     Break it into smaller steps with: task add <step> --parent {}",
                    task.id
                );
            }
        }
        TaskAction::Edit {
            id,
            title,
            description,
            goal,
            parent,
            due,
            minutes,
            priority,
            difficulty,
        } => {
            check_goal(&db, goal.as_deref())?;
            let mut task = find(&db, &id)?;
            if let Some(title) = title {
                task.title = title;
            }
            if description.is_some() {
                task.description = description;
            }
            if goal.is_some() {
                task.goal_id = goal;
            }
            if parent.is_some() {
                task.parent_task_id = parent;
            }
            if let Some(due) = due.as_deref() {
                task.due_date = Some(parse_when(due)?);
            }
            if minutes.is_some() {
                task.estimated_minutes = minutes;
            }
            if priority.is_some() {
                task.priority = priority;
            }
            if difficulty.is_some() {
                task.difficulty = difficulty;
            }
            task.updated_at = Utc::now();

            db.update_task(&task)?;
            println!("Task updated: {}", task.id);
        }
        TaskAction::List { all, json } => {
            let tasks: Vec<Task> = db
                .list_tasks()?
                .into_iter()
                .filter(|t| all || !t.completed)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", format_line(task));
                }
            }
        }
        TaskAction::Done { id } => {
            let mut task = find(&db, &id)?;
            if task.completed {
                println!("Already done: {}", task.title);
                return Ok(());
            }
            task.mark_completed(Utc::now());
            db.update_task(&task)?;

            let mut session = db.load_session()?;
            session.last_completed_goal_id = task.goal_id.clone();
            db.save_session(&session)?;
            println!("Done: {}", task.title);
        }
        TaskAction::Undo { id } => {
            let mut task = find(&db, &id)?;
            task.mark_incomplete(Utc::now());
            db.update_task(&task)?;
            println!("Reopened: {}", task.title);
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

fn check_goal(db: &TaskDb, goal_id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(goal_id) = goal_id {
        if db.get_goal(goal_id)?.is_none() {
            return Err(format!("goal not found: {goal_id}").into());
        }
    }
    Ok(())
}

fn find(db: &TaskDb, id: &str) -> Result<Task, Box<dyn std::error::Error>> {
    db.get_task(id)?
        .ok_or_else(|| format!("task not found: {id}").into())
}

fn format_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}] {}  {}", task.id, task.title);
    let mut tags = Vec::new();
    if let Some(d) = task.difficulty {
        tags.push(d.to_string());
    }
    if let Some(p) = task.priority {
        tags.push(format!("{p} priority"));
    }
    if let Some(m) = task.estimated_minutes {
        tags.push(format!("{m}m"));
    }
    if let Some(due) = task.due_date {
        tags.push(format!("due {}", due.format("%Y-%m-%d")));
    }
    if !tags.is_empty() {
        line.push_str(&format!(" ({})", tags.join(", ")));
    }
    line
}

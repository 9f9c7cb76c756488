//! SQLite-based storage for tasks, goals, and the focus session.
//!
//! This is the local stand-in for the remote store: it hands the engines
//! complete, already-parsed snapshots and owns every conversion between
//! database text and typed fields.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::model::{Goal, Task};
use crate::session::FocusSession;

const TASK_COLUMNS: &str = "id, title, description, completed, goal_id, parent_task_id,
    created_at, updated_at, due_date, estimated_minutes, priority, difficulty,
    energy_level, started_at, completed_at, skip_count";

const GOAL_COLUMNS: &str =
    "id, title, description, target_date, created_at, updated_at, color, target_task_count";

// === Helper Functions ===

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    parse_datetime(dt_str).unwrap_or_else(Utc::now)
}

fn parse_datetime(dt_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn parse_optional_datetime(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.as_deref().and_then(parse_datetime)
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Unknown enum text is treated as "not set"
fn parse_optional_enum<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        goal_id: row.get(4)?,
        parent_task_id: row.get(5)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
        due_date: parse_optional_datetime(row.get(8)?),
        estimated_minutes: row.get(9)?,
        priority: parse_optional_enum(row.get(10)?),
        difficulty: parse_optional_enum(row.get(11)?),
        energy_level: parse_optional_enum(row.get(12)?),
        started_at: parse_optional_datetime(row.get(13)?),
        completed_at: parse_optional_datetime(row.get(14)?),
        skip_count: row.get(15)?,
    })
}

fn row_to_goal(row: &Row) -> Result<Goal, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        target_date: parse_optional_datetime(row.get(3)?),
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
        color: row.get(6)?,
        target_task_count: row.get(7)?,
    })
}

/// SQLite database for tasks and goals.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the database at `<data dir>/do.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("do.db"))
    }

    /// Open a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id                TEXT PRIMARY KEY,
                    title             TEXT NOT NULL,
                    description       TEXT,
                    completed         INTEGER NOT NULL DEFAULT 0,
                    goal_id           TEXT,
                    parent_task_id    TEXT,
                    created_at        TEXT NOT NULL,
                    updated_at        TEXT NOT NULL,
                    due_date          TEXT,
                    estimated_minutes INTEGER,
                    priority          TEXT,
                    difficulty        TEXT,
                    energy_level      TEXT,
                    started_at        TEXT,
                    completed_at      TEXT,
                    skip_count        INTEGER
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_goal ON tasks(goal_id);

                CREATE TABLE IF NOT EXISTS goals (
                    id                TEXT PRIMARY KEY,
                    title             TEXT NOT NULL,
                    description       TEXT,
                    target_date       TEXT,
                    created_at        TEXT NOT NULL,
                    updated_at        TEXT NOT NULL,
                    color             TEXT,
                    target_task_count INTEGER
                );

                CREATE TABLE IF NOT EXISTS focus_session (
                    id    INTEGER PRIMARY KEY CHECK (id = 1),
                    state TEXT NOT NULL
                );",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Tasks ===

    pub fn create_task(&self, task: &Task) -> Result<()> {
        task.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                task.id,
                task.title,
                task.description,
                task.completed,
                task.goal_id,
                task.parent_task_id,
                format_datetime(&task.created_at),
                format_datetime(&task.updated_at),
                task.due_date.as_ref().map(format_datetime),
                task.estimated_minutes,
                task.priority.map(|p| p.as_str()),
                task.difficulty.map(|d| d.as_str()),
                task.energy_level.map(|e| e.as_str()),
                task.started_at.as_ref().map(format_datetime),
                task.completed_at.as_ref().map(format_datetime),
                task.skip_count,
            ],
        )?;
        debug!(task_id = %task.id, "created task");
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// All tasks, oldest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, id"))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn update_task(&self, task: &Task) -> Result<()> {
        task.validate()?;
        let changed = self.conn.execute(
            "UPDATE tasks SET
                title = ?2, description = ?3, completed = ?4, goal_id = ?5,
                parent_task_id = ?6, created_at = ?7, updated_at = ?8, due_date = ?9,
                estimated_minutes = ?10, priority = ?11, difficulty = ?12,
                energy_level = ?13, started_at = ?14, completed_at = ?15, skip_count = ?16
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.completed,
                task.goal_id,
                task.parent_task_id,
                format_datetime(&task.created_at),
                format_datetime(&task.updated_at),
                task.due_date.as_ref().map(format_datetime),
                task.estimated_minutes,
                task.priority.map(|p| p.as_str()),
                task.difficulty.map(|d| d.as_str()),
                task.energy_level.map(|e| e.as_str()),
                task.started_at.as_ref().map(format_datetime),
                task.completed_at.as_ref().map(format_datetime),
                task.skip_count,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "Task",
                id: task.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "Task",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // === Goals ===

    pub fn create_goal(&self, goal: &Goal) -> Result<()> {
        goal.validate()?;
        self.conn.execute(
            &format!("INSERT INTO goals ({GOAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                goal.id,
                goal.title,
                goal.description,
                goal.target_date.as_ref().map(format_datetime),
                format_datetime(&goal.created_at),
                format_datetime(&goal.updated_at),
                goal.color,
                goal.target_task_count,
            ],
        )?;
        debug!(goal_id = %goal.id, "created goal");
        Ok(())
    }

    pub fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let goal = self
            .conn
            .query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
                params![id],
                row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goals ORDER BY created_at, id"))?;
        let goals = stmt
            .query_map([], row_to_goal)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn update_goal(&self, goal: &Goal) -> Result<()> {
        goal.validate()?;
        let changed = self.conn.execute(
            "UPDATE goals SET
                title = ?2, description = ?3, target_date = ?4, created_at = ?5,
                updated_at = ?6, color = ?7, target_task_count = ?8
             WHERE id = ?1",
            params![
                goal.id,
                goal.title,
                goal.description,
                goal.target_date.as_ref().map(format_datetime),
                format_datetime(&goal.created_at),
                format_datetime(&goal.updated_at),
                goal.color,
                goal.target_task_count,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "Goal",
                id: goal.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Delete a goal. Tasks that reference it keep their `goal_id`.
    pub fn delete_goal(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "Goal",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // === Focus session ===

    /// The persisted focus session, or a fresh one.
    pub fn load_session(&self) -> Result<FocusSession> {
        let state: Option<String> = self
            .conn
            .query_row("SELECT state FROM focus_session WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        match state {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(FocusSession::default()),
        }
    }

    pub fn save_session(&self, session: &FocusSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO focus_session (id, state) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET state = excluded.state",
            params![json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyState;
    use crate::error::CoreError;
    use crate::model::{Difficulty, Priority};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn make_test_task() -> Task {
        let mut task = Task::with_id("t1", "Write intro", now());
        task.description = Some("first paragraph".into());
        task.goal_id = Some("g1".into());
        task.due_date = Some(now() + Duration::days(2));
        task.estimated_minutes = Some(20);
        task.priority = Some(Priority::High);
        task.difficulty = Some(Difficulty::Medium);
        task.energy_level = Some(EnergyState::Steady);
        task.skip_count = Some(1);
        task
    }

    #[test]
    fn create_and_get_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = make_test_task();
        db.create_task(&task).unwrap();
        assert_eq!(db.get_task("t1").unwrap(), Some(task));
        assert!(db.get_task("missing").unwrap().is_none());
    }

    #[test]
    fn list_tasks_oldest_first() {
        let db = TaskDb::open_memory().unwrap();
        let newer = Task::with_id("newer", "Newer", now());
        let older = Task::with_id("older", "Older", now() - Duration::days(1));
        db.create_task(&newer).unwrap();
        db.create_task(&older).unwrap();
        let ids: Vec<String> = db.list_tasks().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[test]
    fn update_task_persists_completion() {
        let db = TaskDb::open_memory().unwrap();
        let mut task = make_test_task();
        db.create_task(&task).unwrap();

        task.mark_completed(now());
        db.update_task(&task).unwrap();
        let stored = db.get_task("t1").unwrap().unwrap();
        assert!(stored.completed);
        assert_eq!(stored.completed_at, Some(now()));
    }

    #[test]
    fn update_and_delete_missing_rows_fail() {
        let db = TaskDb::open_memory().unwrap();
        let task = make_test_task();
        assert!(matches!(
            db.update_task(&task),
            Err(CoreError::Database(DatabaseError::NotFound { .. }))
        ));
        assert!(db.delete_task("t1").is_err());
        assert!(db.delete_goal("g1").is_err());
    }

    #[test]
    fn create_rejects_invalid_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::with_id("blank", "  ", now());
        assert!(matches!(db.create_task(&task), Err(CoreError::Validation(_))));
    }

    #[test]
    fn deleting_goal_leaves_tasks_alone() {
        let db = TaskDb::open_memory().unwrap();
        let goal = Goal::with_id("g1", "Launch", now());
        db.create_goal(&goal).unwrap();
        db.create_task(&make_test_task()).unwrap();

        db.delete_goal("g1").unwrap();
        assert!(db.list_goals().unwrap().is_empty());
        assert_eq!(db.get_task("t1").unwrap().unwrap().goal_id.as_deref(), Some("g1"));
    }

    #[test]
    fn goal_round_trip() {
        let db = TaskDb::open_memory().unwrap();
        let mut goal = Goal::with_id("g1", "Launch", now());
        goal.color = Some("#7c9a6d".into());
        goal.target_task_count = Some(5);
        db.create_goal(&goal).unwrap();

        goal.title = "Launch v2".into();
        db.update_goal(&goal).unwrap();
        assert_eq!(db.get_goal("g1").unwrap(), Some(goal));
    }

    #[test]
    fn session_defaults_then_persists() {
        let db = TaskDb::open_memory().unwrap();
        assert_eq!(db.load_session().unwrap(), FocusSession::default());

        let mut session = FocusSession::default();
        session.select_energy(EnergyState::Low);
        session.last_completed_goal_id = Some("g1".into());
        db.save_session(&session).unwrap();
        db.save_session(&session).unwrap();
        assert_eq!(db.load_session().unwrap(), session);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("do.db");
        {
            let db = TaskDb::open_at(&path).unwrap();
            db.create_task(&make_test_task()).unwrap();
        }
        let reopened = TaskDb::open_at(&path).unwrap();
        assert_eq!(reopened.list_tasks().unwrap().len(), 1);
    }
}

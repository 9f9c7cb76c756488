pub mod config;
pub mod focus;
pub mod goal;
pub mod momentum;
pub mod task;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use do_core::{Goal, Task, TaskDb};

/// Everything the engines read, loaded in one go.
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub goals: Vec<Goal>,
}

impl Snapshot {
    pub fn load(db: &TaskDb) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            tasks: db.list_tasks()?,
            goals: db.list_goals()?,
        })
    }

    pub fn goal_title(&self, goal_id: Option<&str>) -> Option<&str> {
        let id = goal_id?;
        self.goals
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.title.as_str())
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (local midnight).
pub fn parse_when(value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}': use YYYY-MM-DD or RFC 3339"))?;
    let local = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .ok_or_else(|| format!("date '{value}' does not exist in the local time zone"))?;
    Ok(local.with_timezone(&Utc))
}

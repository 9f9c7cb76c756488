use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::energy::EnergyState;
use crate::error::ValidationError;

/// User-assigned priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("'{other}' is not one of low, medium, high"),
            }),
        }
    }
}

/// How hard the user expects a task to be. Drives energy filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::InvalidValue {
                field: "difficulty".into(),
                message: format!("'{other}' is not one of easy, medium, hard"),
            }),
        }
    }
}

/// A single to-do item.
///
/// `completed_at` should be set whenever `completed` flips to `true` and
/// cleared when it flips back; [`Task::mark_completed`] and
/// [`Task::mark_incomplete`] keep the two in sync. The engines only read
/// tasks and never rely on this beyond `completed_at` for momentum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Display title (non-empty)
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// Owning goal, not checked for existence
    #[serde(default)]
    pub goal_id: Option<String>,
    /// Parent task when this is a broken-down sub-step
    #[serde(default)]
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// The user's own time guess in minutes
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Stored with the task but not consulted by the recommender.
    #[serde(default)]
    pub energy_level: Option<EnergyState>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skip_count: Option<u32>,
}

impl Task {
    /// Create an incomplete task with a fresh UUID.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, now)
    }

    /// Create an incomplete task with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            completed: false,
            goal_id: None,
            parent_task_id: None,
            created_at: now,
            updated_at: now,
            due_date: None,
            estimated_minutes: None,
            priority: None,
            difficulty: None,
            energy_level: None,
            started_at: None,
            completed_at: None,
            skip_count: None,
        }
    }

    /// Check the fields the store refuses to persist.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle { entity: "Task" });
        }
        if self.estimated_minutes == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "estimated_minutes".into(),
                message: "must be a positive number of minutes".into(),
            });
        }
        Ok(())
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_incomplete(&mut self, now: DateTime<Utc>) {
        self.completed = false;
        self.completed_at = None;
        self.updated_at = now;
    }

    /// Flip completion, keeping `completed_at` consistent.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.completed {
            self.mark_incomplete(now);
        } else {
            self.mark_completed(now);
        }
    }

    /// Neither difficulty nor an estimate has been recorded.
    pub fn is_untagged(&self) -> bool {
        self.difficulty.is_none() && self.estimated_minutes.is_none()
    }
}

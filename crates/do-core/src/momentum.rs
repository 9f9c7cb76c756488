//! Rolling seven-day momentum.
//!
//! Momentum counts completions per calendar day over the last week and maps
//! the total to an encouraging level. There is no penalty for quiet days:
//! old completions simply age out of the window.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::Task;

/// Number of days in the momentum window, today included.
pub const WINDOW_DAYS: usize = 7;

/// Completions in the window that fill the progress bar.
pub const FULL_BAR_COMPLETIONS: u32 = 10;

/// Qualitative momentum level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MomentumLevel {
    Starting,
    Building,
    Rolling,
    Unstoppable,
}

impl MomentumLevel {
    /// Level and label for a seven-day completion total.
    pub fn classify(completed_last_7_days: u32) -> (Self, &'static str) {
        match completed_last_7_days {
            0 => (MomentumLevel::Starting, "Ready to start"),
            1..=2 => (MomentumLevel::Starting, "Getting started"),
            3..=5 => (MomentumLevel::Building, "Building nicely"),
            6..=9 => (MomentumLevel::Rolling, "On a roll"),
            _ => (MomentumLevel::Unstoppable, "Unstoppable"),
        }
    }
}

/// Seven-day completion profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MomentumData {
    pub completed_last_7_days: u32,
    /// `daily_counts[0]` is today, `daily_counts[6]` is six days ago
    pub daily_counts: [u32; WINDOW_DAYS],
    pub level: MomentumLevel,
    pub label: String,
}

impl MomentumData {
    fn from_counts(daily_counts: [u32; WINDOW_DAYS]) -> Self {
        let completed_last_7_days = daily_counts.iter().sum();
        let (level, label) = MomentumLevel::classify(completed_last_7_days);
        Self {
            completed_last_7_days,
            daily_counts,
            level,
            label: label.to_string(),
        }
    }

    /// Fill of the progress bar, 0-100, full at ten completions.
    pub fn percentage(&self) -> u32 {
        let pct = (f64::from(self.completed_last_7_days) / f64::from(FULL_BAR_COMPLETIONS) * 100.0)
            .round() as u32;
        pct.min(100)
    }
}

/// Momentum relative to the local clock and time zone.
pub fn calculate_momentum(tasks: &[Task]) -> MomentumData {
    calculate_momentum_at(tasks, Local::now())
}

/// Momentum with days delimited by midnight in `now`'s time zone.
pub fn calculate_momentum_at<Tz: TimeZone>(tasks: &[Task], now: DateTime<Tz>) -> MomentumData {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut daily_counts = [0u32; WINDOW_DAYS];

    for task in tasks.iter().filter(|t| t.completed) {
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        let day = completed_at.with_timezone(&tz).date_naive();
        let offset = (today - day).num_days();
        if (0..WINDOW_DAYS as i64).contains(&offset) {
            daily_counts[offset as usize] += 1;
        } else {
            trace!(task_id = %task.id, offset, "completion outside momentum window");
        }
    }

    MomentumData::from_counts(daily_counts)
}

/// Completions on `now`'s calendar day, matching `daily_counts[0]`.
pub fn completed_today<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> usize {
    calculate_momentum_at(tasks, now.clone()).daily_counts[0] as usize
}

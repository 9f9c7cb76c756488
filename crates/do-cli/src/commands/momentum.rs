//! Momentum command for CLI.

use chrono::{Duration, Local};
use do_core::{calculate_momentum_at, completed_today, Config, TaskDb};
use serde_json::json;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = TaskDb::open()?;
    let tasks = db.list_tasks()?;
    let now = Local::now();

    let momentum = calculate_momentum_at(&tasks, now);
    let today = completed_today(&tasks, &now);

    if json {
        let value = json!({
            "completed_last_7_days": momentum.completed_last_7_days,
            "daily_counts": momentum.daily_counts,
            "level": momentum.level,
            "label": momentum.label,
            "percentage": momentum.percentage(),
            "completed_today": today,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", momentum.label);
    println!(
        "{} done in the last 7 days ({}%), {today} today",
        momentum.completed_last_7_days,
        momentum.percentage()
    );
    if config.momentum.show_daily_counts {
        for (offset, count) in momentum.daily_counts.iter().enumerate() {
            let day = (now - Duration::days(offset as i64)).format("%a %m-%d");
            println!("  {day}  {}", "#".repeat(*count as usize));
        }
    }
    Ok(())
}

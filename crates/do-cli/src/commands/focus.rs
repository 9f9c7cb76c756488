//! Focus flow commands: pick an energy level, get one task, time it.

use chrono::Utc;
use clap::Subcommand;
use do_core::{
    celebration_message, goal_progress, Config, EnergyState, FocusSession, FocusView,
    GoalCelebration, SkipOutcome, TaskDb,
};
use tracing::debug;

use super::Snapshot;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Set the current energy level (low, steady, wired)
    Energy {
        /// Energy level
        level: EnergyState,
    },
    /// Go back to choosing an energy level
    Change,
    /// Show the current recommendation
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Not this one: skip the current recommendation
    Skip,
    /// Start a timer on the current recommendation
    Start,
    /// Finish the running timer and complete its task
    Done {
        /// Elapsed seconds, overrides the timer clock
        #[arg(long)]
        elapsed: Option<u64>,
    },
    /// Stop the running timer without completing the task
    Abandon,
    /// Clear energy, skips and timer
    Reset,
}

pub fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = TaskDb::open()?;
    let mut session = db.load_session()?.with_config(config.focus.clone());

    match action {
        FocusAction::Energy { level } => {
            session.select_energy(level);
            db.save_session(&session)?;
            println!("Energy: {}", level.label());
            let snapshot = Snapshot::load(&db)?;
            print_view(&session, &snapshot);
        }
        FocusAction::Change => {
            session.clear_energy();
            db.save_session(&session)?;
            let snapshot = Snapshot::load(&db)?;
            print_view(&session, &snapshot);
        }
        FocusAction::Show { json } => {
            let snapshot = Snapshot::load(&db)?;
            let view = session.view(&snapshot.tasks, &snapshot.goals);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&session, &snapshot);
            }
        }
        FocusAction::Skip => {
            let snapshot = Snapshot::load(&db)?;
            let Some(rec) = session.recommendation(&snapshot.tasks, &snapshot.goals) else {
                return Err("nothing to skip".into());
            };
            match session.skip(&rec.task.id, &snapshot.tasks) {
                SkipOutcome::Skipped => println!("Skipped: {}", rec.task.title),
                SkipOutcome::Looped => println!("That was everything. Starting over."),
                SkipOutcome::Ignored => return Err("choose an energy level first".into()),
            }
            db.save_session(&session)?;
            print_view(&session, &snapshot);
        }
        FocusAction::Start => {
            if let Some(timer) = &session.timer {
                return Err(format!("timer already running for: {}", timer.task_title).into());
            }
            let snapshot = Snapshot::load(&db)?;
            let Some(rec) = session.recommendation(&snapshot.tasks, &snapshot.goals) else {
                return Err("no task to start".into());
            };
            let timer = session.start_timer(&rec, Utc::now());
            println!("Timer started: {} ({} min)", timer.task_title, timer.estimated_minutes);
            db.save_session(&session)?;
        }
        FocusAction::Done { elapsed } => {
            let Some(timer) = session.timer.clone() else {
                return Err("no timer running".into());
            };
            let now = Utc::now();
            let elapsed = elapsed.unwrap_or_else(|| timer.elapsed_seconds(now));

            let Some(mut task) = db.get_task(&timer.task_id)? else {
                session.abandon_timer();
                db.save_session(&session)?;
                return Err(format!("task not found: {}", timer.task_id).into());
            };
            task.mark_completed(now);
            db.update_task(&task)?;

            let snapshot = Snapshot::load(&db)?;
            if let Some(outcome) = session.finish_timer(elapsed, &snapshot.tasks) {
                println!("{}", outcome.comparison.message());
            }
            db.save_session(&session)?;

            let celebration = task.goal_id.as_deref().and_then(|goal_id| {
                snapshot
                    .goal_title(Some(goal_id))
                    .map(|name| GoalCelebration::new(name, goal_progress(&snapshot.tasks, goal_id)))
            });
            println!("{}", celebration_message(&task, celebration.as_ref()));
        }
        FocusAction::Abandon => match session.abandon_timer() {
            Some(timer) => {
                db.save_session(&session)?;
                println!("Timer stopped: {}", timer.task_title);
            }
            None => println!("No timer running."),
        },
        FocusAction::Reset => {
            session.reset();
            db.save_session(&session)?;
            println!("Focus reset.");
        }
    }
    Ok(())
}

fn print_view(session: &FocusSession, snapshot: &Snapshot) {
    let view = session.view(&snapshot.tasks, &snapshot.goals);
    debug!(?view, "focus view");
    match view {
        FocusView::ChooseEnergy => {
            println!("How's your energy? Run: focus energy <low|steady|wired>");
        }
        FocusView::NoTasks => println!("No tasks yet. Add one with: task add <title>"),
        FocusView::AllDone => println!("All done! Nothing left on your list."),
        FocusView::Recommendation(rec) => {
            println!("Next: {}", rec.task.title);
            println!("Why:  {}", rec.rationale);
            if let Some(goal) = snapshot.goal_title(rec.task.goal_id.as_deref()) {
                println!("Goal: {goal}");
            }
            if let Some(minutes) = rec.task.estimated_minutes {
                println!("Est:  {minutes} min");
            }
        }
        FocusView::NoMatch {
            energy,
            availability,
        } => {
            println!("Nothing fits {} energy right now.", energy.label().to_lowercase());
            for (other, count) in availability.alternatives(energy) {
                println!("  {}: {count} task(s)", other.label());
            }
        }
    }

    if session.should_suggest_energy_change() {
        println!("Not feeling these? Try a different energy level.");
    }
    if let Some(timer) = &session.timer {
        let now = Utc::now();
        let minutes = timer.elapsed_seconds(now) / 60;
        let note = if timer.is_over_estimate(now) { ", past your estimate" } else { "" };
        println!(
            "Timer: {} ({minutes} of {} min{note})",
            timer.task_title, timer.estimated_minutes
        );
    }
}

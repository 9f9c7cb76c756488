//! Integration tests for the recommendation engine.

use chrono::{DateTime, Duration, Utc};
use do_core::{
    filter_by_energy, wired_recommendation, Difficulty, EnergyState, Goal, Priority, Recommender,
    Task,
};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    "2026-03-10T12:00:00Z".parse().unwrap()
}

fn engine() -> Recommender {
    Recommender::at(now())
}

#[test]
fn low_energy_scenario_picks_easy_task() {
    let mut a = Task::with_id("a", "Reply to email", now());
    a.difficulty = Some(Difficulty::Easy);
    let mut b = Task::with_id("b", "Refactor billing", now());
    b.difficulty = Some(Difficulty::Hard);

    let rec = engine()
        .recommend(&[a, b], &[], EnergyState::Low, &[], None)
        .expect("easy task should be recommended");
    assert_eq!(rec.task.id, "a");
}

#[test]
fn steady_scenario_scores_goal_priority_and_estimate() {
    let mut a = Task::with_id("a", "Write landing page", now());
    a.goal_id = Some("g1".into());
    a.priority = Some(Priority::High);
    a.estimated_minutes = Some(10);
    let goals = vec![Goal::with_id("g1", "Launch", now())];

    let rec = engine()
        .recommend(&[a], &goals, EnergyState::Steady, &[], None)
        .unwrap();
    assert_eq!(rec.score, 4);
    assert_eq!(rec.rationale, "Moves \"Launch\" forward · High priority");
}

#[test]
fn every_rule_contributes_in_order() {
    let mut task = Task::with_id("a", "Tax forms", now() - Duration::days(10));
    task.due_date = Some(now() + Duration::hours(12));
    task.goal_id = Some("g1".into());
    task.priority = Some(Priority::High);
    task.estimated_minutes = Some(25);
    let goals = vec![Goal::with_id("g1", "Finances", now())];

    let rec = engine()
        .recommend(&[task], &goals, EnergyState::Wired, &[], Some("g1"))
        .unwrap();
    assert_eq!(rec.score, 3 + 2 + 2 + 1 + 1 + 1);
    assert_eq!(
        rec.rationale,
        "Time-sensitive · Moves \"Finances\" forward · Keeps your momentum in this area · \
         High priority · Been waiting patiently"
    );
}

#[test]
fn inputs_are_not_mutated() {
    let mut hard = Task::with_id("hard", "Deep work", now());
    hard.difficulty = Some(Difficulty::Hard);
    hard.estimated_minutes = Some(90);
    let tasks = vec![hard];
    let before = tasks.clone();
    let skipped = vec!["hard".to_string()];

    let _ = engine()
        .with_energy_boost()
        .recommend(&tasks, &[], EnergyState::Wired, &skipped, None);
    assert_eq!(tasks, before);
    assert_eq!(skipped, vec!["hard".to_string()]);
}

#[test]
fn wired_recommendation_boosts_hard_long_tasks() {
    let clock = Utc::now();
    let mut easy = Task::with_id("easy", "File receipts", clock - Duration::days(10));
    easy.difficulty = Some(Difficulty::Easy);
    easy.priority = Some(Priority::High);
    let mut hard = Task::with_id("hard", "Rewrite sync layer", clock);
    hard.difficulty = Some(Difficulty::Hard);
    hard.estimated_minutes = Some(45);
    let tasks = vec![easy, hard];

    let rec = wired_recommendation(&tasks, &[], &[], None).unwrap();
    assert_eq!(rec.task.id, "hard");
    assert_eq!(rec.score, 1 + 3 + 2);
    assert_eq!(rec.rationale, "Ready when you are");

    let unboosted = Recommender::new()
        .recommend(&tasks, &[], EnergyState::Wired, &[], None)
        .unwrap();
    assert_eq!(unboosted.task.id, "easy");
}

#[test]
fn wired_recommendation_keeps_skip_rules() {
    let clock = Utc::now();
    let mut easy = Task::with_id("easy", "File receipts", clock - Duration::days(10));
    easy.difficulty = Some(Difficulty::Easy);
    easy.priority = Some(Priority::High);
    let mut hard = Task::with_id("hard", "Rewrite sync layer", clock);
    hard.difficulty = Some(Difficulty::Hard);
    hard.estimated_minutes = Some(45);
    let tasks = vec![easy, hard];

    let skip_hard = vec!["hard".to_string()];
    let rec = wired_recommendation(&tasks, &[], &skip_hard, None).unwrap();
    assert_eq!(rec.task.id, "easy");

    let skip_all = vec!["hard".to_string(), "easy".to_string()];
    let rec = wired_recommendation(&tasks, &[], &skip_all, None).unwrap();
    assert_eq!(rec.task.id, "hard");
    assert_eq!(rec.score, 1 + 3 + 2 - 1);
}

fn arb_task(index: usize) -> impl Strategy<Value = Task> {
    (
        any::<bool>(),
        prop::option::of(prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Medium),
            Just(Difficulty::Hard)
        ]),
        prop::option::of(1u32..120),
        prop::option::of(prop_oneof![Just(Priority::Low), Just(Priority::High)]),
        prop::option::of(prop_oneof![Just("g1".to_string()), Just("g2".to_string())]),
        0i64..20,
        prop::option::of(-5i64..20),
    )
        .prop_map(
            move |(completed, difficulty, minutes, priority, goal, age_days, due_days)| {
                let mut t = Task::with_id(
                    format!("t{index}"),
                    format!("Task {index}"),
                    now() - Duration::days(age_days),
                );
                t.completed = completed;
                t.difficulty = difficulty;
                t.estimated_minutes = minutes;
                t.priority = priority;
                t.goal_id = goal;
                t.due_date = due_days.map(|d| now() + Duration::days(d));
                t
            },
        )
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    (0usize..12).prop_flat_map(|n| (0..n).map(arb_task).collect::<Vec<_>>())
}

fn arb_energy() -> impl Strategy<Value = EnergyState> {
    prop_oneof![
        Just(EnergyState::Low),
        Just(EnergyState::Steady),
        Just(EnergyState::Wired)
    ]
}

proptest! {
    #[test]
    fn nothing_open_means_no_recommendation(mut tasks in arb_tasks(), energy in arb_energy()) {
        for t in &mut tasks {
            t.completed = true;
        }
        let skipped: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
        prop_assert!(engine().recommend(&tasks, &[], energy, &skipped, Some("g1")).is_none());
    }

    #[test]
    fn low_energy_only_recommends_approachable_tasks(tasks in arb_tasks()) {
        if let Some(rec) = engine().recommend(&tasks, &[], EnergyState::Low, &[], None) {
            let t = &rec.task;
            prop_assert!(
                t.difficulty == Some(Difficulty::Easy)
                    || t.estimated_minutes.is_some_and(|m| m <= 15)
                    || (t.difficulty.is_none() && t.estimated_minutes.is_none())
            );
        }
    }

    #[test]
    fn steady_energy_never_recommends_hard(tasks in arb_tasks()) {
        if let Some(rec) = engine().recommend(&tasks, &[], EnergyState::Steady, &[], None) {
            prop_assert_ne!(rec.task.difficulty, Some(Difficulty::Hard));
        }
    }

    #[test]
    fn wired_considers_every_open_task(tasks in arb_tasks()) {
        let open: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
        let ranked = engine().rank(&tasks, &[], EnergyState::Wired, &[], None);
        prop_assert_eq!(ranked.len(), open.len());
        prop_assert_eq!(filter_by_energy(open.iter().copied(), EnergyState::Wired).len(), open.len());
    }

    #[test]
    fn recommendation_is_idempotent(
        tasks in arb_tasks(),
        energy in arb_energy(),
        skip_first in any::<bool>(),
    ) {
        let skipped: Vec<String> = if skip_first {
            tasks.iter().take(1).map(|t| t.id.clone()).collect()
        } else {
            Vec::new()
        };
        let first = engine().recommend(&tasks, &[], energy, &skipped, Some("g2"));
        let second = engine().recommend(&tasks, &[], energy, &skipped, Some("g2"));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn skipping_everything_loops_back_with_penalty(tasks in arb_tasks(), energy in arb_energy()) {
        let open: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
        let eligible: Vec<String> = filter_by_energy(&open, energy)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        let looped = engine().recommend(&tasks, &[], energy, &eligible, None);
        let fresh = engine().rank(&tasks, &[], energy, &[], None);
        match looped {
            None => prop_assert!(eligible.is_empty()),
            Some(rec) => {
                prop_assert!(eligible.contains(&rec.task.id));
                let best_fresh = fresh.iter().map(|r| r.score).max().unwrap();
                prop_assert_eq!(rec.score, best_fresh - 1);
            }
        }
    }
}

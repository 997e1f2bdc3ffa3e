#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::{Assignment, PlanConfig, SchedError, Scheduler, Slot, SolveOptions, WorkerId};
use std::collections::BTreeSet;
use std::time::Duration;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn scheduler(start: NaiveDate, end: NaiveDate, machines: &[&str], workers: &[&str]) -> Scheduler {
    let plan = PlanConfig::new(start, end, machines.iter().copied(), workers.iter().copied());
    Scheduler::new(&plan).unwrap()
}

fn find(slots: &[Slot], date: NaiveDate, machine: &str) -> Slot {
    slots
        .iter()
        .find(|s| s.date == date && s.machine == machine)
        .cloned()
        .unwrap()
}

fn assert_total(s: &Scheduler, assignment: &Assignment) {
    assert_eq!(assignment.len(), s.slots().len());
    let keys: BTreeSet<_> = assignment.placements().iter().map(|p| p.slot).collect();
    assert_eq!(keys.len(), s.slots().len());
    assert!(s.slots().iter().all(|slot| assignment.worker_for(slot.id).is_some()));
}

#[test]
fn two_machines_two_weekdays_two_workers() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 7), &["A", "B"], &["ana", "bob"]);
    assert_eq!(s.slots().len(), 4);

    let assignment = s.solve(SolveOptions::default()).unwrap();
    assert_total(&s, &assignment);
    for w in s.workers() {
        assert_eq!(assignment.count_for(w), 2);
    }
    for day in [d(2025, 10, 6), d(2025, 10, 7)] {
        let a = assignment.worker_for(find(s.slots(), day, "A").id);
        let b = assignment.worker_for(find(s.slots(), day, "B").id);
        assert_ne!(a, b);
    }
    assert!(s.validate(&assignment).is_valid());
}

#[test]
fn single_weekend_day_single_worker() {
    let s = scheduler(d(2025, 10, 11), d(2025, 10, 11), &["night", "A"], &["solo"]);
    assert_eq!(s.slots().len(), 1);
    let assignment = s.solve(SolveOptions::default()).unwrap();
    assert_eq!(assignment.worker_for(s.slots()[0].id), Some(&WorkerId::new("solo")));
}

#[test]
fn cooldown_keeps_machine_away_from_same_worker() {
    // A du lundi au jeudi : quatre slots à moins de 8 jours l'un de l'autre
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 9), &["A"], &["ana", "bob", "cyd", "dee"]);
    let assignment = s.solve(SolveOptions::default()).unwrap();
    let monday = find(s.slots(), d(2025, 10, 6), "A");
    let thursday = find(s.slots(), d(2025, 10, 9), "A");
    assert_ne!(
        assignment.worker_for(monday.id),
        assignment.worker_for(thursday.id)
    );
    let distinct: BTreeSet<_> = assignment.placements().iter().map(|p| &p.worker).collect();
    assert_eq!(distinct.len(), 4);
}

#[test]
fn cooldown_with_too_few_workers_is_infeasible() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 9), &["A"], &["ana", "bob", "cyd"]);
    assert!(matches!(
        s.solve(SolveOptions::default()),
        Err(SchedError::Infeasible)
    ));
}

#[test]
fn more_same_day_slots_than_workers_is_infeasible() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 6), &["A", "B", "C"], &["ana", "bob"]);
    assert!(matches!(
        s.solve(SolveOptions::default()),
        Err(SchedError::Infeasible)
    ));
}

#[test]
fn saturday_night_over_commits_friday_roster() {
    // vendredi : nuit + A ; samedi : garde qui exclut tout le vendredi
    let s = scheduler(d(2025, 10, 10), d(2025, 10, 11), &["night", "A"], &["ana", "bob"]);
    assert_eq!(s.slots().len(), 3);
    assert!(matches!(
        s.solve(SolveOptions::default()),
        Err(SchedError::Infeasible)
    ));
}

#[test]
fn balanced_when_slots_divide_evenly() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 8), &["night", "A"], &["ana", "bob", "cyd"]);
    assert_eq!(s.slots().len(), 6);
    let assignment = s.solve(SolveOptions::default()).unwrap();
    assert_total(&s, &assignment);
    let report = s.validate(&assignment);
    assert!(report.is_valid());
    assert!(report.fairness.counts.iter().all(|(_, c)| *c == 2));
    assert_eq!(report.fairness.spread, 0);
    assert!(report.fairness.absolute_deviation.abs() < 1e-9);
}

#[test]
fn counts_differ_by_at_most_one() {
    // vendredi → dimanche : 4 slots, 3 workers
    let s = scheduler(d(2025, 10, 10), d(2025, 10, 12), &["night", "A"], &["ana", "bob", "cyd"]);
    assert_eq!(s.slots().len(), 4);
    let assignment = s.solve(SolveOptions::default()).unwrap();
    let report = s.validate(&assignment);
    assert!(report.is_valid());

    let n = s.slots().len();
    let k = s.workers().len();
    let bound = n.div_ceil(k) - n / k;
    assert!(report.fairness.spread <= bound);
    let total: usize = report.fairness.counts.iter().map(|(_, c)| c).sum();
    assert_eq!(total, 4);
    assert!((report.fairness.absolute_deviation - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn optimal_value_is_stable_across_runs() {
    let s = scheduler(d(2025, 10, 10), d(2025, 10, 12), &["night", "A"], &["ana", "bob", "cyd"]);
    let first = s.validate(&s.solve(SolveOptions::default()).unwrap()).fairness;
    let second = s.validate(&s.solve(SolveOptions::default()).unwrap()).fairness;
    assert!((first.absolute_deviation - second.absolute_deviation).abs() < 1e-9);
    assert_eq!(first.spread, second.spread);
}

#[test]
fn generous_time_limit_still_solves() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 7), &["A", "B"], &["ana", "bob"]);
    let assignment = s
        .solve(SolveOptions::with_time_limit(Duration::from_secs(60)))
        .unwrap();
    assert_total(&s, &assignment);
}

fn roster(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("w{i:02}")).collect()
}

fn assert_fair_and_valid(s: &Scheduler, assignment: &Assignment) {
    assert_total(s, assignment);
    let report = s.validate(assignment);
    assert!(report.violations.is_empty(), "{:?}", report.violations);
    assert!(report.is_valid());
    let n = s.slots().len();
    let k = s.workers().len();
    assert!(
        report.fairness.spread <= n.div_ceil(k) - n / k,
        "counts {:?}",
        report.fairness.counts
    );
}

#[test]
fn full_week_with_weekday_nights_and_weekend() {
    // lundi 6 → dimanche 12 : 5 × 4 slots + 2 gardes de 24h
    let plan = PlanConfig::new(
        d(2025, 10, 6),
        d(2025, 10, 12),
        ["night", "A", "B", "C"],
        roster(8),
    );
    let s = Scheduler::new(&plan).unwrap();
    assert_eq!(s.slots().len(), 22);

    let assignment = s.solve(SolveOptions::default()).unwrap();
    assert_fair_and_valid(&s, &assignment);

    // sept nuits dans une fenêtre de huit jours : sept workers distincts
    let nights: BTreeSet<_> = s
        .slots()
        .iter()
        .filter(|slot| slot.is_night())
        .filter_map(|slot| assignment.worker_for(slot.id))
        .collect();
    assert_eq!(nights.len(), 7);
}

#[test]
fn two_weeks_under_generous_time_limit() {
    let plan = PlanConfig::new(
        d(2025, 10, 6),
        d(2025, 10, 19),
        ["night", "A", "B", "C", "D"],
        roster(12),
    );
    let s = Scheduler::new(&plan).unwrap();
    assert_eq!(s.slots().len(), 54);

    let assignment = s
        .solve(SolveOptions::with_time_limit(Duration::from_secs(120)))
        .unwrap();
    assert_fair_and_valid(&s, &assignment);
}

#[test]
fn time_limit_reports_timeout_not_infeasible() {
    // un mois, dix machines et la nuit : 250 slots × 14 workers
    let machines = ["night", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
    let plan = PlanConfig::new(d(2023, 6, 1), d(2023, 6, 30), machines, roster(14));
    let s = Scheduler::new(&plan).unwrap();
    assert_eq!(s.slots().len(), 250);

    let limit = Duration::from_millis(1);
    let started = std::time::Instant::now();
    match s.solve(SolveOptions::with_time_limit(limit)) {
        Err(SchedError::Timeout(got)) => assert_eq!(got, limit),
        other => panic!("expected timeout, got {other:?}"),
    }
    // le solveur s'arrête de lui-même, sans résolution qui continue en fond
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[test]
fn solve_schedule_packages_inputs() {
    let s = scheduler(d(2025, 10, 6), d(2025, 10, 7), &["A", "B"], &["ana", "bob"]);
    let schedule = s.solve_schedule(SolveOptions::default()).unwrap();
    assert_eq!(schedule.machines, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(schedule.slots.len(), 4);
    assert_eq!(schedule.workers.len(), 2);
    assert_eq!(schedule.assignment.len(), 4);
}

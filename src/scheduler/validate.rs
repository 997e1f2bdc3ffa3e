use super::util;
use super::{CoverageIssue, FairnessReport, ValidationReport, Violation};
use crate::model::{Assignment, Slot, SlotId, WorkerId};
use std::collections::HashSet;

/// Revérifie une assignation contre la relation d'exclusion des slots.
///
/// Ne réutilise rien du solveur : une paire est en faute dès que l'un des deux
/// slots liste l'autre, quel que soit le sens dans lequel elle a été stockée.
pub fn validate_assignment(
    slots: &[Slot],
    workers: &[WorkerId],
    assignment: &Assignment,
) -> ValidationReport {
    let coverage = check_coverage(slots, workers, assignment);
    let mut violations = Vec::new();

    for worker in workers {
        let mut held: Vec<SlotId> = assignment.slots_of(worker).collect();
        held.sort();
        held.dedup();

        for (idx, &a) in held.iter().enumerate() {
            for &b in held.iter().skip(idx + 1) {
                let a_excludes_b = util::find_slot(slots, a).is_some_and(|s| s.conflicts_with(b));
                let b_excludes_a = util::find_slot(slots, b).is_some_and(|s| s.conflicts_with(a));
                if a_excludes_b || b_excludes_a {
                    violations.push(Violation {
                        worker: worker.clone(),
                        slot: a,
                        conflicting: b,
                    });
                }
            }
        }
    }

    ValidationReport {
        violations,
        coverage,
        fairness: fairness(workers, assignment),
    }
}

fn check_coverage(
    slots: &[Slot],
    workers: &[WorkerId],
    assignment: &Assignment,
) -> Vec<CoverageIssue> {
    let mut out = Vec::new();
    let mut seen = vec![0usize; slots.len()];
    let roster: HashSet<&WorkerId> = workers.iter().collect();
    let mut unknown_workers: Vec<&WorkerId> = Vec::new();

    for placement in assignment.placements() {
        match util::find_slot(slots, placement.slot) {
            Some(slot) => seen[slot.id.index()] += 1,
            None => out.push(CoverageIssue::UnknownSlot(placement.slot)),
        }
        if !roster.contains(&placement.worker) && !unknown_workers.contains(&&placement.worker) {
            unknown_workers.push(&placement.worker);
        }
    }

    for (slot, count) in slots.iter().zip(&seen) {
        match count {
            0 => out.push(CoverageIssue::Unassigned(slot.id)),
            1 => {}
            _ => out.push(CoverageIssue::Duplicate(slot.id)),
        }
    }
    out.extend(
        unknown_workers
            .into_iter()
            .map(|w| CoverageIssue::UnknownWorker(w.clone())),
    );
    out
}

/// Compteurs par worker et dispersion (écart absolu, variance, amplitude).
pub fn fairness(workers: &[WorkerId], assignment: &Assignment) -> FairnessReport {
    let counts: Vec<(WorkerId, usize)> = workers
        .iter()
        .map(|w| (w.clone(), assignment.count_for(w)))
        .collect();

    if counts.is_empty() {
        return FairnessReport {
            counts,
            mean: 0.0,
            absolute_deviation: 0.0,
            variance: 0.0,
            spread: 0,
        };
    }

    let n = counts.len() as f64;
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    let mean = total as f64 / n;
    let absolute_deviation = counts.iter().map(|(_, c)| (*c as f64 - mean).abs()).sum();
    let variance = counts
        .iter()
        .map(|(_, c)| (*c as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let min = counts.iter().map(|(_, c)| *c).min().unwrap_or(0);

    FairnessReport {
        counts,
        mean,
        absolute_deviation,
        variance,
        spread: max - min,
    }
}

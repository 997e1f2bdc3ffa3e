mod exclusion;
mod solver;
mod types;
mod util;
mod validate;

pub use exclusion::{compute_conflicts, fill_conflicts, COOLDOWN_DAYS};
pub use types::{
    CoverageIssue, FairnessReport, SchedError, SolveOptions, ValidationReport, Violation,
};
pub use validate::{fairness, validate_assignment};

use crate::calendar::build_calendar;
use crate::config::PlanConfig;
use crate::model::{Assignment, Schedule, Slot, SlotId, WorkerId};
use tracing::{error, info};

/// Scheduler : calendrier, exclusions et roster d'un roulement.
///
/// Construit une fois, puis résolu autant de fois que nécessaire ; aucun état
/// n'est partagé entre deux résolutions.
#[derive(Debug, Clone)]
pub struct Scheduler {
    machines: Vec<String>,
    slots: Vec<Slot>,
    workers: Vec<WorkerId>,
}

impl Scheduler {
    /// Valide la configuration, génère le calendrier et calcule les exclusions.
    pub fn new(config: &PlanConfig) -> Result<Self, SchedError> {
        config.validate()?;
        let mut slots = build_calendar(
            config.start,
            config.end,
            &config.machines,
            &config.night_label,
        )?;
        fill_conflicts(&mut slots);
        info!(
            slots = slots.len(),
            workers = config.workers.len(),
            "scheduler ready"
        );
        Ok(Self {
            machines: config.machines.clone(),
            slots,
            workers: config.worker_ids(),
        })
    }

    /// Reprend des slots déjà générés ; les exclusions sont recalculées.
    pub fn from_parts(
        machines: Vec<String>,
        mut slots: Vec<Slot>,
        workers: Vec<WorkerId>,
    ) -> Result<Self, SchedError> {
        if workers.is_empty() {
            return Err(SchedError::Config("worker roster cannot be empty".into()));
        }
        if let Some(slot) = slots.iter().enumerate().find(|(i, s)| s.id != SlotId(*i)) {
            return Err(SchedError::Config(format!(
                "slot {} out of sequence at position {}",
                slot.1.id, slot.0
            )));
        }
        fill_conflicts(&mut slots);
        Ok(Self {
            machines,
            slots,
            workers,
        })
    }

    pub fn machines(&self) -> &[String] {
        &self.machines
    }
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
    pub fn workers(&self) -> &[WorkerId] {
        &self.workers
    }

    /// Résout puis revalide ; une assignation invalide n'est jamais retournée.
    pub fn solve(&self, opts: SolveOptions) -> Result<Assignment, SchedError> {
        let assignment = solver::solve(&self.slots, &self.workers, opts)?;
        let report = self.validate(&assignment);
        if !report.is_valid() {
            error!(
                violations = report.violations.len(),
                coverage = report.coverage.len(),
                "solver returned an invalid assignment"
            );
            return Err(SchedError::ValidationFailure {
                violations: report.violations,
                coverage: report.coverage,
            });
        }
        info!(
            spread = report.fairness.spread,
            absolute_deviation = report.fairness.absolute_deviation,
            "assignment validated"
        );
        Ok(assignment)
    }

    pub fn validate(&self, assignment: &Assignment) -> ValidationReport {
        validate_assignment(&self.slots, &self.workers, assignment)
    }

    /// Résout et empaquette le résultat pour la persistance ou l'export.
    pub fn solve_schedule(&self, opts: SolveOptions) -> Result<Schedule, SchedError> {
        let assignment = self.solve(opts)?;
        Ok(self.to_schedule(assignment))
    }

    pub fn to_schedule(&self, assignment: Assignment) -> Schedule {
        Schedule {
            machines: self.machines.clone(),
            workers: self.workers.clone(),
            slots: self.slots.clone(),
            assignment,
        }
    }
}

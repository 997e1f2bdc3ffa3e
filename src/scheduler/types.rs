use crate::model::{SlotId, WorkerId};
use std::time::Duration;
use thiserror::Error;

/// Options de résolution
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// Budget optionnel ; au-delà, `SchedError::Timeout`.
    pub time_limit: Option<Duration>,
}

impl SolveOptions {
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            time_limit: Some(limit),
        }
    }
}

/// Un worker tient deux slots qui s'excluent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub worker: WorkerId,
    pub slot: SlotId,
    pub conflicting: SlotId,
}

/// Défaut de totalité ou d'unicité d'une assignation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageIssue {
    Unassigned(SlotId),
    Duplicate(SlotId),
    UnknownSlot(SlotId),
    UnknownWorker(WorkerId),
}

/// Répartition du nombre de slots par worker.
#[derive(Debug, Clone, PartialEq)]
pub struct FairnessReport {
    /// Un compteur par worker du roster, dans l'ordre du roster (zéros inclus).
    pub counts: Vec<(WorkerId, usize)>,
    pub mean: f64,
    /// Somme des |count(w) - mean| : l'objectif minimisé par le solveur.
    pub absolute_deviation: f64,
    /// Variance de population.
    pub variance: f64,
    /// max(count) - min(count).
    pub spread: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub coverage: Vec<CoverageIssue>,
    pub fairness: FairnessReport,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty() && self.coverage.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("infeasible: no assignment satisfies the exclusion constraints")]
    Infeasible,
    #[error("solver timed out after {0:?}")]
    Timeout(Duration),
    #[error(
        "assignment failed validation: {} conflict(s), {} coverage issue(s)",
        .violations.len(),
        .coverage.len()
    )]
    ValidationFailure {
        violations: Vec<Violation>,
        coverage: Vec<CoverageIssue>,
    },
    #[error("solver failure: {0}")]
    Solver(String),
}

#![forbid(unsafe_code)]
//! Roulement — génération de plannings de postes équitables.
//!
//! - Calendrier : un slot par machine et par jour, une garde de 24h le week-end.
//! - Exclusions : gardes de nuit, délai de reprise d'une machine, un slot par jour.
//! - Assignation par programme linéaire en nombres entiers (écarts absolus).
//! - Revalidation indépendante du résultat ; persistance et exports en dehors du cœur.

pub mod calendar;
pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod scheduler;
#[cfg(feature = "serde")]
pub mod storage;
pub mod table;

pub use calendar::{build_calendar, is_weekend, DEFAULT_NIGHT_LABEL};
pub use config::PlanConfig;
pub use model::{Assignment, Placement, Schedule, Slot, SlotId, SlotKind, WorkerId};
pub use scheduler::{
    compute_conflicts, fill_conflicts, validate_assignment, CoverageIssue, FairnessReport,
    SchedError, Scheduler, SolveOptions, ValidationReport, Violation,
};
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage, StoredSchedule, SCHEDULE_FORMAT};
pub use table::{ScheduleTable, TableRow};

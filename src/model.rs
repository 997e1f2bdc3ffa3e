use chrono::{Datelike, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifiant fort pour Worker (le nom tel qu'il figure au roster)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiant d'un slot : sa position dans le calendrier généré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotId(pub usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nature d'un slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SlotKind {
    /// Poste de jour sur une machine.
    Day,
    /// Garde de nuit en semaine.
    Night,
    /// Garde de 24h, seul slot d'un jour de week-end.
    Weekend,
}

/// Unité de travail assignable : une machine un jour donné.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Slot {
    pub id: SlotId,
    pub machine: String,
    pub date: NaiveDate,
    /// Position de `machine` dans l'ordre canonique (affichage uniquement).
    pub machine_index: usize,
    pub kind: SlotKind,
    /// Slots qui ne peuvent pas revenir au même worker (relation symétrique).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeSet::is_empty")
    )]
    pub conflicts: BTreeSet<SlotId>,
}

impl Slot {
    pub fn new(
        id: SlotId,
        machine: &str,
        date: NaiveDate,
        machine_index: usize,
        kind: SlotKind,
    ) -> Self {
        Self {
            id,
            machine: machine.to_owned(),
            date,
            machine_index,
            kind,
            conflicts: BTreeSet::new(),
        }
    }

    pub fn is_night(&self) -> bool {
        matches!(self.kind, SlotKind::Night | SlotKind::Weekend)
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn conflicts_with(&self, other: SlotId) -> bool {
        self.conflicts.contains(&other)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SlotKind::Weekend => {
                write!(f, "{}: 24h {} {}", self.machine, self.date, self.weekday())
            }
            _ => write!(f, "{}: {} {}", self.machine, self.date, self.weekday()),
        }
    }
}

/// Couple (slot, worker) d'une assignation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    pub slot: SlotId,
    pub worker: WorkerId,
}

/// Assignation produite par le solveur : un placement par slot, trié par slot.
///
/// Immuable une fois retournée ; la totalité et l'unicité sont revérifiées par
/// le validateur, indépendamment de la construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    placements: Vec<Placement>,
}

impl Assignment {
    pub fn from_placements(mut placements: Vec<Placement>) -> Self {
        placements.sort_by_key(|p| p.slot);
        Self { placements }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Worker du slot (premier placement trouvé s'il y a des doublons).
    pub fn worker_for(&self, slot: SlotId) -> Option<&WorkerId> {
        let pos = self.placements.partition_point(|p| p.slot < slot);
        self.placements
            .get(pos)
            .filter(|p| p.slot == slot)
            .map(|p| &p.worker)
    }

    pub fn slots_of<'a>(&'a self, worker: &'a WorkerId) -> impl Iterator<Item = SlotId> + 'a {
        self.placements
            .iter()
            .filter(move |p| &p.worker == worker)
            .map(|p| p.slot)
    }

    pub fn count_for(&self, worker: &WorkerId) -> usize {
        self.slots_of(worker).count()
    }
}

/// Un roulement résolu, prêt à être persisté ou exporté.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    pub machines: Vec<String>,
    pub workers: Vec<WorkerId>,
    pub slots: Vec<Slot>,
    pub assignment: Assignment,
}

use crate::model::{Schedule, WorkerId};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Une ligne du tableau : une date, une cellule par machine, les repos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub date: NaiveDate,
    /// Indexé comme `ScheduleTable::machines`.
    pub cells: Vec<Option<WorkerId>>,
    /// Workers du roster sans aucun slot ce jour-là, triés.
    pub resting: Vec<WorkerId>,
}

impl TableRow {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Vue (date, machine) → worker d'un roulement résolu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTable {
    pub machines: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl ScheduleTable {
    pub fn build(schedule: &Schedule) -> Self {
        let width = schedule.machines.len();
        let mut rows: BTreeMap<NaiveDate, (Vec<Option<WorkerId>>, BTreeSet<&WorkerId>)> =
            BTreeMap::new();

        for slot in &schedule.slots {
            let (cells, busy) = rows
                .entry(slot.date)
                .or_insert_with(|| (vec![None; width], BTreeSet::new()));
            if let Some(worker) = schedule.assignment.worker_for(slot.id) {
                if let Some(cell) = cells.get_mut(slot.machine_index) {
                    *cell = Some(worker.clone());
                }
                busy.insert(worker);
            }
        }

        let rows = rows
            .into_iter()
            .map(|(date, (cells, busy))| {
                let mut resting: Vec<WorkerId> = schedule
                    .workers
                    .iter()
                    .filter(|w| !busy.contains(w))
                    .cloned()
                    .collect();
                resting.sort();
                TableRow {
                    date,
                    cells,
                    resting,
                }
            })
            .collect();

        Self {
            machines: schedule.machines.clone(),
            rows,
        }
    }

    /// Recopie le worker de la colonne `source` dans la colonne `target` :
    /// une machine couverte par le titulaire d'un autre slot (la nuit en
    /// général). `target` est ajoutée en fin de tableau si elle n'existe pas ;
    /// une cellule `target` déjà remplie est conservée. Les repos ne changent
    /// pas, le worker recopié étant déjà occupé ce jour-là.
    pub fn with_links<'a, I>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (source, target) in links {
            let Some(from) = self.machines.iter().position(|m| m == source) else {
                warn!(source, target, "linked machine source not in table");
                continue;
            };
            let to = match self.machines.iter().position(|m| m == target) {
                Some(col) => col,
                None => {
                    self.machines.push(target.to_owned());
                    for row in &mut self.rows {
                        row.cells.push(None);
                    }
                    self.machines.len() - 1
                }
            };
            if from == to {
                continue;
            }
            for row in &mut self.rows {
                if row.cells[to].is_none() {
                    row.cells[to] = row.cells[from].clone();
                }
            }
        }
        self
    }

    pub fn row(&self, date: NaiveDate) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.date == date)
    }

    pub fn cell(&self, date: NaiveDate, machine: &str) -> Option<&WorkerId> {
        let col = self.machines.iter().position(|m| m == machine)?;
        self.row(date)?.cells.get(col)?.as_ref()
    }

    pub fn resting_on(&self, date: NaiveDate) -> &[WorkerId] {
        self.row(date).map(|r| r.resting.as_slice()).unwrap_or(&[])
    }
}

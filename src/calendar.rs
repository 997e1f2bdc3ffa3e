//! Génération du calendrier de slots pour une période.
//!
//! Un slot par machine et par jour ouvré ; un seul slot « nuit » de 24h les
//! jours de week-end.

use crate::model::{Slot, SlotId, SlotKind};
use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

pub const DEFAULT_NIGHT_LABEL: &str = "night";

/// Samedi et dimanche.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Construit la séquence ordonnée des slots entre `start` et `end` inclus.
///
/// Les slots sont numérotés dans l'ordre d'émission : par date, puis dans
/// l'ordre de `machines`. Le libellé de nuit n'est exigé que si la période
/// contient un jour de week-end.
pub fn build_calendar(
    start: NaiveDate,
    end: NaiveDate,
    machines: &[String],
    night_label: &str,
) -> Result<Vec<Slot>, SchedError> {
    if start > end {
        return Err(SchedError::Config(format!(
            "start date {start} is after end date {end}"
        )));
    }
    if machines.is_empty() {
        return Err(SchedError::Config("machine list cannot be empty".into()));
    }
    let night_index = machines.iter().position(|m| m == night_label);

    let mut slots = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        if is_weekend(date) {
            let Some(idx) = night_index else {
                return Err(SchedError::Config(format!(
                    "night shift label {night_label:?} missing from machine list ({date} is a weekend day)"
                )));
            };
            let id = SlotId(slots.len());
            slots.push(Slot::new(id, night_label, date, idx, SlotKind::Weekend));
            continue;
        }
        for (idx, machine) in machines.iter().enumerate() {
            let kind = if Some(idx) == night_index {
                SlotKind::Night
            } else {
                SlotKind::Day
            };
            let id = SlotId(slots.len());
            slots.push(Slot::new(id, machine, date, idx, kind));
        }
    }

    debug!(%start, %end, machines = machines.len(), slots = slots.len(), "calendar built");
    Ok(slots)
}

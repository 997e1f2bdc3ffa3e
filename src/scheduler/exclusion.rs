use super::util;
use crate::model::{Slot, SlotId};
use chrono::Weekday;
use std::collections::BTreeSet;
use tracing::debug;

/// Fenêtre (en jours, strictement après le slot) pendant laquelle un worker
/// ne reprend pas la même machine.
pub const COOLDOWN_DAYS: i64 = 8;

/// Jours (relatifs à la nuit) dont tous les slots sont exclus par une garde.
fn night_offsets(weekday: Weekday) -> &'static [i64] {
    match weekday {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => &[1],
        Weekday::Fri => &[3],
        Weekday::Sat => &[-1, 2],
        Weekday::Sun => &[-3, 1],
    }
}

/// Calcule, pour chaque slot, l'ensemble des slots en conflit.
///
/// Union de trois familles de règles :
/// - garde de nuit : exclut les jours adjacents selon le jour de la semaine ;
/// - même machine dans les `COOLDOWN_DAYS` jours suivants ;
/// - même date.
///
/// Le résultat est la clôture symétrique : si `a` exclut `b`, `b` exclut `a`.
/// Fonction pure, indexée par `SlotId` ; les `conflicts` déjà présents sur
/// les slots sont ignorés.
pub fn compute_conflicts(slots: &[Slot]) -> Vec<BTreeSet<SlotId>> {
    let by_date = util::slots_by_date(slots);
    let mut out: Vec<BTreeSet<SlotId>> = vec![BTreeSet::new(); slots.len()];

    let mut link = |a: SlotId, b: SlotId| {
        if a != b {
            out[a.index()].insert(b);
            out[b.index()].insert(a);
        }
    };

    for slot in slots {
        if slot.is_night() {
            for offset in night_offsets(slot.weekday()) {
                let Some(day) = util::shift_date(slot.date, *offset) else {
                    continue;
                };
                for other in by_date.get(&day).into_iter().flatten() {
                    link(slot.id, *other);
                }
            }
        }

        for offset in 1..=COOLDOWN_DAYS {
            let Some(day) = util::shift_date(slot.date, offset) else {
                continue;
            };
            for other in by_date.get(&day).into_iter().flatten() {
                if slots[other.index()].machine == slot.machine {
                    link(slot.id, *other);
                }
            }
        }

        for other in by_date.get(&slot.date).into_iter().flatten() {
            link(slot.id, *other);
        }
    }

    debug!(
        slots = slots.len(),
        edges = out.iter().map(BTreeSet::len).sum::<usize>() / 2,
        "exclusions computed"
    );
    out
}

/// Remplit (en remplaçant) le champ `conflicts` de chaque slot.
pub fn fill_conflicts(slots: &mut [Slot]) {
    let conflicts = compute_conflicts(slots);
    for (slot, set) in slots.iter_mut().zip(conflicts) {
        slot.conflicts = set;
    }
}

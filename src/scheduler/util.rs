use crate::model::{Slot, SlotId};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Index des slots par date.
pub(super) fn slots_by_date(slots: &[Slot]) -> BTreeMap<NaiveDate, Vec<SlotId>> {
    let mut out: BTreeMap<NaiveDate, Vec<SlotId>> = BTreeMap::new();
    for slot in slots {
        out.entry(slot.date).or_default().push(slot.id);
    }
    out
}

pub(super) fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

pub(super) fn find_slot(slots: &[Slot], id: SlotId) -> Option<&Slot> {
    slots.get(id.index()).filter(|s| s.id == id)
}

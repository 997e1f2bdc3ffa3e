use crate::model::{Schedule, WorkerId};
use crate::table::ScheduleTable;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import du roster depuis CSV: header `name`
pub fn import_workers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<WorkerId>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid worker row (empty)");
        }
        out.push(WorkerId::new(name));
    }
    Ok(out)
}

/// Export JSON du roulement (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV à plat: header `date,weekday,machine,worker`, trié par date puis machine
pub fn export_assignment_csv<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "weekday", "machine", "worker"])?;
    let mut slots: Vec<_> = schedule.slots.iter().collect();
    slots.sort_by_key(|s| (s.date, s.machine_index));
    for s in slots {
        let worker = schedule
            .assignment
            .worker_for(s.id)
            .map(WorkerId::as_str)
            .unwrap_or("");
        let date = s.date.to_string();
        let weekday = s.weekday().to_string();
        w.write_record([date.as_str(), weekday.as_str(), s.machine.as_str(), worker])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du tableau: header `date,weekday,<machines...>,rest`
pub fn export_table_csv<P: AsRef<Path>>(path: P, table: &ScheduleTable) -> anyhow::Result<()> {
    let path = path.as_ref();
    let csv = table_to_csv_string(table)?;
    fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Rend le tableau en CSV dans une chaîne.
pub fn table_to_csv_string(table: &ScheduleTable) -> anyhow::Result<String> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    w.write_record(table_header(table))?;
    for record in table_records(table) {
        w.write_record(&record)?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv buffer: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn table_header(table: &ScheduleTable) -> Vec<&str> {
    let mut header = vec!["date", "weekday"];
    header.extend(table.machines.iter().map(String::as_str));
    header.push("rest");
    header
}

fn table_records(table: &ScheduleTable) -> impl Iterator<Item = Vec<String>> + '_ {
    table.rows.iter().map(|row| {
        let mut record = vec![row.date.to_string(), row.weekday().to_string()];
        record.extend(
            row.cells
                .iter()
                .map(|c| c.as_ref().map(|w| w.as_str().to_owned()).unwrap_or_default()),
        );
        let rest: Vec<&str> = row.resting.iter().map(WorkerId::as_str).collect();
        record.push(rest.join(", "));
        record
    })
}

use crate::calendar::{is_weekend, DEFAULT_NIGHT_LABEL};
use crate::model::WorkerId;
use crate::scheduler::SchedError;
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Paramètres d'un roulement : période, machines, roster.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Ordre canonique des machines, libellé de nuit compris.
    pub machines: Vec<String>,
    pub workers: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_night_label"))]
    pub night_label: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub time_limit_secs: Option<u64>,
}

#[cfg(feature = "serde")]
fn default_night_label() -> String {
    DEFAULT_NIGHT_LABEL.to_owned()
}

impl PlanConfig {
    pub fn new<M, W>(start: NaiveDate, end: NaiveDate, machines: M, workers: W) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            start,
            end,
            machines: machines.into_iter().map(Into::into).collect(),
            workers: workers.into_iter().map(Into::into).collect(),
            night_label: DEFAULT_NIGHT_LABEL.to_owned(),
            time_limit_secs: None,
        }
    }

    pub fn with_night_label<S: Into<String>>(mut self, label: S) -> Self {
        self.night_label = label.into();
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers.iter().map(|w| WorkerId::new(w.trim())).collect()
    }

    /// Vérifie la configuration avant toute résolution.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.start > self.end {
            return Err(SchedError::Config(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        if self.machines.is_empty() {
            return Err(SchedError::Config("machine list cannot be empty".into()));
        }
        if self.workers.is_empty() {
            return Err(SchedError::Config("worker roster cannot be empty".into()));
        }
        ensure_unique("machine", &self.machines)?;
        ensure_unique("worker", &self.workers)?;

        let has_weekend = self
            .start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .any(is_weekend);
        if has_weekend && !self.machines.iter().any(|m| m == &self.night_label) {
            return Err(SchedError::Config(format!(
                "night shift label {:?} missing from machine list",
                self.night_label
            )));
        }
        Ok(())
    }
}

fn ensure_unique(what: &str, names: &[String]) -> Result<(), SchedError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(SchedError::Config(format!("{what} name cannot be blank")));
        }
        if !seen.insert(name.trim()) {
            return Err(SchedError::Config(format!("duplicate {what} name: {name}")));
        }
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod file {
    use super::PlanConfig;
    use anyhow::{Context, Result};
    use std::fs;
    use std::path::Path;

    impl PlanConfig {
        pub fn from_json_str(s: &str) -> Result<Self> {
            let config: PlanConfig = serde_json::from_str(s).context("parsing plan")?;
            config.validate()?;
            Ok(config)
        }

        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading plan {}", path.display()))?;
            Self::from_json_str(&data).with_context(|| format!("loading plan {}", path.display()))
        }

        pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
            self.validate()?;
            let path = path.as_ref();
            let json = serde_json::to_string_pretty(self)?;
            fs::write(path, json).with_context(|| format!("writing plan {}", path.display()))
        }
    }
}

//! Persistance du roulement résolu.
//!
//! Le fichier est une enveloppe versionnée `{format, saved_at, schedule}` : un
//! format inconnu est refusé au chargement au lieu d'être lu de travers.
use crate::model::Schedule;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Version courante de l'enveloppe écrite par [`JsonStorage`].
pub const SCHEDULE_FORMAT: u32 = 1;

pub trait Storage {
    /// Charge un roulement résolu depuis un support.
    fn load(&self) -> anyhow::Result<Schedule>;
    /// Remplace le roulement stocké ; un lecteur concurrent voit l'ancien ou le nouveau.
    fn save(&self, schedule: &Schedule) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    format: u32,
    saved_at: DateTime<Utc>,
    schedule: &'a Schedule,
}

/// Contenu d'un fichier de roulement, horodatage compris.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredSchedule {
    pub format: u32,
    pub saved_at: DateTime<Utc>,
    pub schedule: Schedule,
}

/// Roulement stocké dans un fichier JSON unique.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            bail!("{} is a directory, expected a schedule file", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Lit l'enveloppe complète et vérifie sa version.
    pub fn read(&self) -> anyhow::Result<StoredSchedule> {
        let file = File::open(&self.path)
            .with_context(|| format!("no schedule at {} (run `solve` first)", self.path.display()))?;
        let stored: StoredSchedule = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("{} is not a schedule file", self.path.display()))?;
        if stored.format != SCHEDULE_FORMAT {
            bail!(
                "{}: unsupported schedule format {} (expected {})",
                self.path.display(),
                stored.format,
                SCHEDULE_FORMAT
            );
        }
        Ok(stored)
    }

    // le fichier temporaire doit être sur le même système de fichiers
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Schedule> {
        self.read().map(|stored| stored.schedule)
    }

    fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        let envelope = Envelope {
            format: SCHEDULE_FORMAT,
            saved_at: Utc::now(),
            schedule,
        };
        let mut staged = NamedTempFile::new_in(self.staging_dir())
            .with_context(|| format!("staging {}", self.path.display()))?;
        {
            let mut out = BufWriter::new(staged.as_file_mut());
            serde_json::to_writer_pretty(&mut out, &envelope)?;
            out.flush()?;
        }
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!(path = %self.path.display(), slots = schedule.slots.len(), "schedule saved");
        Ok(())
    }
}

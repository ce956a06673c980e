//! JSON-lines audit file

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::Entity;

use super::entry::AuditEntry;

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append entries, one JSON object per line
    pub fn append(&self, entries: &[AuditEntry]) -> UpkeepResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);
        for entry in entries {
            serde_json::to_writer(&mut out, entry)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Every entry, oldest first
    pub fn entries(&self) -> UpkeepResult<Vec<AuditEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::Deserializer::from_reader(BufReader::new(file))
            .into_iter::<AuditEntry>()
            .collect::<Result<_, _>>()
            .map_err(|e| {
                UpkeepError::Storage(format!("{} is damaged: {}", self.path.display(), e))
            })
    }

    /// The newest `limit` entries, optionally for one kind of record, oldest first
    pub fn tail(&self, limit: usize, entity: Option<Entity>) -> UpkeepResult<Vec<AuditEntry>> {
        let mut entries = self.entries()?;
        if let Some(entity) = entity {
            entries.retain(|e| e.entity == entity);
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

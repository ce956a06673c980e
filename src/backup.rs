//! Pre-import snapshots
//!
//! Before an import touches the data, the four data files are copied into a
//! single JSON document under `backups/`. Old snapshots are pruned only after
//! an import commits, so a failed import never costs a snapshot.
//!
//! Pruning keeps the newest `daily_count` snapshots plus the earliest snapshot
//! of each of the newest `monthly_count` calendar months.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::paths::UpkeepPaths;
use crate::config::settings::BackupRetention;
use crate::error::{UpkeepError, UpkeepResult};

const PREFIX: &str = "pre-import-";
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.3f";

/// On-disk layout of a snapshot; each table is the raw data file, or `null`
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub users: Value,
    pub categories: Value,
    pub expenses: Value,
    pub payments: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub taken_at: DateTime<Utc>,
}

pub struct SnapshotStore<'a> {
    paths: &'a UpkeepPaths,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(paths: &'a UpkeepPaths) -> Self {
        Self { paths }
    }

    /// Copy the current data files into a new snapshot
    pub fn take(&self) -> UpkeepResult<PathBuf> {
        self.take_at(Utc::now())
    }

    fn take_at(&self, taken_at: DateTime<Utc>) -> UpkeepResult<PathBuf> {
        let dir = self.paths.backup_dir();
        fs::create_dir_all(&dir)?;

        let snapshot = Snapshot {
            taken_at,
            users: raw_table(&self.paths.users_file())?,
            categories: raw_table(&self.paths.categories_file())?,
            expenses: raw_table(&self.paths.expenses_file())?,
            payments: raw_table(&self.paths.payments_file())?,
        };

        let path = dir.join(file_name(taken_at));
        fs::write(&path, serde_json::to_vec_pretty(&snapshot)?)?;
        info!(path = %path.display(), "snapshot taken");
        Ok(path)
    }

    /// Snapshots on disk, oldest first; unrelated files are ignored
    pub fn list(&self) -> UpkeepResult<Vec<SnapshotFile>> {
        let dir = self.paths.backup_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(PREFIX))
                .and_then(|n| n.strip_suffix(".json"));
            if let Some(taken_at) = stamp.and_then(parse_stamp) {
                found.push(SnapshotFile { path, taken_at });
            }
        }
        found.sort_by_key(|s| s.taken_at);
        Ok(found)
    }

    /// Delete snapshots outside the retention policy, returning their paths
    pub fn prune(&self, retention: &BackupRetention) -> UpkeepResult<Vec<PathBuf>> {
        let snapshots = self.list()?;
        let keep = retained(&snapshots, retention);

        let mut removed = Vec::new();
        for (index, snapshot) in snapshots.into_iter().enumerate() {
            if keep.get(index).copied().unwrap_or(true) {
                continue;
            }
            fs::remove_file(&snapshot.path).map_err(|e| {
                UpkeepError::Io(format!("Failed to remove {}: {}", snapshot.path.display(), e))
            })?;
            debug!(path = %snapshot.path.display(), "snapshot pruned");
            removed.push(snapshot.path);
        }
        Ok(removed)
    }
}

/// Which of the (oldest-first) snapshots survive pruning
fn retained(snapshots: &[SnapshotFile], retention: &BackupRetention) -> Vec<bool> {
    let daily = retention.daily_count as usize;
    let mut keep: Vec<bool> = (0..snapshots.len())
        .map(|i| i + daily >= snapshots.len())
        .collect();

    // Earliest snapshot per month; iteration is oldest first
    let mut first_of_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for (index, snapshot) in snapshots.iter().enumerate() {
        let month = (snapshot.taken_at.year(), snapshot.taken_at.month());
        first_of_month.entry(month).or_insert(index);
    }
    for index in first_of_month
        .values()
        .rev()
        .take(retention.monthly_count as usize)
    {
        keep[*index] = true;
    }
    keep
}

fn file_name(taken_at: DateTime<Utc>) -> String {
    format!("{}{}.json", PREFIX, taken_at.format(STAMP_FORMAT))
}

fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn raw_table(path: &Path) -> UpkeepResult<Value> {
    if !path.exists() {
        return Ok(Value::Null);
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        UpkeepError::Storage(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

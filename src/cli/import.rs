//! Import command
//!
//! Imports never fail the process: the outcome is reported as a one-line
//! flash message followed by the dashboard, and an error leaves the data
//! exactly as it was.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::backup::SnapshotStore;
use crate::config::paths::UpkeepPaths;
use crate::config::settings::Settings;
use crate::error::{UpkeepError, UpkeepResult};
use crate::models::User;
use crate::services::{parse_document, ImportService, ImportSummary};
use crate::storage::Storage;

use super::dashboard::handle_dashboard_command;

/// Leveled one-shot message shown above the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flash::Success(msg) => write!(f, "Success: {}", msg),
            Flash::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Read, snapshot, then apply an import file
///
/// The snapshot is taken once the document parses; older snapshots are
/// pruned only after the import commits.
pub fn run_import(
    storage: &Storage,
    paths: &UpkeepPaths,
    settings: &Settings,
    user: &User,
    file: &Path,
) -> UpkeepResult<ImportSummary> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| UpkeepError::Import(format!("Failed to read {}: {}", file.display(), e)))?;
    let document = parse_document(&content)?;

    let snapshots = SnapshotStore::new(paths);
    if settings.backup_before_import {
        let snapshot = snapshots.take()?;
        info!(snapshot = %snapshot.display(), "pre-import snapshot taken");
    }

    let summary = ImportService::new(storage, user.id).apply(&document)?;

    if settings.backup_before_import {
        let pruned = snapshots.prune(&settings.backup_retention)?;
        if !pruned.is_empty() {
            info!(count = pruned.len(), "old snapshots pruned");
        }
    }
    Ok(summary)
}

pub fn handle_import_command(
    storage: &Storage,
    paths: &UpkeepPaths,
    settings: &Settings,
    user: &User,
    file: &Path,
    today: NaiveDate,
) -> UpkeepResult<()> {
    let flash = match run_import(storage, paths, settings, user, file) {
        Ok(summary) => Flash::Success(summary.message(&user.username)),
        Err(e) => {
            warn!(file = %file.display(), error = %e, "import failed");
            Flash::Error(format!("Error importing data: {}", e))
        }
    };

    println!("{}\n", flash);
    handle_dashboard_command(storage, user, settings, today)
}

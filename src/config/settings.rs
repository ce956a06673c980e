//! User settings for Upkeep
//!
//! Manages preferences including the active user, dashboard windows and
//! pre-import snapshot retention.

use serde::{Deserialize, Serialize};

use super::paths::UpkeepPaths;
use crate::error::UpkeepError;

/// How many pre-import snapshots survive pruning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Newest snapshots kept regardless of date
    pub daily_count: u32,
    /// Months whose first snapshot is kept
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// User settings for Upkeep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Username used when no --user flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,

    /// Currency symbol used for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// How far ahead the dashboard looks for upcoming expenses
    #[serde(default = "default_window_days")]
    pub upcoming_window_days: i64,

    /// How far back the dashboard looks for recent payments
    #[serde(default = "default_window_days")]
    pub recent_window_days: i64,

    /// Maximum rows in the upcoming and recent dashboard lists
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: usize,

    /// Snapshot the data files before applying an import
    #[serde(default = "default_true")]
    pub backup_before_import: bool,

    /// Snapshot retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_window_days() -> i64 {
    30
}

fn default_dashboard_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            current_user: None,
            currency_symbol: default_currency(),
            upcoming_window_days: default_window_days(),
            recent_window_days: default_window_days(),
            dashboard_limit: default_dashboard_limit(),
            backup_before_import: default_true(),
            backup_retention: BackupRetention::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &UpkeepPaths) -> Result<Self, UpkeepError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| UpkeepError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                UpkeepError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &UpkeepPaths) -> Result<(), UpkeepError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| UpkeepError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| UpkeepError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

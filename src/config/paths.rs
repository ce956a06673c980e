//! Path management for Upkeep
//!
//! Provides XDG-compliant path resolution for configuration, data, and backups.
//!
//! ## Path Resolution Order
//!
//! 1. `UPKEEP_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/upkeep` or `~/.config/upkeep`
//! 3. Windows: `%APPDATA%\upkeep`

use std::path::PathBuf;

use crate::error::UpkeepError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "UPKEEP_DATA_DIR";

/// Manages all paths used by Upkeep
#[derive(Debug, Clone)]
pub struct UpkeepPaths {
    /// Base directory for all Upkeep data
    base_dir: PathBuf,
}

impl UpkeepPaths {
    /// Create a new UpkeepPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override nor a home/config directory
    /// can be determined.
    pub fn new() -> Result<Self, UpkeepError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create UpkeepPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/upkeep/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/upkeep/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (~/.config/upkeep/backups/)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn payments_file(&self) -> PathBuf {
        self.data_dir().join("payments.json")
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), UpkeepError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| UpkeepError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| UpkeepError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| UpkeepError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }

    /// Check if Upkeep has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, UpkeepError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                UpkeepError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("upkeep"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, UpkeepError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| UpkeepError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("upkeep"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.expenses_file(),
            temp_dir.path().join("data").join("expenses.json")
        );
        assert_eq!(
            paths.payments_file(),
            temp_dir.path().join("data").join("payments.json")
        );
    }
}

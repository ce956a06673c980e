//! Storage initialization
//!
//! Handles first-run setup: directories, settings and empty data files.

use tracing::info;

use crate::config::paths::UpkeepPaths;
use crate::config::settings::Settings;
use crate::error::UpkeepResult;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Safe to run on an existing data directory; nothing is overwritten.
pub fn initialize_storage(paths: &UpkeepPaths) -> UpkeepResult<Settings> {
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    let storage = Storage::open(paths.clone())?;
    storage.save_all()?;

    info!(base_dir = %paths.base_dir().display(), "storage initialized");
    Ok(settings)
}

//! JSON file helpers
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so a data file is always either the old or the new contents.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{UpkeepError, UpkeepResult};

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> UpkeepError {
    UpkeepError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// `data/expenses.json` -> `data/.expenses.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a JSON file; a file that does not exist reads as `T::default()`
pub fn read_json<T, P>(path: P) -> UpkeepResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("open", path, e)),
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace `path` with the pretty-printed JSON of `data`
pub fn write_json_atomic<T, P>(path: P, data: &T) -> UpkeepResult<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| storage_error("create", dir, e))?;
    }

    let temp = temp_path(path);
    let written = File::create(&temp)
        .map_err(|e| storage_error("create", &temp, e))
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, data)
                .map_err(|e| storage_error("serialize", path, e))?;
            out.flush().map_err(|e| storage_error("write", &temp, e))?;
            out.get_ref()
                .sync_all()
                .map_err(|e| storage_error("sync", &temp, e))
        })
        .and_then(|()| fs::rename(&temp, path).map_err(|e| storage_error("replace", path, e)));

    if written.is_err() {
        // Best effort; the original error is what matters
        let _ = fs::remove_file(&temp);
    }
    written
}

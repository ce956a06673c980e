//! Generic JSON-backed record table
//!
//! Every repository keeps its records in a `Table`: an in-memory map guarded
//! by a `RwLock`, persisted as a single JSON file with atomic writes. Ids are
//! allocated from a counter stored alongside the records so deleted ids are
//! never handed out again.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::UpkeepError;

use super::file_io::{read_json, write_json_atomic};

/// A record that can live in a `Table`
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Ord + From<u64> + Into<u64>;

    fn id(&self) -> Self::Id;
}

/// On-disk layout of a table file
#[derive(Debug, Serialize, Deserialize)]
struct TableFile<R> {
    #[serde(default)]
    next_id: u64,
    #[serde(default = "Vec::new")]
    records: Vec<R>,
}

impl<R> Default for TableFile<R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

struct TableState<R: Record> {
    next_id: u64,
    records: BTreeMap<R::Id, R>,
}

/// Point-in-time copy of a table, used to roll back failed transactions
pub struct TableSnapshot<R: Record> {
    next_id: u64,
    records: BTreeMap<R::Id, R>,
}

pub struct Table<R: Record> {
    path: PathBuf,
    state: RwLock<TableState<R>>,
}

impl<R: Record> Table<R> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(TableState {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TableState<R>>, UpkeepError> {
        self.state
            .read()
            .map_err(|e| UpkeepError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TableState<R>>, UpkeepError> {
        self.state
            .write()
            .map_err(|e| UpkeepError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing whatever is in memory
    pub fn load(&self) -> Result<(), UpkeepError> {
        let file: TableFile<R> = read_json(&self.path)?;
        let mut state = self.write()?;

        state.records = file.records.into_iter().map(|r| (r.id(), r)).collect();
        let after_max = state
            .records
            .keys()
            .next_back()
            .map(|id| Into::<u64>::into(*id) + 1)
            .unwrap_or(1);
        state.next_id = file.next_id.max(after_max).max(1);

        Ok(())
    }

    /// Persist records to disk
    pub fn save(&self) -> Result<(), UpkeepError> {
        let state = self.read()?;
        let file = TableFile {
            next_id: state.next_id,
            records: state.records.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file)
    }

    /// Reserve the next unused id
    pub fn allocate_id(&self) -> Result<R::Id, UpkeepError> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id += 1;
        Ok(R::Id::from(id))
    }

    pub fn get(&self, id: R::Id) -> Result<Option<R>, UpkeepError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    /// All records in id order
    pub fn all(&self) -> Result<Vec<R>, UpkeepError> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    /// Records matching a predicate, in id order
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<R>, UpkeepError>
    where
        F: Fn(&R) -> bool,
    {
        Ok(self
            .read()?
            .records
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    /// First record (lowest id) matching a predicate
    pub fn find<F>(&self, predicate: F) -> Result<Option<R>, UpkeepError>
    where
        F: Fn(&R) -> bool,
    {
        Ok(self
            .read()?
            .records
            .values()
            .find(|r| predicate(r))
            .cloned())
    }

    /// Insert or replace a record
    pub fn upsert(&self, record: R) -> Result<(), UpkeepError> {
        let mut state = self.write()?;
        let raw: u64 = record.id().into();
        if raw >= state.next_id {
            state.next_id = raw + 1;
        }
        state.records.insert(record.id(), record);
        Ok(())
    }

    pub fn remove(&self, id: R::Id) -> Result<Option<R>, UpkeepError> {
        Ok(self.write()?.records.remove(&id))
    }

    /// Remove every record matching a predicate, returning the removed records
    pub fn remove_where<F>(&self, predicate: F) -> Result<Vec<R>, UpkeepError>
    where
        F: Fn(&R) -> bool,
    {
        let mut state = self.write()?;
        let ids: Vec<R::Id> = state
            .records
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.id())
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| state.records.remove(&id))
            .collect())
    }

    /// Apply `update` to every record matching a predicate
    pub fn update_where<P, U>(&self, predicate: P, mut update: U) -> Result<usize, UpkeepError>
    where
        P: Fn(&R) -> bool,
        U: FnMut(&mut R),
    {
        let mut state = self.write()?;
        let mut count = 0;
        for record in state.records.values_mut().filter(|r| predicate(r)) {
            update(record);
            count += 1;
        }
        Ok(count)
    }

    pub fn count(&self) -> Result<usize, UpkeepError> {
        Ok(self.read()?.records.len())
    }

    pub fn snapshot(&self) -> Result<TableSnapshot<R>, UpkeepError> {
        let state = self.read()?;
        Ok(TableSnapshot {
            next_id: state.next_id,
            records: state.records.clone(),
        })
    }

    pub fn restore(&self, snapshot: TableSnapshot<R>) -> Result<(), UpkeepError> {
        let mut state = self.write()?;
        state.next_id = snapshot.next_id;
        state.records = snapshot.records;
        Ok(())
    }
}

//! Storage layer for Upkeep
//!
//! Each entity type lives in its own JSON file under `data/`, written
//! atomically. `Storage` ties the repositories together, owns the audit log,
//! and provides all-or-nothing transactions for multi-record operations such
//! as imports.

pub mod categories;
pub mod expenses;
pub mod file_io;
pub mod init;
pub mod payments;
pub mod table;
pub mod users;

pub use categories::CategoryRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use payments::PaymentRepository;
pub use users::UserRepository;

use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditLog, Change};
use crate::config::paths::UpkeepPaths;
use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Category, Entity, ExpensePayment, RecurringExpense, User};

use table::TableSnapshot;

/// Audit entries held back until the surrounding transaction commits
struct PendingAudit {
    batch_id: Uuid,
    entries: Vec<AuditEntry>,
}

struct StorageSnapshot {
    users: TableSnapshot<User>,
    categories: TableSnapshot<Category>,
    expenses: TableSnapshot<RecurringExpense>,
    payments: TableSnapshot<ExpensePayment>,
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: UpkeepPaths,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub expenses: ExpenseRepository,
    pub payments: PaymentRepository,
    audit: AuditLog,
    pending: Mutex<Option<PendingAudit>>,
}

impl Storage {
    /// Create a new Storage instance; nothing is loaded yet
    pub fn new(paths: UpkeepPaths) -> UpkeepResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            audit: AuditLog::new(paths.audit_log()),
            pending: Mutex::new(None),
            paths,
        })
    }

    /// Create a Storage instance and load everything from disk
    pub fn open(paths: UpkeepPaths) -> UpkeepResult<Self> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &UpkeepPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> UpkeepResult<()> {
        self.users.load()?;
        self.categories.load()?;
        self.expenses.load()?;
        self.payments.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> UpkeepResult<()> {
        self.users.save()?;
        self.categories.save()?;
        self.expenses.save()?;
        self.payments.save()?;
        Ok(())
    }

    /// Persist changes made by a single operation
    ///
    /// Inside a transaction this is a no-op; the transaction saves on commit.
    pub fn flush(&self) -> UpkeepResult<()> {
        if self.in_transaction()? {
            return Ok(());
        }
        self.save_all()
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    fn pending(&self) -> UpkeepResult<MutexGuard<'_, Option<PendingAudit>>> {
        self.pending
            .lock()
            .map_err(|e| UpkeepError::Storage(format!("Failed to acquire audit lock: {}", e)))
    }

    pub fn in_transaction(&self) -> UpkeepResult<bool> {
        Ok(self.pending()?.is_some())
    }

    fn snapshot(&self) -> UpkeepResult<StorageSnapshot> {
        Ok(StorageSnapshot {
            users: self.users.snapshot()?,
            categories: self.categories.snapshot()?,
            expenses: self.expenses.snapshot()?,
            payments: self.payments.snapshot()?,
        })
    }

    fn restore(&self, snapshot: StorageSnapshot) -> UpkeepResult<()> {
        self.users.restore(snapshot.users)?;
        self.categories.restore(snapshot.categories)?;
        self.expenses.restore(snapshot.expenses)?;
        self.payments.restore(snapshot.payments)?;
        Ok(())
    }

    /// Run `f` as a single unit of work
    ///
    /// On success every table is saved and the buffered audit entries are
    /// written with a shared batch id. On error the in-memory state is rolled
    /// back to where it was before `f` ran and nothing is audited. Nested
    /// calls join the outer transaction.
    pub fn transaction<T, F>(&self, f: F) -> UpkeepResult<T>
    where
        F: FnOnce(&Self) -> UpkeepResult<T>,
    {
        if self.in_transaction()? {
            return f(self);
        }

        let snapshot = self.snapshot()?;
        let batch_id = Uuid::new_v4();
        *self.pending()? = Some(PendingAudit {
            batch_id,
            entries: Vec::new(),
        });
        debug!(%batch_id, "transaction started");

        // (error, whether files may have been partially written)
        let outcome = match f(self) {
            Ok(value) => self.save_all().map(|_| value).map_err(|e| (e, true)),
            Err(e) => Err((e, false)),
        };
        let pending = self.pending()?.take();

        match outcome {
            Ok(value) => {
                let entries = pending.map(|p| p.entries).unwrap_or_default();
                debug!(%batch_id, entries = entries.len(), "transaction committed");
                self.audit.append(&entries)?;
                Ok(value)
            }
            Err((err, touched_disk)) => {
                self.restore(snapshot)?;
                if touched_disk {
                    if let Err(save_err) = self.save_all() {
                        warn!(%batch_id, error = %save_err, "failed to rewrite data after rollback");
                    }
                }
                warn!(%batch_id, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    fn record(
        &self,
        entity: Entity,
        id: impl Display,
        label: Option<String>,
        change: Change,
    ) -> UpkeepResult<()> {
        let entry = AuditEntry::new(entity, id, label, change);
        let mut pending = self.pending()?;
        match pending.as_mut() {
            Some(batch) => {
                batch.entries.push(entry.in_batch(batch.batch_id));
                Ok(())
            }
            None => {
                drop(pending);
                self.audit.append(&[entry])
            }
        }
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity: Entity,
        id: impl Display,
        label: Option<String>,
        record: &T,
    ) -> UpkeepResult<()> {
        self.record(entity, id, label, Change::created(record)?)
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity: Entity,
        id: impl Display,
        label: Option<String>,
        before: &T,
        after: &T,
    ) -> UpkeepResult<()> {
        self.record(entity, id, label, Change::updated(before, after)?)
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity: Entity,
        id: impl Display,
        label: Option<String>,
        record: &T,
    ) -> UpkeepResult<()> {
        self.record(entity, id, label, Change::deleted(record)?)
    }
}

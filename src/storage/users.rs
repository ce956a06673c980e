//! User repository
//!
//! Manages loading and saving users to users.json

use std::path::PathBuf;

use crate::error::UpkeepError;
use crate::models::{User, UserId};

use super::table::{Record, Table, TableSnapshot};

impl Record for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Repository for user persistence
pub struct UserRepository {
    table: Table<User>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            table: Table::new(path),
        }
    }

    pub fn load(&self) -> Result<(), UpkeepError> {
        self.table.load()
    }

    pub fn save(&self) -> Result<(), UpkeepError> {
        self.table.save()
    }

    pub fn next_id(&self) -> Result<UserId, UpkeepError> {
        self.table.allocate_id()
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>, UpkeepError> {
        self.table.get(id)
    }

    /// Get a user by username (case-insensitive)
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, UpkeepError> {
        let wanted = username.to_lowercase();
        self.table.find(|u| u.username.to_lowercase() == wanted)
    }

    pub fn get_all(&self) -> Result<Vec<User>, UpkeepError> {
        self.table.all()
    }

    pub fn upsert(&self, user: User) -> Result<(), UpkeepError> {
        self.table.upsert(user)
    }

    pub fn delete(&self, id: UserId) -> Result<Option<User>, UpkeepError> {
        self.table.remove(id)
    }

    pub fn count(&self) -> Result<usize, UpkeepError> {
        self.table.count()
    }

    pub fn snapshot(&self) -> Result<TableSnapshot<User>, UpkeepError> {
        self.table.snapshot()
    }

    pub fn restore(&self, snapshot: TableSnapshot<User>) -> Result<(), UpkeepError> {
        self.table.restore(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_username_lookup_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let repo = UserRepository::new(temp_dir.path().join("users.json"));

        let id = repo.next_id().unwrap();
        repo.upsert(User::new(id, "alice")).unwrap();

        assert_eq!(repo.get_by_username("ALICE").unwrap().unwrap().id, id);
        assert!(repo.get_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        let repo = UserRepository::new(path.clone());
        let id = repo.next_id().unwrap();
        repo.upsert(User::new(id, "alice")).unwrap();
        repo.save().unwrap();

        let reloaded = UserRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.get(id).unwrap().unwrap().username, "alice");
    }
}

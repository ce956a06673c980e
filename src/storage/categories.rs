//! Category repository
//!
//! Manages loading and saving the shared category list to categories.json

use std::path::PathBuf;

use crate::error::UpkeepError;
use crate::models::{Category, CategoryId};

use super::table::{Record, Table, TableSnapshot};

impl Record for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Repository for category persistence
pub struct CategoryRepository {
    table: Table<Category>,
}

impl CategoryRepository {
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

    pub fn next_id(&self) -> Result<CategoryId, UpkeepError> {
        self.table.allocate_id()
    }

    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, UpkeepError> {
        self.table.get(id)
    }

    /// All categories in id order
    pub fn get_all(&self) -> Result<Vec<Category>, UpkeepError> {
        self.table.all()
    }

    /// Get the first category whose name matches exactly (case-sensitive)
    pub fn get_by_exact_name(&self, name: &str) -> Result<Option<Category>, UpkeepError> {
        self.table.find(|c| c.name == name)
    }

    /// Get the first category whose name matches ignoring case
    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>, UpkeepError> {
        let wanted = name.to_lowercase();
        self.table.find(|c| c.name.to_lowercase() == wanted)
    }

    pub fn upsert(&self, category: Category) -> Result<(), UpkeepError> {
        self.table.upsert(category)
    }

    pub fn delete(&self, id: CategoryId) -> Result<Option<Category>, UpkeepError> {
        self.table.remove(id)
    }

    pub fn count(&self) -> Result<usize, UpkeepError> {
        self.table.count()
    }

    pub fn snapshot(&self) -> Result<TableSnapshot<Category>, UpkeepError> {
        self.table.snapshot()
    }

    pub fn restore(&self, snapshot: TableSnapshot<Category>) -> Result<(), UpkeepError> {
        self.table.restore(snapshot)
    }
}

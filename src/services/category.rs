//! Category service
//!
//! Categories are shared by all users. Deleting one leaves its expenses in
//! place as uncategorized.

use tracing::info;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Category, CategoryId, Entity};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category; names must be unique ignoring case
    pub fn create(&self, name: &str, description: &str) -> UpkeepResult<Category> {
        let name = name.trim();
        if self.storage.categories.get_by_name(name)?.is_some() {
            return Err(UpkeepError::duplicate(Entity::Category, name.to_string()));
        }
        self.insert(name, description)
    }

    fn insert(&self, name: &str, description: &str) -> UpkeepResult<Category> {
        let mut category = Category::with_description(CategoryId::new(0), name, description);
        category
            .validate()
            .map_err(|e| UpkeepError::Validation(e.to_string()))?;

        category.id = self.storage.categories.next_id()?;
        self.storage.categories.upsert(category.clone())?;
        self.storage.flush()?;

        self.storage.log_create(
            Entity::Category,
            category.id,
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Find a category by exact name, creating it if absent
    ///
    /// The description is only used when a new category is created. Returns
    /// the category and whether it was created.
    pub fn get_or_create(&self, name: &str, description: &str) -> UpkeepResult<(Category, bool)> {
        if let Some(existing) = self.storage.categories.get_by_exact_name(name)? {
            return Ok((existing, false));
        }
        Ok((self.insert(name, description)?, true))
    }

    pub fn get(&self, id: CategoryId) -> UpkeepResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by id ("3" or "cat-3") or name (case-insensitive)
    pub fn find(&self, identifier: &str) -> UpkeepResult<Option<Category>> {
        if let Ok(id) = identifier.parse::<CategoryId>() {
            if let Some(category) = self.storage.categories.get(id)? {
                return Ok(Some(category));
            }
        }
        self.storage.categories.get_by_name(identifier)
    }

    pub fn require(&self, identifier: &str) -> UpkeepResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Category, identifier))
    }

    /// All categories in id order
    pub fn list(&self) -> UpkeepResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    /// Number of expenses, across all users, filed under a category
    pub fn expense_count(&self, id: CategoryId) -> UpkeepResult<usize> {
        Ok(self.storage.expenses.get_by_category(id)?.len())
    }

    /// Rename a category and/or change its description
    pub fn update(
        &self,
        id: CategoryId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> UpkeepResult<Category> {
        let before = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Category, id.to_string()))?;
        let mut category = before.clone();

        if let Some(new_name) = name {
            let new_name = new_name.trim();
            if let Some(other) = self.storage.categories.get_by_name(new_name)? {
                if other.id != id {
                    return Err(UpkeepError::duplicate(Entity::Category, new_name.to_string()));
                }
            }
            category.name = new_name.to_string();
        }

        if let Some(desc) = description {
            category.description = desc.to_string();
        }

        category
            .validate()
            .map_err(|e| UpkeepError::Validation(e.to_string()))?;
        category.updated_at = chrono::Utc::now();

        self.storage.categories.upsert(category.clone())?;
        self.storage.flush()?;

        self.storage.log_update(
            Entity::Category,
            category.id,
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Delete a category, detaching it from every expense
    ///
    /// Returns the deleted category and how many expenses became uncategorized.
    pub fn delete(&self, id: CategoryId) -> UpkeepResult<(Category, usize)> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Category, id.to_string()))?;

        let detached = self.storage.transaction(|storage| {
            let detached = storage.expenses.clear_category(id)?;
            storage.categories.delete(id)?;
            storage.log_delete(
                Entity::Category,
                category.id,
                Some(category.name.clone()),
                &category,
            )?;
            Ok(detached)
        })?;

        info!(category = %category.name, detached, "category deleted");
        Ok((category, detached))
    }
}

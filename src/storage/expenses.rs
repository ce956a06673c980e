//! Recurring expense repository
//!
//! Manages loading and saving expenses to expenses.json. Every query that
//! returns a list is scoped to one owner; the dashboard and lists never see
//! another user's data.

use std::path::PathBuf;

use crate::error::UpkeepError;
use crate::models::{CategoryId, ExpenseId, Money, RecurringExpense, UserId};

use super::table::{Record, Table, TableSnapshot};

impl Record for RecurringExpense {
    type Id = ExpenseId;

    fn id(&self) -> ExpenseId {
        self.id
    }
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    table: Table<RecurringExpense>,
}

impl ExpenseRepository {
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

    pub fn next_id(&self) -> Result<ExpenseId, UpkeepError> {
        self.table.allocate_id()
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<RecurringExpense>, UpkeepError> {
        self.table.get(id)
    }

    /// Get an expense only if it belongs to `owner`
    pub fn get_owned(
        &self,
        owner: UserId,
        id: ExpenseId,
    ) -> Result<Option<RecurringExpense>, UpkeepError> {
        Ok(self.table.get(id)?.filter(|e| e.owner == owner))
    }

    /// All of an owner's expenses ordered by due date, then name, then id
    pub fn get_by_owner(&self, owner: UserId) -> Result<Vec<RecurringExpense>, UpkeepError> {
        let mut expenses = self.table.filter(|e| e.owner == owner)?;
        expenses.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(expenses)
    }

    /// An owner's expense matched by name, case-insensitive
    pub fn get_by_name(
        &self,
        owner: UserId,
        name: &str,
    ) -> Result<Option<RecurringExpense>, UpkeepError> {
        let wanted = name.to_lowercase();
        self.table
            .find(|e| e.owner == owner && e.name.to_lowercase() == wanted)
    }

    /// An owner's expense with exactly this name and amount
    pub fn find_duplicate(
        &self,
        owner: UserId,
        name: &str,
        amount: Money,
    ) -> Result<Option<RecurringExpense>, UpkeepError> {
        let name = name.trim();
        self.table
            .find(|e| e.owner == owner && e.amount == amount && e.name.trim() == name)
    }

    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<RecurringExpense>, UpkeepError> {
        self.table.filter(|e| e.category_id == Some(category_id))
    }

    pub fn upsert(&self, expense: RecurringExpense) -> Result<(), UpkeepError> {
        self.table.upsert(expense)
    }

    pub fn delete(&self, id: ExpenseId) -> Result<Option<RecurringExpense>, UpkeepError> {
        self.table.remove(id)
    }

    /// Remove all expenses belonging to `owner`
    pub fn delete_by_owner(&self, owner: UserId) -> Result<Vec<RecurringExpense>, UpkeepError> {
        self.table.remove_where(|e| e.owner == owner)
    }

    /// Detach every expense from a category, returning how many changed
    pub fn clear_category(&self, category_id: CategoryId) -> Result<usize, UpkeepError> {
        self.table.update_where(
            |e| e.category_id == Some(category_id),
            |e| {
                e.category_id = None;
                e.updated_at = chrono::Utc::now();
            },
        )
    }

    pub fn count(&self) -> Result<usize, UpkeepError> {
        self.table.count()
    }

    pub fn count_by_owner(&self, owner: UserId) -> Result<usize, UpkeepError> {
        Ok(self.table.filter(|e| e.owner == owner)?.len())
    }

    pub fn snapshot(&self) -> Result<TableSnapshot<RecurringExpense>, UpkeepError> {
        self.table.snapshot()
    }

    pub fn restore(&self, snapshot: TableSnapshot<RecurringExpense>) -> Result<(), UpkeepError> {
        self.table.restore(snapshot)
    }
}

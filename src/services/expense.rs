//! Expense service
//!
//! CRUD for recurring expenses. Every operation is scoped to one owner: an
//! expense belonging to someone else is reported as not found.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{
    CategoryId, Entity, ExpenseId, ExpensePayment, Frequency, Money, RecurringExpense, UserId,
};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
    owner: UserId,
}

/// Options for filtering expense lists
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Include deactivated expenses
    pub include_inactive: bool,
    /// Only expenses in this category
    pub category_id: Option<CategoryId>,
    /// Only expenses with no category
    pub uncategorized: bool,
    /// Only expenses with this frequency
    pub frequency: Option<Frequency>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn uncategorized(mut self) -> Self {
        self.uncategorized = true;
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    fn matches(&self, expense: &RecurringExpense) -> bool {
        (self.include_inactive || expense.is_active)
            && self
                .category_id
                .map_or(true, |id| expense.category_id == Some(id))
            && (!self.uncategorized || expense.category_id.is_none())
            && self.frequency.map_or(true, |f| expense.frequency == f)
    }
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub name: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
    pub category_id: Option<CategoryId>,
    pub description: String,
    pub is_active: bool,
}

impl CreateExpenseInput {
    /// An active, uncategorized expense with no description
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency,
            due_date,
            category_id: None,
            description: String::new(),
            is_active: true,
        }
    }
}

/// Changes to apply to an existing expense; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub frequency: Option<Frequency>,
    pub due_date: Option<NaiveDate>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<CategoryId>>,
    pub description: Option<String>,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage, owner: UserId) -> Self {
        Self { storage, owner }
    }

    fn check_category(&self, category_id: Option<CategoryId>) -> UpkeepResult<()> {
        if let Some(id) = category_id {
            self.storage
                .categories
                .get(id)?
                .ok_or_else(|| UpkeepError::not_found(Entity::Category, id.to_string()))?;
        }
        Ok(())
    }

    /// Create a new expense for the owner
    pub fn create(&self, input: CreateExpenseInput) -> UpkeepResult<RecurringExpense> {
        self.check_category(input.category_id)?;

        let mut expense = RecurringExpense::new(
            ExpenseId::new(0),
            self.owner,
            input.name.trim(),
            input.amount,
            input.frequency,
            input.due_date,
        );
        expense.category_id = input.category_id;
        expense.description = input.description;
        expense.is_active = input.is_active;

        expense
            .validate()
            .map_err(|e| UpkeepError::Validation(e.to_string()))?;

        expense.id = self.storage.expenses.next_id()?;
        self.storage.expenses.upsert(expense.clone())?;
        self.storage.flush()?;

        self.storage.log_create(
            Entity::Expense,
            expense.id,
            Some(expense.name.clone()),
            &expense,
        )?;

        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> UpkeepResult<Option<RecurringExpense>> {
        self.storage.expenses.get_owned(self.owner, id)
    }

    /// Find an expense by id ("4" or "exp-4") or name (case-insensitive)
    pub fn find(&self, identifier: &str) -> UpkeepResult<Option<RecurringExpense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            if let Some(expense) = self.get(id)? {
                return Ok(Some(expense));
            }
        }
        self.storage.expenses.get_by_name(self.owner, identifier)
    }

    pub fn require(&self, identifier: &str) -> UpkeepResult<RecurringExpense> {
        self.find(identifier)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Expense, identifier))
    }

    /// The owner's expenses ordered by due date
    pub fn list(&self, filter: &ExpenseFilter) -> UpkeepResult<Vec<RecurringExpense>> {
        Ok(self
            .storage
            .expenses
            .get_by_owner(self.owner)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    /// An existing expense with exactly this name and amount
    pub fn find_duplicate(
        &self,
        name: &str,
        amount: Money,
    ) -> UpkeepResult<Option<RecurringExpense>> {
        self.storage.expenses.find_duplicate(self.owner, name, amount)
    }

    fn owned(&self, id: ExpenseId) -> UpkeepResult<RecurringExpense> {
        self.get(id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Expense, id.to_string()))
    }

    fn save_change(
        &self,
        before: &RecurringExpense,
        mut after: RecurringExpense,
    ) -> UpkeepResult<RecurringExpense> {
        after.updated_at = Utc::now();
        self.storage.expenses.upsert(after.clone())?;
        self.storage.flush()?;

        self.storage.log_update(
            Entity::Expense,
            after.id,
            Some(after.name.clone()),
            before,
            &after,
        )?;
        Ok(after)
    }

    /// Apply changes to an expense
    pub fn update(
        &self,
        id: ExpenseId,
        input: UpdateExpenseInput,
    ) -> UpkeepResult<RecurringExpense> {
        let before = self.owned(id)?;
        let mut expense = before.clone();

        if let Some(name) = input.name {
            expense.name = name.trim().to_string();
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(frequency) = input.frequency {
            expense.frequency = frequency;
        }
        if let Some(due_date) = input.due_date {
            expense.due_date = due_date;
        }
        if let Some(category_id) = input.category_id {
            self.check_category(category_id)?;
            expense.category_id = category_id;
        }
        if let Some(description) = input.description {
            expense.description = description;
        }

        expense
            .validate()
            .map_err(|e| UpkeepError::Validation(e.to_string()))?;

        self.save_change(&before, expense)
    }

    /// Activate or deactivate an expense
    pub fn set_active(&self, id: ExpenseId, active: bool) -> UpkeepResult<RecurringExpense> {
        let before = self.owned(id)?;
        if before.is_active == active {
            return Ok(before);
        }

        let mut expense = before.clone();
        if active {
            expense.activate();
        } else {
            expense.deactivate();
        }
        self.save_change(&before, expense)
    }

    /// Delete an expense and its payments
    ///
    /// Returns the deleted expense and the payments removed with it.
    pub fn delete(
        &self,
        id: ExpenseId,
    ) -> UpkeepResult<(RecurringExpense, Vec<ExpensePayment>)> {
        let expense = self.owned(id)?;

        let payments = self.storage.transaction(|storage| {
            let ids: HashSet<_> = [expense.id].into_iter().collect();
            let payments = storage.payments.delete_by_expenses(&ids)?;
            storage.expenses.delete(expense.id)?;

            for payment in &payments {
                storage.log_delete(Entity::Payment, payment.id, None, payment)?;
            }
            storage.log_delete(
                Entity::Expense,
                expense.id,
                Some(expense.name.clone()),
                &expense,
            )?;
            Ok(payments)
        })?;

        info!(expense = %expense.name, payments = payments.len(), "expense deleted");
        Ok((expense, payments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn electricity() -> CreateExpenseInput {
        CreateExpenseInput::new(
            "Electricity Bill",
            Money::from_cents(10000),
            Frequency::Monthly,
            date(2026, 10, 24),
        )
    }

    #[test]
    fn test_create_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));

        let expense = service.create(electricity()).unwrap();
        assert_eq!(expense.owner, UserId::new(1));
        assert!(expense.is_active);
        assert_eq!(expense.to_string(), "Electricity Bill - 100.00 (Monthly)");
    }

    #[test]
    fn test_create_rejects_zero_and_negative_amounts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));

        for cents in [0, -5000] {
            let mut input = electricity();
            input.amount = Money::from_cents(cents);
            assert!(service.create(input).unwrap_err().is_validation());
        }
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_create_with_unknown_category_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));

        let mut input = electricity();
        input.category_id = Some(CategoryId::new(99));
        assert!(service.create(input).unwrap_err().is_not_found());
    }

    #[test]
    fn test_other_users_expense_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = ExpenseService::new(&storage, UserId::new(1));
        let bob = ExpenseService::new(&storage, UserId::new(2));

        let expense = alice.create(electricity()).unwrap();
        assert!(bob.get(expense.id).unwrap().is_none());
        assert!(bob.find("Electricity Bill").unwrap().is_none());
        assert!(bob.delete(expense.id).unwrap_err().is_not_found());
        assert!(bob.list(&ExpenseFilter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));

        let power = service.create(electricity()).unwrap();
        let mut gym = CreateExpenseInput::new(
            "Gym",
            Money::from_cents(4000),
            Frequency::Weekly,
            date(2026, 10, 20),
        );
        gym.is_active = false;
        service.create(gym).unwrap();

        let active = service.list(&ExpenseFilter::new()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, power.id);

        let all = service
            .list(&ExpenseFilter::new().include_inactive(true))
            .unwrap();
        assert_eq!(all[0].name, "Gym");

        let weekly = service
            .list(
                &ExpenseFilter::new()
                    .include_inactive(true)
                    .frequency(Frequency::Weekly),
            )
            .unwrap();
        assert_eq!(weekly.len(), 1);
    }

    #[test]
    fn test_update_and_clear_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));
        let category = crate::services::CategoryService::new(&storage)
            .create("Utilities", "")
            .unwrap();

        let expense = service.create(electricity()).unwrap();
        let updated = service
            .update(
                expense.id,
                UpdateExpenseInput {
                    amount: Some(Money::from_cents(12000)),
                    category_id: Some(Some(category.id)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, Money::from_cents(12000));
        assert_eq!(updated.category_id, Some(category.id));

        let cleared = service
            .update(
                expense.id,
                UpdateExpenseInput {
                    category_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.category_id, None);

        let bad = service.update(
            expense.id,
            UpdateExpenseInput {
                amount: Some(Money::zero()),
                ..Default::default()
            },
        );
        assert!(bad.unwrap_err().is_validation());
    }

    #[test]
    fn test_set_active_toggles() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));
        let expense = service.create(electricity()).unwrap();

        assert!(!service.set_active(expense.id, false).unwrap().is_active);
        assert!(service.set_active(expense.id, true).unwrap().is_active);
    }

    #[test]
    fn test_delete_cascades_to_payments() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage, UserId::new(1));
        let expense = service.create(electricity()).unwrap();

        storage
            .payments
            .upsert(ExpensePayment::new(
                storage.payments.next_id().unwrap(),
                expense.id,
                date(2026, 10, 1),
                expense.amount,
            ))
            .unwrap();

        let (_, payments) = service.delete(expense.id).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(storage.payments.count().unwrap(), 0);
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }
}

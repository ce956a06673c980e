//! User service
//!
//! Creating, listing and deleting users, and resolving which user a command
//! acts on.

use std::collections::HashSet;

use tracing::info;

use crate::config::settings::Settings;
use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Entity, User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

/// What a user deletion removed
#[derive(Debug, Clone)]
pub struct UserDeletion {
    pub user: User,
    pub expenses_removed: usize,
    pub payments_removed: usize,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new user
    pub fn create(&self, username: &str) -> UpkeepResult<User> {
        let mut user = User::new(UserId::new(0), username.trim());
        user.validate().map_err(UpkeepError::Validation)?;

        if self.storage.users.get_by_username(&user.username)?.is_some() {
            return Err(UpkeepError::duplicate(Entity::User, user.username));
        }

        user.id = self.storage.users.next_id()?;
        self.storage.users.upsert(user.clone())?;
        self.storage.flush()?;

        self.storage.log_create(
            Entity::User,
            user.id,
            Some(user.username.clone()),
            &user,
        )?;

        info!(user = %user.username, "user created");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> UpkeepResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// Find a user by username or id
    pub fn find(&self, identifier: &str) -> UpkeepResult<Option<User>> {
        if let Some(user) = self.storage.users.get_by_username(identifier)? {
            return Ok(Some(user));
        }
        match identifier.parse::<UserId>() {
            Ok(id) => self.storage.users.get(id),
            Err(_) => Ok(None),
        }
    }

    /// Like `find`, but a missing user is an error
    pub fn require(&self, identifier: &str) -> UpkeepResult<User> {
        self.find(identifier)?
            .ok_or_else(|| UpkeepError::not_found(Entity::User, identifier))
    }

    pub fn list(&self) -> UpkeepResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Delete a user together with their expenses and payments
    pub fn delete(&self, identifier: &str) -> UpkeepResult<UserDeletion> {
        let user = self.require(identifier)?;

        let deletion = self.storage.transaction(|storage| {
            let expenses = storage.expenses.delete_by_owner(user.id)?;
            let expense_ids: HashSet<_> = expenses.iter().map(|e| e.id).collect();
            let payments = storage.payments.delete_by_expenses(&expense_ids)?;
            storage.users.delete(user.id)?;

            for payment in &payments {
                storage.log_delete(Entity::Payment, payment.id, None, payment)?;
            }
            for expense in &expenses {
                storage.log_delete(
                    Entity::Expense,
                    expense.id,
                    Some(expense.name.clone()),
                    expense,
                )?;
            }
            storage.log_delete(
                Entity::User,
                user.id,
                Some(user.username.clone()),
                &user,
            )?;

            Ok(UserDeletion {
                user: user.clone(),
                expenses_removed: expenses.len(),
                payments_removed: payments.len(),
            })
        })?;

        info!(
            user = %deletion.user.username,
            expenses = deletion.expenses_removed,
            payments = deletion.payments_removed,
            "user deleted"
        );
        Ok(deletion)
    }

    /// Resolve the user a command acts on
    ///
    /// An explicit name wins, then the configured current user. With neither
    /// set, a store holding exactly one user selects that user.
    pub fn resolve_current(
        &self,
        explicit: Option<&str>,
        settings: &Settings,
    ) -> UpkeepResult<User> {
        if let Some(name) = explicit.or(settings.current_user.as_deref()) {
            return self.require(name);
        }

        let mut users = self.list()?;
        if users.len() == 1 {
            return Ok(users.remove(0));
        }
        Err(UpkeepError::NoActiveUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use crate::models::{ExpensePayment, Frequency, Money, RecurringExpense};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_user() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = service.create("  alice ").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, UserId::new(1));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        service.create("alice").unwrap();
        let err = service.create("Alice").unwrap_err();
        assert!(matches!(err, UpkeepError::Duplicate { .. }));
    }

    #[test]
    fn test_invalid_username_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        assert!(service.create("").unwrap_err().is_validation());
        assert!(service.create("two words").unwrap_err().is_validation());
        assert_eq!(storage.users.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let user = service.create("bob").unwrap();

        assert_eq!(service.find("BOB").unwrap().unwrap().id, user.id);
        assert_eq!(service.find("usr-1").unwrap().unwrap().id, user.id);
        assert!(service.find("carol").unwrap().is_none());
        assert!(service.require("carol").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_cascades() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let alice = service.create("alice").unwrap();
        let bob = service.create("bob").unwrap();

        let due = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        for owner in [alice.id, bob.id] {
            let expense = RecurringExpense::new(
                storage.expenses.next_id().unwrap(),
                owner,
                "Rent",
                Money::from_cents(100000),
                Frequency::Monthly,
                due,
            );
            storage.expenses.upsert(expense.clone()).unwrap();
            storage
                .payments
                .upsert(ExpensePayment::new(
                    storage.payments.next_id().unwrap(),
                    expense.id,
                    due,
                    expense.amount,
                ))
                .unwrap();
        }

        let deletion = service.delete("alice").unwrap();
        assert_eq!(deletion.expenses_removed, 1);
        assert_eq!(deletion.payments_removed, 1);
        assert_eq!(storage.users.count().unwrap(), 1);
        assert_eq!(storage.expenses.count().unwrap(), 1);
        assert_eq!(storage.payments.count().unwrap(), 1);
        assert_eq!(storage.expenses.get_by_owner(bob.id).unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_current() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let mut settings = Settings::default();

        assert!(matches!(
            service.resolve_current(None, &settings),
            Err(UpkeepError::NoActiveUser)
        ));

        let alice = service.create("alice").unwrap();
        assert_eq!(service.resolve_current(None, &settings).unwrap().id, alice.id);

        let bob = service.create("bob").unwrap();
        assert!(service.resolve_current(None, &settings).is_err());

        settings.current_user = Some("bob".into());
        assert_eq!(service.resolve_current(None, &settings).unwrap().id, bob.id);
        assert_eq!(
            service.resolve_current(Some("alice"), &settings).unwrap().id,
            alice.id
        );
    }
}

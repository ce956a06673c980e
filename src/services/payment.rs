//! Payment service
//!
//! Records payments against the owner's expenses. Payments never move an
//! expense's due date; the next occurrence is always computed.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Entity, ExpenseId, ExpensePayment, Money, PaymentId, UserId};
use crate::storage::Storage;

/// Service for payment management
pub struct PaymentService<'a> {
    storage: &'a Storage,
    owner: UserId,
}

/// Input for recording a payment
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    pub expense_id: ExpenseId,
    pub payment_date: NaiveDate,
    pub amount_paid: Money,
    pub notes: String,
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage, owner: UserId) -> Self {
        Self { storage, owner }
    }

    /// Record a payment against one of the owner's expenses
    pub fn record(&self, input: RecordPaymentInput) -> UpkeepResult<ExpensePayment> {
        let expense = self
            .storage
            .expenses
            .get_owned(self.owner, input.expense_id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Expense, input.expense_id.to_string()))?;

        let mut payment = ExpensePayment::new(
            PaymentId::new(0),
            expense.id,
            input.payment_date,
            input.amount_paid,
        );
        payment.notes = input.notes;
        payment.validate().map_err(UpkeepError::Validation)?;

        payment.id = self.storage.payments.next_id()?;
        self.storage.payments.upsert(payment.clone())?;
        self.storage.flush()?;

        self.storage.log_create(
            Entity::Payment,
            payment.id,
            Some(payment.describe(&expense.name)),
            &payment,
        )?;

        Ok(payment)
    }

    /// Payments for one of the owner's expenses, newest first
    pub fn list_for_expense(&self, expense_id: ExpenseId) -> UpkeepResult<Vec<ExpensePayment>> {
        self.storage
            .expenses
            .get_owned(self.owner, expense_id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Expense, expense_id.to_string()))?;
        self.storage.payments.get_by_expense(expense_id)
    }

    /// All of the owner's payments, newest first
    pub fn list(&self) -> UpkeepResult<Vec<ExpensePayment>> {
        let ids: HashSet<_> = self
            .storage
            .expenses
            .get_by_owner(self.owner)?
            .into_iter()
            .map(|e| e.id)
            .collect();
        self.storage.payments.get_by_expenses(&ids)
    }

    fn owned(&self, id: PaymentId) -> UpkeepResult<ExpensePayment> {
        let payment = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| UpkeepError::not_found(Entity::Payment, id.to_string()))?;

        match self.storage.expenses.get_owned(self.owner, payment.expense_id)? {
            Some(_) => Ok(payment),
            None => Err(UpkeepError::not_found(Entity::Payment, id.to_string())),
        }
    }

    pub fn get(&self, id: PaymentId) -> UpkeepResult<Option<ExpensePayment>> {
        match self.owned(id) {
            Ok(payment) => Ok(Some(payment)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn delete(&self, id: PaymentId) -> UpkeepResult<ExpensePayment> {
        let payment = self.owned(id)?;

        self.storage.payments.delete(id)?;
        self.storage.flush()?;
        self.storage
            .log_delete(Entity::Payment, payment.id, None, &payment)?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use crate::models::Frequency;
    use crate::services::{CreateExpenseInput, ExpenseService};
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

    fn setup(storage: &Storage, owner: UserId) -> ExpenseId {
        ExpenseService::new(storage, owner)
            .create(CreateExpenseInput::new(
                "Internet",
                Money::from_cents(6000),
                Frequency::Monthly,
                date(2026, 10, 15),
            ))
            .unwrap()
            .id
    }

    fn input(expense_id: ExpenseId, cents: i64, day: NaiveDate) -> RecordPaymentInput {
        RecordPaymentInput {
            expense_id,
            payment_date: day,
            amount_paid: Money::from_cents(cents),
            notes: String::new(),
        }
    }

    #[test]
    fn test_record_payment() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let expense_id = setup(&storage, owner);
        let service = PaymentService::new(&storage, owner);

        let payment = service
            .record(input(expense_id, 6000, date(2026, 10, 15)))
            .unwrap();
        assert_eq!(service.list_for_expense(expense_id).unwrap(), vec![payment]);
    }

    #[test]
    fn test_future_payment_allowed() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let expense_id = setup(&storage, owner);
        let service = PaymentService::new(&storage, owner);

        assert!(service
            .record(input(expense_id, 6000, date(2030, 1, 1)))
            .is_ok());
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let expense_id = setup(&storage, owner);
        let service = PaymentService::new(&storage, owner);

        for cents in [0, -100] {
            let err = service
                .record(input(expense_id, cents, date(2026, 10, 15)))
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(storage.payments.count().unwrap(), 0);
    }

    #[test]
    fn test_cannot_touch_other_users_payments() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = UserId::new(1);
        let expense_id = setup(&storage, alice);
        let payment = PaymentService::new(&storage, alice)
            .record(input(expense_id, 6000, date(2026, 10, 15)))
            .unwrap();

        let bob = PaymentService::new(&storage, UserId::new(2));
        assert!(bob
            .record(input(expense_id, 6000, date(2026, 10, 15)))
            .unwrap_err()
            .is_not_found());
        assert!(bob.get(payment.id).unwrap().is_none());
        assert!(bob.delete(payment.id).unwrap_err().is_not_found());
        assert!(bob.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_payment() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let expense_id = setup(&storage, owner);
        let service = PaymentService::new(&storage, owner);
        let payment = service
            .record(input(expense_id, 6000, date(2026, 10, 15)))
            .unwrap();

        service.delete(payment.id).unwrap();
        assert!(service.list().unwrap().is_empty());
    }
}

//! Expense payment repository
//!
//! Manages loading and saving payments to payments.json

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::UpkeepError;
use crate::models::{ExpenseId, ExpensePayment, PaymentId};

use super::table::{Record, Table, TableSnapshot};

impl Record for ExpensePayment {
    type Id = PaymentId;

    fn id(&self) -> PaymentId {
        self.id
    }
}

/// Repository for payment persistence
pub struct PaymentRepository {
    table: Table<ExpensePayment>,
}

/// Newest first: payment date descending, then most recently created
fn newest_first(payments: &mut [ExpensePayment]) {
    payments.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

impl PaymentRepository {
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

    pub fn next_id(&self) -> Result<PaymentId, UpkeepError> {
        self.table.allocate_id()
    }

    pub fn get(&self, id: PaymentId) -> Result<Option<ExpensePayment>, UpkeepError> {
        self.table.get(id)
    }

    /// Payments for one expense, newest first
    pub fn get_by_expense(
        &self,
        expense_id: ExpenseId,
    ) -> Result<Vec<ExpensePayment>, UpkeepError> {
        let mut payments = self.table.filter(|p| p.expense_id == expense_id)?;
        newest_first(&mut payments);
        Ok(payments)
    }

    /// Payments for any of the given expenses, newest first
    pub fn get_by_expenses(
        &self,
        expense_ids: &HashSet<ExpenseId>,
    ) -> Result<Vec<ExpensePayment>, UpkeepError> {
        let mut payments = self.table.filter(|p| expense_ids.contains(&p.expense_id))?;
        newest_first(&mut payments);
        Ok(payments)
    }

    pub fn upsert(&self, payment: ExpensePayment) -> Result<(), UpkeepError> {
        self.table.upsert(payment)
    }

    pub fn delete(&self, id: PaymentId) -> Result<Option<ExpensePayment>, UpkeepError> {
        self.table.remove(id)
    }

    /// Remove all payments recorded against the given expenses
    pub fn delete_by_expenses(
        &self,
        expense_ids: &HashSet<ExpenseId>,
    ) -> Result<Vec<ExpensePayment>, UpkeepError> {
        let doomed = |p: &ExpensePayment| expense_ids.contains(&p.expense_id);
        self.table.remove_where(doomed)
    }

    pub fn count(&self) -> Result<usize, UpkeepError> {
        self.table.count()
    }

    pub fn snapshot(&self) -> Result<TableSnapshot<ExpensePayment>, UpkeepError> {
        self.table.snapshot()
    }

    pub fn restore(&self, snapshot: TableSnapshot<ExpensePayment>) -> Result<(), UpkeepError> {
        self.table.restore(snapshot)
    }
}

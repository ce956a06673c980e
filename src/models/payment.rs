//! Expense payment model
//!
//! A single recorded payment against a recurring expense.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, PaymentId};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayment {
    pub id: PaymentId,

    /// The expense this payment settles
    pub expense_id: ExpenseId,

    /// Date the payment was made; may be in the future
    pub payment_date: NaiveDate,

    pub amount_paid: Money,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
}

impl ExpensePayment {
    pub fn new(
        id: PaymentId,
        expense_id: ExpenseId,
        payment_date: NaiveDate,
        amount_paid: Money,
    ) -> Self {
        Self {
            id,
            expense_id,
            payment_date,
            amount_paid,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Validate the payment
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount_paid.is_valid_amount() {
            return Err(format!(
                "Payment amount must be between {} and {} (got {})",
                Money::MIN_POSITIVE,
                Money::MAX_AMOUNT,
                self.amount_paid
            ));
        }
        Ok(())
    }

    /// Human label: "{expense name} - {date} - {amount}"
    pub fn describe(&self, expense_name: &str) -> String {
        format!(
            "{} - {} - {}",
            expense_name, self.payment_date, self.amount_paid
        )
    }
}

impl fmt::Display for ExpensePayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.payment_date, self.amount_paid)
    }
}

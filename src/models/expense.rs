//! Recurring expense model
//!
//! A bill that comes due on a cadence, owned by exactly one user.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::frequency::Frequency;
use super::ids::{CategoryId, ExpenseId, UserId};
use super::money::Money;
use super::recurrence::next_recurrence;

/// Maximum length of an expense name
pub const EXPENSE_NAME_MAX: usize = 200;

/// A recurring bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Display name, e.g. "Electricity Bill"
    pub name: String,

    /// Amount due each cycle
    pub amount: Money,

    /// Optional category; `None` means uncategorized
    #[serde(default)]
    pub category_id: Option<CategoryId>,

    /// How often the expense recurs
    pub frequency: Frequency,

    /// Current due date
    pub due_date: NaiveDate,

    #[serde(default)]
    pub description: String,

    /// Owning user
    pub owner: UserId,

    /// Inactive expenses are kept but excluded from the dashboard
    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl RecurringExpense {
    /// Create a new active expense
    pub fn new(
        id: ExpenseId,
        owner: UserId,
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            amount,
            category_id: None,
            frequency,
            due_date,
            description: String::new(),
            owner,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next relevant due date relative to `today`
    pub fn next_recurrence(&self, today: NaiveDate) -> NaiveDate {
        next_recurrence(self.due_date, self.frequency, today)
    }

    /// Whether the expense is due before `today`
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.name.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > EXPENSE_NAME_MAX {
            return Err(ExpenseValidationError::NameTooLong(len));
        }

        if !self.amount.is_valid_amount() {
            return Err(ExpenseValidationError::AmountOutOfRange(self.amount));
        }

        Ok(())
    }
}

impl fmt::Display for RecurringExpense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.name, self.amount, self.frequency)
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyName,
    NameTooLong(usize),
    AmountOutOfRange(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Expense name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Expense name too long ({} chars, max {})",
                len, EXPENSE_NAME_MAX
            ),
            Self::AmountOutOfRange(amount) => write!(
                f,
                "Expense amount must be between {} and {} (got {})",
                Money::MIN_POSITIVE,
                Money::MAX_AMOUNT,
                amount
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn electricity() -> RecurringExpense {
        RecurringExpense::new(
            ExpenseId::new(1),
            UserId::new(1),
            "Electricity Bill",
            Money::from_cents(10000),
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn test_new_expense_defaults() {
        let expense = electricity();
        assert!(expense.is_active);
        assert!(expense.category_id.is_none());
        assert!(expense.description.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(electricity().to_string(), "Electricity Bill - 100.00 (Monthly)");
    }

    #[test]
    fn test_amount_validation() {
        let mut expense = electricity();
        assert!(expense.validate().is_ok());

        expense.amount = Money::zero();
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::AmountOutOfRange(_))
        ));

        expense.amount = Money::from_cents(-1000);
        assert!(expense.validate().is_err());

        expense.amount = Money::from_cents(1);
        assert!(expense.validate().is_ok());

        expense.amount = Money::MAX_AMOUNT;
        assert!(expense.validate().is_ok());

        expense.amount = Money::from_cents(Money::MAX_AMOUNT.cents() + 1);
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn test_name_validation() {
        let mut expense = electricity();
        expense.name = String::new();
        assert_eq!(expense.validate(), Err(ExpenseValidationError::EmptyName));
    }

    #[test]
    fn test_next_recurrence_delegates() {
        let expense = electricity();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            expense.next_recurrence(today),
            NaiveDate::from_ymd_opt(2026, 11, 19).unwrap()
        );
    }

    #[test]
    fn test_deserialize_defaults_active() {
        let json = r#"{
            "id": 3, "name": "Gym", "amount": 2500, "frequency": "MONTHLY",
            "due_date": "2026-11-01", "owner": 1,
            "created_at": "2026-01-01T00:00:00Z", "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let expense: RecurringExpense = serde_json::from_str(json).unwrap();
        assert!(expense.is_active);
        assert_eq!(expense.category_id, None);
    }
}

//! CSV export
//!
//! One row per expense for spreadsheets. This format is for reading only;
//! `upkeep import` accepts the JSON export.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Money, User};
use crate::storage::Storage;

const HEADER: &[&str] = &[
    "id",
    "name",
    "amount",
    "category",
    "frequency",
    "due_date",
    "next_due",
    "active",
    "payment_count",
    "total_paid",
    "description",
];

fn export_err(e: impl std::fmt::Display) -> UpkeepError {
    UpkeepError::Export(e.to_string())
}

/// Write a user's expenses as CSV, returning the number of rows
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    user: &User,
    today: NaiveDate,
    writer: W,
) -> UpkeepResult<usize> {
    let category_names: HashMap<_, _> = storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER).map_err(export_err)?;

    let expenses = storage.expenses.get_by_owner(user.id)?;
    for expense in &expenses {
        let payments = storage.payments.get_by_expense(expense.id)?;
        let total_paid: Money = payments.iter().map(|p| p.amount_paid).sum();
        let category = expense
            .category_id
            .and_then(|id| category_names.get(&id))
            .map(String::as_str)
            .unwrap_or("");

        csv.write_record([
            expense.id.to_string(),
            expense.name.clone(),
            expense.amount.to_decimal_string(),
            category.to_string(),
            expense.frequency.code().to_string(),
            expense.due_date.to_string(),
            expense.next_recurrence(today).to_string(),
            expense.is_active.to_string(),
            payments.len().to_string(),
            total_paid.to_decimal_string(),
            expense.description.clone(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(export_err)?;
    Ok(expenses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use crate::models::{ExpensePayment, Frequency, RecurringExpense, UserId};
    use tempfile::TempDir;

    #[test]
    fn test_csv_rows() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let user = User::new(UserId::new(1), "alice");
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let mut expense = RecurringExpense::new(
            storage.expenses.next_id().unwrap(),
            user.id,
            "Rent, main flat",
            Money::from_cents(150000),
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        );
        expense.description = "Landlord".into();
        storage.expenses.upsert(expense.clone()).unwrap();
        storage
            .payments
            .upsert(ExpensePayment::new(
                storage.payments.next_id().unwrap(),
                expense.id,
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                Money::from_cents(150000),
            ))
            .unwrap();

        let mut out = Vec::new();
        let rows = export_expenses_csv(&storage, &user, today, &mut out).unwrap();
        assert_eq!(rows, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            lines[1],
            "exp-1,\"Rent, main flat\",1500.00,,MONTHLY,2026-10-01,2026-11-01,true,1,1500.00,Landlord"
        );
    }
}

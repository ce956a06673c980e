//! JSON export
//!
//! Writes one user's data in the document format that `upkeep import` reads
//! back: referenced categories, every expense (inactive included) and each
//! expense's payments. Amounts are two-decimal strings.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Frequency, User};
use crate::storage::Storage;

/// A complete export for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub username: String,
    pub categories: Vec<ExportedCategory>,
    pub expenses: Vec<ExportedExpense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedCategory {
    pub id: u64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedExpense {
    pub name: String,
    pub amount: String,
    pub category_id: Option<u64>,
    pub category_name: Option<String>,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
    pub description: String,
    pub is_active: bool,
    pub payments: Vec<ExportedPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPayment {
    pub payment_date: NaiveDate,
    pub amount_paid: String,
    pub notes: String,
}

impl ExportDocument {
    /// Collect everything `user` owns
    pub fn from_storage(storage: &Storage, user: &User) -> UpkeepResult<Self> {
        let expenses = storage.expenses.get_by_owner(user.id)?;

        let referenced: BTreeSet<_> = expenses.iter().filter_map(|e| e.category_id).collect();
        let mut categories = Vec::with_capacity(referenced.len());
        let mut category_names = HashMap::new();
        for id in referenced {
            if let Some(category) = storage.categories.get(id)? {
                category_names.insert(id, category.name.clone());
                categories.push(ExportedCategory {
                    id: id.value(),
                    name: category.name,
                    description: category.description,
                });
            }
        }

        let mut exported = Vec::with_capacity(expenses.len());
        for expense in expenses {
            // Oldest first, the order they were paid in
            let mut payments = storage.payments.get_by_expense(expense.id)?;
            payments.reverse();

            let category_name = expense
                .category_id
                .and_then(|id| category_names.get(&id).cloned());

            exported.push(ExportedExpense {
                name: expense.name,
                amount: expense.amount.to_decimal_string(),
                // A dangling reference exports as uncategorized
                category_id: category_name
                    .as_ref()
                    .and(expense.category_id.map(|id| id.value())),
                category_name,
                frequency: expense.frequency,
                due_date: expense.due_date,
                description: expense.description,
                is_active: expense.is_active,
                payments: payments
                    .into_iter()
                    .map(|p| ExportedPayment {
                        payment_date: p.payment_date,
                        amount_paid: p.amount_paid.to_decimal_string(),
                        notes: p.notes,
                    })
                    .collect(),
            });
        }

        Ok(Self {
            export_date: Utc::now(),
            username: user.username.clone(),
            categories,
            expenses: exported,
        })
    }

    pub fn payment_count(&self) -> usize {
        self.expenses.iter().map(|e| e.payments.len()).sum()
    }
}

/// Default export file name, e.g. `expenses_export_alice_20261019_120000.json`
pub fn default_export_filename(username: &str, at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "expenses_export_{}_{}.{}",
        username,
        at.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Write a user's export document as JSON
pub fn export_json<W: Write>(
    storage: &Storage,
    user: &User,
    writer: &mut W,
    pretty: bool,
) -> UpkeepResult<ExportDocument> {
    let document = ExportDocument::from_storage(storage, user)?;

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &document)
    } else {
        serde_json::to_writer(&mut *writer, &document)
    }
    .map_err(|e| UpkeepError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| UpkeepError::Export(e.to_string()))?;
    Ok(document)
}

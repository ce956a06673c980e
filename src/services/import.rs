//! JSON import service
//!
//! Reads a document in the export format and merges it into the current
//! user's data. The whole import runs in one storage transaction: any bad
//! field aborts it and nothing is written.
//!
//! Categories are matched by exact name and created when missing. An expense
//! whose name and amount both match one the user already has is skipped
//! together with its payments, so importing the same file twice is harmless.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{CategoryId, Frequency, Money, UserId};
use crate::storage::Storage;

use super::category::CategoryService;
use super::expense::{CreateExpenseInput, ExpenseService};
use super::payment::{PaymentService, RecordPaymentInput};

/// Top-level keys every import document must carry
const REQUIRED_KEYS: &[&str] = &["categories", "expenses"];

/// A parsed import document
#[derive(Debug, Clone, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub username: Option<String>,
    pub categories: Vec<ImportCategory>,
    pub expenses: Vec<ImportExpense>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportCategory {
    /// Id in the exporting store; only used to link expenses to categories
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportExpense {
    pub name: String,
    /// Decimal string ("75.00") or number
    pub amount: Value,
    #[serde(default)]
    pub category_id: Option<Value>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub frequency: String,
    pub due_date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub payments: Vec<ImportPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportPayment {
    pub payment_date: String,
    pub amount_paid: Value,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Counts of what an import did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub categories_matched: usize,
    pub expenses_created: usize,
    pub expenses_skipped: usize,
    pub payments_created: usize,
    /// Username recorded in the imported document
    pub source_username: Option<String>,
}

impl ImportSummary {
    /// One-line message shown after a successful import by `importer`
    pub fn message(&self, importer: &str) -> String {
        let origin = match self.source_username.as_deref() {
            Some(source) if source != importer => format!(" from {}'s export", source),
            _ => String::new(),
        };
        let mut message = format!(
            "Data imported successfully{}: {} expense(s) and {} payment(s) added",
            origin, self.expenses_created, self.payments_created
        );
        if self.categories_created > 0 {
            message.push_str(&format!(
                ", {} new categor{}",
                self.categories_created,
                if self.categories_created == 1 { "y" } else { "ies" }
            ));
        }
        if self.expenses_skipped > 0 {
            message.push_str(&format!(
                "; {} duplicate expense(s) skipped",
                self.expenses_skipped
            ));
        }
        message.push('.');
        message
    }
}

/// Parse an import document, checking the required keys first
pub fn parse_document(content: &str) -> UpkeepResult<ImportDocument> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| UpkeepError::Import(format!("Invalid JSON file: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        UpkeepError::Import("Invalid import file: expected a JSON object".into())
    })?;
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(UpkeepError::Import(format!(
            "Invalid import file format: missing {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| UpkeepError::Import(format!("Invalid import file format: {}", e)))
}

/// Normalize an exported id ("3", 3) into a lookup key
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn parse_amount(value: &Value, what: &str) -> UpkeepResult<Money> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(UpkeepError::Validation(format!(
                "{}: amount must be a string or number, got {}",
                what, other
            )))
        }
    };
    let amount = Money::parse(&text)
        .map_err(|e| UpkeepError::Validation(format!("{}: {}", what, e)))?;
    if !amount.is_valid_amount() {
        return Err(UpkeepError::Validation(format!(
            "{}: amount must be between {} and {} (got {})",
            what,
            Money::MIN_POSITIVE,
            Money::MAX_AMOUNT,
            amount
        )));
    }
    Ok(amount)
}

/// Prefix a validation message with the row it came from
fn in_row(what: &str, err: UpkeepError) -> UpkeepError {
    match err {
        UpkeepError::Validation(msg) => UpkeepError::Validation(format!("{}: {}", what, msg)),
        other => other,
    }
}

fn parse_date(text: &str, what: &str) -> UpkeepResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
        UpkeepError::Validation(format!(
            "{}: invalid date '{}' (expected YYYY-MM-DD)",
            what, text
        ))
    })
}

/// Service for importing exported data
pub struct ImportService<'a> {
    storage: &'a Storage,
    owner: UserId,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage, owner: UserId) -> Self {
        Self { storage, owner }
    }

    /// Import a file from disk
    pub fn import_file(&self, path: &Path) -> UpkeepResult<ImportSummary> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            UpkeepError::Import(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.import_str(&content)
    }

    /// Parse and apply a document
    pub fn import_str(&self, content: &str) -> UpkeepResult<ImportSummary> {
        let document = parse_document(content)?;
        self.apply(&document)
    }

    /// Apply an already-parsed document in a single transaction
    pub fn apply(&self, document: &ImportDocument) -> UpkeepResult<ImportSummary> {
        let summary = self
            .storage
            .transaction(|storage| self.apply_in(storage, document))?;

        info!(
            expenses_created = summary.expenses_created,
            expenses_skipped = summary.expenses_skipped,
            payments_created = summary.payments_created,
            categories_created = summary.categories_created,
            "import complete"
        );
        Ok(summary)
    }

    fn apply_in(&self, storage: &Storage, document: &ImportDocument) -> UpkeepResult<ImportSummary> {
        let categories = CategoryService::new(storage);
        let expenses = ExpenseService::new(storage, self.owner);
        let payments = PaymentService::new(storage, self.owner);
        let mut summary = ImportSummary {
            source_username: document.username.clone(),
            ..ImportSummary::default()
        };

        let mut category_map: HashMap<String, CategoryId> = HashMap::new();
        for (index, entry) in document.categories.iter().enumerate() {
            let (category, created) = categories
                .get_or_create(
                    &entry.name,
                    entry.description.as_deref().unwrap_or_default(),
                )
                .map_err(|e| in_row(&format!("category #{}", index + 1), e))?;
            if created {
                summary.categories_created += 1;
            } else {
                summary.categories_matched += 1;
            }
            if let Some(key) = entry.id.as_ref().and_then(id_key) {
                category_map.insert(key, category.id);
            }
        }

        for (index, entry) in document.expenses.iter().enumerate() {
            let what = format!("expense #{} ('{}')", index + 1, entry.name);
            let name = entry.name.trim();
            let amount = parse_amount(&entry.amount, &what)?;

            if expenses.find_duplicate(name, amount)?.is_some() {
                summary.expenses_skipped += 1;
                continue;
            }

            let frequency: Frequency = entry
                .frequency
                .parse()
                .map_err(|e| UpkeepError::Validation(format!("{}: {}", what, e)))?;
            let due_date = parse_date(&entry.due_date, &what)?;

            let mapped = entry
                .category_id
                .as_ref()
                .and_then(id_key)
                .and_then(|key| category_map.get(&key).copied());
            let category_id = match (mapped, entry.category_name.as_deref()) {
                (Some(id), _) => Some(id),
                (None, Some(category_name)) if !category_name.trim().is_empty() => {
                    let (category, created) = categories.get_or_create(category_name, "")?;
                    if created {
                        summary.categories_created += 1;
                    }
                    Some(category.id)
                }
                _ => None,
            };

            let mut input = CreateExpenseInput::new(name, amount, frequency, due_date);
            input.category_id = category_id;
            input.description = entry.description.clone().unwrap_or_default();
            input.is_active = entry.is_active.unwrap_or(true);

            let expense = expenses.create(input).map_err(|e| in_row(&what, e))?;
            summary.expenses_created += 1;

            for (p_index, p) in entry.payments.iter().enumerate() {
                let p_what = format!("{} payment #{}", what, p_index + 1);
                payments.record(RecordPaymentInput {
                    expense_id: expense.id,
                    payment_date: parse_date(&p.payment_date, &p_what)?,
                    amount_paid: parse_amount(&p.amount_paid, &p_what)?,
                    notes: p.notes.clone().unwrap_or_default(),
                })?;
                summary.payments_created += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use crate::services::{CreateExpenseInput, ExpenseFilter, ExpenseService};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn counts(storage: &Storage) -> (usize, usize, usize) {
        (
            storage.categories.count().unwrap(),
            storage.expenses.count().unwrap(),
            storage.payments.count().unwrap(),
        )
    }

    fn sample_document() -> Value {
        json!({
            "export_date": "2026-10-19",
            "username": "testuser",
            "categories": [
                {"id": 999, "name": "New Category", "description": "New Description"}
            ],
            "expenses": [{
                "name": "New Expense",
                "amount": "200.00",
                "category_id": 999,
                "category_name": "New Category",
                "frequency": "WEEKLY",
                "due_date": "2026-10-19",
                "description": "New Description",
                "is_active": true,
                "payments": [
                    {"payment_date": "2026-10-19", "amount_paid": "200.00", "notes": "New Payment"}
                ]
            }]
        })
    }

    #[test]
    fn test_import_maps_foreign_category_ids() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));

        let summary = service.import_str(&sample_document().to_string()).unwrap();
        assert_eq!(summary.categories_created, 1);
        assert_eq!(summary.expenses_created, 1);
        assert_eq!(summary.payments_created, 1);

        let category = storage
            .categories
            .get_by_exact_name("New Category")
            .unwrap()
            .unwrap();
        assert_eq!(category.description, "New Description");

        let expense = storage
            .expenses
            .get_by_name(UserId::new(1), "New Expense")
            .unwrap()
            .unwrap();
        assert_eq!(expense.category_id, Some(category.id));
        assert_eq!(expense.frequency, Frequency::Weekly);
        assert_eq!(storage.payments.get_by_expense(expense.id).unwrap().len(), 1);
    }

    #[test]
    fn test_reimport_skips_duplicates_and_their_payments() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));
        let content = sample_document().to_string();

        service.import_str(&content).unwrap();
        let before = counts(&storage);

        let summary = service.import_str(&content).unwrap();
        assert_eq!(summary.expenses_created, 0);
        assert_eq!(summary.expenses_skipped, 1);
        assert_eq!(summary.categories_matched, 1);
        assert_eq!(counts(&storage), before);
    }

    #[test]
    fn test_same_name_different_amount_is_imported() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        ExpenseService::new(&storage, owner)
            .create(CreateExpenseInput::new(
                "New Expense",
                Money::from_cents(15000),
                Frequency::Weekly,
                NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            ))
            .unwrap();

        let summary = ImportService::new(&storage, owner)
            .import_str(&sample_document().to_string())
            .unwrap();
        assert_eq!(summary.expenses_created, 1);
        assert_eq!(storage.expenses.count_by_owner(owner).unwrap(), 2);
    }

    #[test]
    fn test_duplicates_are_per_user() {
        let (_temp_dir, storage) = create_test_storage();
        let content = sample_document().to_string();

        ImportService::new(&storage, UserId::new(1))
            .import_str(&content)
            .unwrap();
        let summary = ImportService::new(&storage, UserId::new(2))
            .import_str(&content)
            .unwrap();

        assert_eq!(summary.expenses_created, 1);
        // Categories are shared, so the second import reuses the first's
        assert_eq!(storage.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_invalid_json_changes_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));
        service.import_str(&sample_document().to_string()).unwrap();
        let before = counts(&storage);

        let err = service.import_str("This is not valid JSON").unwrap_err();
        assert!(matches!(err, UpkeepError::Import(_)));
        assert_eq!(counts(&storage), before);
    }

    #[test]
    fn test_missing_keys_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));

        let err = service
            .import_str(r#"{"categories": []}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing expenses"));
        assert!(service.import_str("[]").is_err());
    }

    #[test]
    fn test_bad_row_rolls_back_everything() {
        let (temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));

        let mut document = sample_document();
        document["expenses"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "name": "Broken",
                "amount": "0.00",
                "frequency": "MONTHLY",
                "due_date": "2026-10-19"
            }));

        let err = service.import_str(&document.to_string()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Broken"));
        assert_eq!(counts(&storage), (0, 0, 0));
        assert!(storage.audit().entries().unwrap().is_empty());

        let reopened =
            Storage::open(UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(counts(&reopened), (0, 0, 0));
    }

    #[test]
    fn test_unknown_frequency_and_bad_date_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));

        let mut document = sample_document();
        document["expenses"][0]["frequency"] = json!("FORTNIGHTLY");
        assert!(service.import_str(&document.to_string()).is_err());

        let mut document = sample_document();
        document["expenses"][0]["due_date"] = json!("19/10/2026");
        assert!(service.import_str(&document.to_string()).is_err());

        assert_eq!(counts(&storage), (0, 0, 0));
    }

    #[test]
    fn test_category_name_fallback_and_numeric_amounts() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let document = json!({
            "categories": [],
            "expenses": [
                {"name": "Water", "amount": 45.5, "category_id": 7,
                 "category_name": "Utilities", "frequency": "quarterly",
                 "due_date": "2026-12-01"},
                {"name": "Misc", "amount": "12", "category_id": null,
                 "category_name": null, "frequency": "YEARLY",
                 "due_date": "2027-01-01", "is_active": false}
            ]
        });

        let summary = ImportService::new(&storage, owner)
            .import_str(&document.to_string())
            .unwrap();
        assert_eq!(summary.expenses_created, 2);
        assert_eq!(summary.categories_created, 1);

        let water = storage.expenses.get_by_name(owner, "Water").unwrap().unwrap();
        assert_eq!(water.amount, Money::from_cents(4550));
        assert!(water.category_id.is_some());

        let all = ExpenseService::new(&storage, owner)
            .list(&ExpenseFilter::new().include_inactive(true))
            .unwrap();
        let misc = all.iter().find(|e| e.name == "Misc").unwrap();
        assert!(!misc.is_active);
        assert_eq!(misc.category_id, None);
    }

    #[test]
    fn test_summary_message() {
        let summary = ImportSummary {
            categories_created: 1,
            categories_matched: 0,
            expenses_created: 2,
            expenses_skipped: 1,
            payments_created: 3,
            source_username: Some("alice".into()),
        };
        assert_eq!(
            summary.message("alice"),
            "Data imported successfully: 2 expense(s) and 3 payment(s) added, \
             1 new category; 1 duplicate expense(s) skipped."
        );
        assert!(summary
            .message("bob")
            .starts_with("Data imported successfully from alice's export: 2 expense(s)"));
    }

    #[test]
    fn test_amount_bounds_and_precision() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage, UserId::new(1));

        for amount in ["90000000000000000", "100000000.00", "10.999", "0.009"] {
            let mut document = sample_document();
            document["expenses"][0]["amount"] = json!(amount);
            let err = service.import_str(&document.to_string()).unwrap_err();
            assert!(err.is_validation(), "{amount}: {err}");
        }

        let mut document = sample_document();
        document["expenses"][0]["payments"][0]["amount_paid"] = json!("1e20");
        assert!(service.import_str(&document.to_string()).is_err());

        assert_eq!(counts(&storage), (0, 0, 0));
    }

    #[test]
    fn test_large_amounts_do_not_break_dashboard() {
        use crate::reports::{DashboardOptions, DashboardReport};
        use crate::services::UserService;

        let (_temp_dir, storage) = create_test_storage();
        let user = UserService::new(&storage).create("alice").unwrap();
        let mut document = sample_document();
        document["expenses"][0]["amount"] = json!("99999999.99");
        document["expenses"][0]["payments"] = json!([]);
        let mut second = document["expenses"][0].clone();
        second["name"] = json!("Second");
        document["expenses"].as_array_mut().unwrap().push(second);

        let summary = ImportService::new(&storage, user.id)
            .import_str(&document.to_string())
            .unwrap();
        assert_eq!(summary.expenses_created, 2);

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let report =
            DashboardReport::generate(&storage, &user, today, DashboardOptions::default())
                .unwrap();
        assert_eq!(report.total_amount, Money::from_cents(19_999_999_998));
    }

    #[test]
    fn test_padded_cli_name_is_a_duplicate() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new(1);
        let created = ExpenseService::new(&storage, owner)
            .create(CreateExpenseInput::new(
                "New Expense ",
                Money::from_cents(20000),
                Frequency::Weekly,
                NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            ))
            .unwrap();
        assert_eq!(created.name, "New Expense");

        let summary = ImportService::new(&storage, owner)
            .import_str(&sample_document().to_string())
            .unwrap();
        assert_eq!(summary.expenses_skipped, 1);
        assert_eq!(storage.expenses.count_by_owner(owner).unwrap(), 1);
    }
}

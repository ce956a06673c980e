//! Dashboard report
//!
//! Per-user summary of active expenses: totals by category, which expenses
//! are already paid for this cycle, what is coming due, and recent payments.
//! Every date comparison uses the single `today` passed to `generate`.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::settings::Settings;
use crate::error::UpkeepResult;
use crate::models::{CategoryId, ExpensePayment, Money, RecurringExpense, User};
use crate::storage::Storage;

/// Label of the synthetic bucket for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Window sizes and list caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Upcoming includes everything due up to `today + upcoming_window_days`
    pub upcoming_window_days: i64,
    /// Payments on or after `today - recent_window_days` count as recent
    pub recent_window_days: i64,
    /// Maximum rows in the upcoming and recent-payment lists
    pub limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            upcoming_window_days: 30,
            recent_window_days: 30,
            limit: 5,
        }
    }
}

impl DashboardOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            upcoming_window_days: settings.upcoming_window_days,
            recent_window_days: settings.recent_window_days,
            limit: settings.dashboard_limit,
        }
    }
}

/// An active expense with its category name and next occurrence
#[derive(Debug, Clone)]
pub struct ExpenseRow {
    pub expense: RecurringExpense,
    pub category_name: Option<String>,
    pub next_due: NaiveDate,
}

/// Sum of active expense amounts for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// `None` for the uncategorized bucket
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub total: Money,
}

/// An expense covered by a recent payment
#[derive(Debug, Clone)]
pub struct SatisfiedExpense {
    pub expense: RecurringExpense,
    pub payment: ExpensePayment,
    pub next_due: NaiveDate,
}

/// An expense due within the upcoming window
#[derive(Debug, Clone)]
pub struct UpcomingExpense {
    pub expense: RecurringExpense,
    pub satisfied: bool,
    /// Next occurrence, only known once the current one is paid
    pub next_due: Option<NaiveDate>,
    /// Due before today and not paid
    pub overdue: bool,
    /// Days from today to the due date; negative when past due
    pub days_until: i64,
}

#[derive(Debug, Clone)]
pub struct RecentPayment {
    pub payment: ExpensePayment,
    pub expense_name: String,
}

/// The dashboard for one user on one day
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub username: String,
    pub today: NaiveDate,
    pub options: DashboardOptions,
    /// Active expenses by due date, then name, then id
    pub expenses: Vec<ExpenseRow>,
    pub category_totals: Vec<CategoryTotal>,
    pub satisfied: Vec<SatisfiedExpense>,
    pub upcoming: Vec<UpcomingExpense>,
    pub recent_payments: Vec<RecentPayment>,
    pub active_count: usize,
    pub total_amount: Money,
}

/// Chart data: parallel label and amount arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    /// Amounts as two-decimal strings
    pub data: Vec<String>,
}

/// Newest payment that covers the expense's current due date
fn qualifying_payment<'p>(
    expense: &RecurringExpense,
    recent: &'p [ExpensePayment],
) -> Option<&'p ExpensePayment> {
    recent.iter().find(|p| {
        p.expense_id == expense.id
            && p.payment_date >= expense.due_date
            && p.amount_paid >= expense.amount
    })
}

impl DashboardReport {
    /// Build the dashboard for `user` as of `today`
    pub fn generate(
        storage: &Storage,
        user: &User,
        today: NaiveDate,
        options: DashboardOptions,
    ) -> UpkeepResult<Self> {
        let all_expenses = storage.expenses.get_by_owner(user.id)?;
        let owned_ids: HashSet<_> = all_expenses.iter().map(|e| e.id).collect();
        let expense_names: HashMap<_, _> = all_expenses
            .iter()
            .map(|e| (e.id, e.name.clone()))
            .collect();

        let active: Vec<RecurringExpense> =
            all_expenses.into_iter().filter(|e| e.is_active).collect();

        let categories = storage.categories.get_all()?;
        let category_names: HashMap<_, _> =
            categories.iter().map(|c| (c.id, c.name.clone())).collect();

        // Category totals, categories in id order, then the uncategorized bucket
        let mut category_totals = Vec::new();
        for category in &categories {
            let total: Money = active
                .iter()
                .filter(|e| e.category_id == Some(category.id))
                .map(|e| e.amount)
                .sum();
            if total.is_positive() {
                category_totals.push(CategoryTotal {
                    category_id: Some(category.id),
                    name: category.name.clone(),
                    total,
                });
            }
        }
        let uncategorized: Money = active
            .iter()
            .filter(|e| e.category_id.is_none())
            .map(|e| e.amount)
            .sum();
        if uncategorized.is_positive() {
            category_totals.push(CategoryTotal {
                category_id: None,
                name: UNCATEGORIZED.to_string(),
                total: uncategorized,
            });
        }

        let recent_cutoff = today - Duration::days(options.recent_window_days);
        let recent: Vec<ExpensePayment> = storage
            .payments
            .get_by_expenses(&owned_ids)?
            .into_iter()
            .filter(|p| p.payment_date >= recent_cutoff)
            .collect();

        let satisfied: Vec<SatisfiedExpense> = active
            .iter()
            .filter_map(|expense| {
                qualifying_payment(expense, &recent).map(|payment| SatisfiedExpense {
                    expense: expense.clone(),
                    payment: payment.clone(),
                    next_due: expense.next_recurrence(today),
                })
            })
            .collect();
        let satisfied_ids: HashSet<_> = satisfied.iter().map(|s| s.expense.id).collect();

        let upcoming_cutoff = today + Duration::days(options.upcoming_window_days);
        let upcoming: Vec<UpcomingExpense> = active
            .iter()
            .filter(|e| e.due_date <= upcoming_cutoff)
            .take(options.limit)
            .map(|expense| {
                let is_satisfied = satisfied_ids.contains(&expense.id);
                UpcomingExpense {
                    expense: expense.clone(),
                    satisfied: is_satisfied,
                    next_due: is_satisfied.then(|| expense.next_recurrence(today)),
                    overdue: !is_satisfied && expense.due_date < today,
                    days_until: (expense.due_date - today).num_days(),
                }
            })
            .collect();

        let recent_payments: Vec<RecentPayment> = recent
            .into_iter()
            .take(options.limit)
            .map(|payment| RecentPayment {
                expense_name: expense_names
                    .get(&payment.expense_id)
                    .cloned()
                    .unwrap_or_default(),
                payment,
            })
            .collect();

        let total_amount: Money = active.iter().map(|e| e.amount).sum();
        let active_count = active.len();

        let expenses = active
            .into_iter()
            .map(|expense| ExpenseRow {
                category_name: expense
                    .category_id
                    .and_then(|id| category_names.get(&id).cloned()),
                next_due: expense.next_recurrence(today),
                expense,
            })
            .collect();

        Ok(Self {
            username: user.username.clone(),
            today,
            options,
            expenses,
            category_totals,
            satisfied,
            upcoming,
            recent_payments,
            active_count,
            total_amount,
        })
    }

    /// Whether an expense is covered for the current cycle
    pub fn is_satisfied(&self, expense: &RecurringExpense) -> bool {
        self.satisfied.iter().any(|s| s.expense.id == expense.id)
    }

    /// Category totals as chart data
    pub fn chart_data(&self) -> ChartData {
        ChartData {
            labels: self.category_totals.iter().map(|t| t.name.clone()).collect(),
            data: self
                .category_totals
                .iter()
                .map(|t| t.total.to_decimal_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::UpkeepPaths;
    use crate::models::{Category, ExpenseId, Frequency, PaymentId, UserId};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = UpkeepPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn days(n: i64) -> NaiveDate {
        today() + Duration::days(n)
    }

    fn user(id: u64, name: &str) -> User {
        User::new(UserId::new(id), name)
    }

    fn add_expense(
        storage: &Storage,
        owner: &User,
        name: &str,
        cents: i64,
        due: NaiveDate,
        category: Option<CategoryId>,
    ) -> RecurringExpense {
        let mut expense = RecurringExpense::new(
            storage.expenses.next_id().unwrap(),
            owner.id,
            name,
            Money::from_cents(cents),
            Frequency::Monthly,
            due,
        );
        expense.category_id = category;
        storage.expenses.upsert(expense.clone()).unwrap();
        expense
    }

    fn pay(storage: &Storage, expense: ExpenseId, date: NaiveDate, cents: i64) -> PaymentId {
        let payment = ExpensePayment::new(
            storage.payments.next_id().unwrap(),
            expense,
            date,
            Money::from_cents(cents),
        );
        storage.payments.upsert(payment.clone()).unwrap();
        payment.id
    }

    fn add_category(storage: &Storage, name: &str) -> CategoryId {
        let category = Category::new(storage.categories.next_id().unwrap(), name);
        storage.categories.upsert(category.clone()).unwrap();
        category.id
    }

    fn generate(storage: &Storage, owner: &User) -> DashboardReport {
        DashboardReport::generate(storage, owner, today(), DashboardOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_dashboard() {
        let (_temp_dir, storage) = create_test_storage();
        let report = generate(&storage, &user(1, "alice"));

        assert!(report.expenses.is_empty());
        assert!(report.category_totals.is_empty());
        assert!(report.upcoming.is_empty());
        assert!(report.recent_payments.is_empty());
        assert_eq!(report.total_amount, Money::zero());
    }

    #[test]
    fn test_category_totals_with_uncategorized_last() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");
        let housing = add_category(&storage, "Housing");
        let utilities = add_category(&storage, "Utilities");
        let _empty = add_category(&storage, "Unused");

        add_expense(&storage, &alice, "Power", 7500, days(5), Some(utilities));
        add_expense(&storage, &alice, "Water", 2500, days(6), Some(utilities));
        add_expense(&storage, &alice, "Rent", 150000, days(10), Some(housing));
        add_expense(&storage, &alice, "Gym", 4000, days(3), None);

        let mut inactive = add_expense(&storage, &alice, "Old", 9900, days(3), Some(housing));
        inactive.is_active = false;
        storage.expenses.upsert(inactive).unwrap();

        let report = generate(&storage, &alice);
        let totals: Vec<_> = report
            .category_totals
            .iter()
            .map(|t| (t.name.as_str(), t.total.cents()))
            .collect();
        assert_eq!(
            totals,
            vec![("Housing", 150000), ("Utilities", 10000), ("Uncategorized", 4000)]
        );
        assert_eq!(report.active_count, 4);
        assert_eq!(report.total_amount, Money::from_cents(164000));
    }

    #[test]
    fn test_upcoming_includes_overdue_and_is_capped() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");

        add_expense(&storage, &alice, "Late", 1000, days(-3), None);
        for i in 0..6 {
            add_expense(&storage, &alice, &format!("Bill {}", i), 1000, days(i + 1), None);
        }
        add_expense(&storage, &alice, "Far", 1000, days(45), None);

        let report = generate(&storage, &alice);
        assert_eq!(report.upcoming.len(), 5);
        assert_eq!(report.upcoming[0].expense.name, "Late");
        assert!(report.upcoming[0].overdue);
        assert_eq!(report.upcoming[0].days_until, -3);
        assert!(report.upcoming.iter().all(|u| u.expense.name != "Far"));
        assert_eq!(report.expenses.len(), 8);
    }

    #[test]
    fn test_satisfied_requires_full_payment_on_or_after_due() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");

        let paid = add_expense(&storage, &alice, "Paid", 5000, days(-5), None);
        pay(&storage, paid.id, days(-4), 5000);

        let short = add_expense(&storage, &alice, "Short", 5000, days(-5), None);
        pay(&storage, short.id, days(-4), 4999);

        let early = add_expense(&storage, &alice, "Early", 5000, days(-5), None);
        pay(&storage, early.id, days(-6), 5000);

        let report = generate(&storage, &alice);
        assert_eq!(report.satisfied.len(), 1);
        assert_eq!(report.satisfied[0].expense.id, paid.id);
        assert_eq!(
            report.satisfied[0].next_due,
            NaiveDate::from_ymd_opt(2026, 11, 14).unwrap()
        );

        let by_name = |name: &str| {
            report
                .upcoming
                .iter()
                .find(|u| u.expense.name == name)
                .unwrap()
                .clone()
        };
        assert!(by_name("Paid").satisfied);
        assert!(!by_name("Paid").overdue);
        assert!(by_name("Paid").next_due.is_some());
        assert!(by_name("Short").overdue);
        assert!(by_name("Early").overdue);
    }

    #[test]
    fn test_satisfied_ignores_payments_outside_window() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");

        let expense = add_expense(&storage, &alice, "Annual", 5000, days(-40), None);
        pay(&storage, expense.id, days(-35), 5000);

        let report = generate(&storage, &alice);
        assert!(report.satisfied.is_empty());
        assert!(report.recent_payments.is_empty());
    }

    #[test]
    fn test_recent_payments_newest_first_and_capped() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");
        let expense = add_expense(&storage, &alice, "Coffee", 500, days(-1), None);

        pay(&storage, expense.id, days(-31), 500);
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(pay(&storage, expense.id, days(-30 + i * 5), 500));
        }

        let report = generate(&storage, &alice);
        assert_eq!(report.recent_payments.len(), 5);
        assert_eq!(report.recent_payments[0].payment.id, ids[5]);
        assert_eq!(report.recent_payments[0].expense_name, "Coffee");
        assert!(report
            .recent_payments
            .windows(2)
            .all(|w| w[0].payment.payment_date >= w[1].payment.payment_date));
    }

    #[test]
    fn test_users_are_isolated() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");
        let bob = user(2, "bob");

        let rent = add_expense(&storage, &alice, "Rent", 100000, days(2), None);
        pay(&storage, rent.id, today(), 100000);

        let report = generate(&storage, &bob);
        assert!(report.expenses.is_empty());
        assert!(report.recent_payments.is_empty());
        assert!(report.category_totals.is_empty());
    }

    #[test]
    fn test_chart_data() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = user(1, "alice");
        let utilities = add_category(&storage, "Utilities");
        add_expense(&storage, &alice, "Power", 7500, days(5), Some(utilities));
        add_expense(&storage, &alice, "Gym", 4000, days(3), None);

        let chart = generate(&storage, &alice).chart_data();
        assert_eq!(chart.labels, vec!["Utilities", "Uncategorized"]);
        assert_eq!(chart.data, vec!["75.00", "40.00"]);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "Utilities");
        assert_eq!(json["data"][1], "40.00");
    }
}

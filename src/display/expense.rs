//! Expense display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use crate::models::{ExpensePayment, Money, RecurringExpense};

use super::render_table;

/// An expense paired with what the list view shows beside it
pub struct ExpenseListItem<'a> {
    pub expense: &'a RecurringExpense,
    pub category_name: Option<&'a str>,
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Frequency")]
    frequency: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Next")]
    next: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub fn format_expense_list(
    items: &[ExpenseListItem<'_>],
    today: NaiveDate,
    currency: &str,
) -> String {
    if items.is_empty() {
        return "No expenses found.".to_string();
    }

    let rows = items
        .iter()
        .map(|item| {
            let e = item.expense;
            ExpenseRow {
                id: e.id.to_string(),
                name: e.name.clone(),
                amount: e.amount.format_with_symbol(currency),
                frequency: e.frequency.label(),
                due: e.due_date.to_string(),
                next: e.next_recurrence(today).to_string(),
                category: item.category_name.unwrap_or("-").to_string(),
                status: if e.is_active { "Active" } else { "Inactive" },
            }
        })
        .collect();

    render_table(rows)
}

/// Full view of one expense with its payment history
pub fn format_expense_details(
    expense: &RecurringExpense,
    category_name: Option<&str>,
    payments: &[ExpensePayment],
    today: NaiveDate,
    currency: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.name));
    output.push_str(&format!("  ID:          {}\n", expense.id));
    output.push_str(&format!(
        "  Amount:      {}\n",
        expense.amount.format_with_symbol(currency)
    ));
    output.push_str(&format!("  Frequency:   {}\n", expense.frequency.label()));
    output.push_str(&format!("  Due date:    {}\n", expense.due_date));
    output.push_str(&format!(
        "  Next due:    {}\n",
        expense.next_recurrence(today)
    ));
    output.push_str(&format!(
        "  Category:    {}\n",
        category_name.unwrap_or("Uncategorized")
    ));
    output.push_str(&format!(
        "  Status:      {}\n",
        if expense.is_active { "Active" } else { "Inactive" }
    ));
    if !expense.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", expense.description));
    }

    output.push('\n');
    if payments.is_empty() {
        output.push_str("No payments recorded.\n");
    } else {
        let total: Money = payments.iter().map(|p| p.amount_paid).sum();
        output.push_str(&format!(
            "Payments ({}, total {}):\n",
            payments.len(),
            total.format_with_symbol(currency)
        ));
        for payment in payments {
            output.push_str(&format!(
                "  {}  {:>12}  {}\n",
                payment.payment_date,
                payment.amount_paid.format_with_symbol(currency),
                payment.notes
            ));
        }
    }

    output
}

//! Payment display formatting

use tabled::Tabled;

use crate::models::ExpensePayment;

use super::render_table;

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Expense")]
    expense: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Payments with the name of the expense each belongs to
pub fn format_payment_list(payments: &[(ExpensePayment, String)], currency: &str) -> String {
    if payments.is_empty() {
        return "No payments found.".to_string();
    }

    let rows = payments
        .iter()
        .map(|(p, expense_name)| PaymentRow {
            id: p.id.to_string(),
            date: p.payment_date.to_string(),
            expense: expense_name.clone(),
            amount: p.amount_paid.format_with_symbol(currency),
            notes: p.notes.clone(),
        })
        .collect();

    render_table(rows)
}

//! Dashboard display formatting

use tabled::Tabled;

use crate::reports::{DashboardReport, UpcomingExpense};

use super::render_table;

#[derive(Tabled)]
struct UpcomingRow {
    #[tabled(rename = "Expense")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Expense")]
    expense: String,
    #[tabled(rename = "Paid")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Tabled)]
struct ActiveRow {
    #[tabled(rename = "Expense")]
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
}

fn upcoming_status(item: &UpcomingExpense) -> String {
    match item.next_due {
        Some(next) if item.satisfied => format!("Paid, next {}", next),
        _ if item.overdue => format!("Overdue {}d", -item.days_until),
        _ if item.days_until == 0 => "Due today".to_string(),
        _ => format!("In {}d", item.days_until),
    }
}

fn section(output: &mut String, title: &str, body: String) {
    output.push('\n');
    output.push_str(title);
    output.push('\n');
    output.push_str(&body);
    output.push('\n');
}

/// Full dashboard text
pub fn format_dashboard(report: &DashboardReport, currency: &str) -> String {
    let mut output = format!("Dashboard for {} on {}\n", report.username, report.today);
    output.push_str(&format!(
        "{} active expense(s), {} total, {} paid this cycle\n",
        report.active_count,
        report.total_amount.format_with_symbol(currency),
        report.satisfied.len()
    ));

    if report.expenses.is_empty() {
        output.push_str("\nNo active expenses. Add one with 'upkeep expense add'.\n");
        return output;
    }

    let upcoming = if report.upcoming.is_empty() {
        "  Nothing due.".to_string()
    } else {
        render_table(
            report
                .upcoming
                .iter()
                .map(|u| UpcomingRow {
                    name: u.expense.name.clone(),
                    amount: u.expense.amount.format_with_symbol(currency),
                    due: u.expense.due_date.to_string(),
                    status: upcoming_status(u),
                })
                .collect(),
        )
    };
    section(
        &mut output,
        &format!("Upcoming (next {} days)", report.options.upcoming_window_days),
        upcoming,
    );

    let totals = render_table(
        report
            .category_totals
            .iter()
            .map(|t| TotalRow {
                name: t.name.clone(),
                total: t.total.format_with_symbol(currency),
            })
            .collect(),
    );
    section(&mut output, "By category", totals);

    let recent = if report.recent_payments.is_empty() {
        "  No payments recorded.".to_string()
    } else {
        render_table(
            report
                .recent_payments
                .iter()
                .map(|r| RecentRow {
                    date: r.payment.payment_date.to_string(),
                    expense: r.expense_name.clone(),
                    amount: r.payment.amount_paid.format_with_symbol(currency),
                    notes: r.payment.notes.clone(),
                })
                .collect(),
        )
    };
    section(
        &mut output,
        &format!("Recent payments (last {} days)", report.options.recent_window_days),
        recent,
    );

    let active = render_table(
        report
            .expenses
            .iter()
            .map(|row| ActiveRow {
                name: row.expense.name.clone(),
                amount: row.expense.amount.format_with_symbol(currency),
                frequency: row.expense.frequency.label(),
                due: row.expense.due_date.to_string(),
                next: row.next_due.to_string(),
                category: row
                    .category_name
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect(),
    );
    section(&mut output, "Active expenses", active);

    output
}

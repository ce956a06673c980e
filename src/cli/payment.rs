//! Payment CLI commands

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_payment_list;
use crate::error::{UpkeepError, UpkeepResult};
use crate::models::{Money, PaymentId, User};
use crate::services::{ExpenseFilter, ExpenseService, PaymentService, RecordPaymentInput};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a payment against an expense
    Record {
        /// Expense name or ID
        expense: String,
        /// Amount paid, defaults to the expense amount
        #[arg(short, long)]
        amount: Option<Money>,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List payments, newest first
    List {
        /// Only payments for this expense (name or ID)
        #[arg(short, long)]
        expense: Option<String>,
        /// Maximum number of payments to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete a payment
    Delete {
        /// Payment ID, e.g. pmt-3
        payment: String,
    },
}

pub fn handle_payment_command(
    storage: &Storage,
    user: &User,
    settings: &Settings,
    today: NaiveDate,
    cmd: PaymentCommands,
) -> UpkeepResult<()> {
    let expenses = ExpenseService::new(storage, user.id);
    let payments = PaymentService::new(storage, user.id);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        PaymentCommands::Record {
            expense,
            amount,
            date,
            notes,
        } => {
            let expense = expenses.require(&expense)?;
            let payment = payments.record(RecordPaymentInput {
                expense_id: expense.id,
                payment_date: date.unwrap_or(today),
                amount_paid: amount.unwrap_or(expense.amount),
                notes,
            })?;
            println!("Recorded: {}", payment.describe(&expense.name));
        }

        PaymentCommands::List { expense, limit } => {
            let names: HashMap<_, _> = expenses
                .list(&ExpenseFilter::new().include_inactive(true))?
                .into_iter()
                .map(|e| (e.id, e.name))
                .collect();

            let list = match expense {
                Some(expense) => payments.list_for_expense(expenses.require(&expense)?.id)?,
                None => payments.list()?,
            };
            let rows: Vec<_> = list
                .into_iter()
                .take(limit)
                .map(|p| {
                    let name = names.get(&p.expense_id).cloned().unwrap_or_default();
                    (p, name)
                })
                .collect();

            println!("{}", format_payment_list(&rows, currency));
        }

        PaymentCommands::Delete { payment } => {
            let id: PaymentId = payment.parse().map_err(|_| {
                UpkeepError::Validation(format!("Invalid payment ID: {}", payment))
            })?;
            let deleted = payments.delete(id)?;
            println!("Deleted payment {}", deleted.id);
        }
    }

    Ok(())
}

//! Expense CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::expense::ExpenseListItem;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::UpkeepResult;
use crate::models::{CategoryId, Frequency, Money, User};
use crate::services::{
    CategoryService, CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput,
};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a recurring expense
    Add {
        /// Expense name
        name: String,
        /// Amount, e.g. "59.99"
        amount: Money,
        /// DAILY, WEEKLY, MONTHLY, QUARTERLY or YEARLY
        #[arg(short, long, default_value = "MONTHLY")]
        frequency: Frequency,
        /// Due date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Create the expense paused
        #[arg(long)]
        inactive: bool,
    },

    /// List expenses
    List {
        /// Include inactive expenses
        #[arg(short, long)]
        all: bool,
        /// Only expenses in this category (name or ID)
        #[arg(short, long, conflicts_with = "uncategorized")]
        category: Option<String>,
        /// Only expenses without a category
        #[arg(long)]
        uncategorized: bool,
        /// Only expenses with this frequency
        #[arg(short, long)]
        frequency: Option<Frequency>,
    },

    /// Show an expense and its payments
    Show {
        /// Expense name or ID
        expense: String,
    },

    /// Change an expense
    Edit {
        /// Expense name or ID
        expense: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        amount: Option<Money>,
        #[arg(short, long)]
        frequency: Option<Frequency>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Category name or ID
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        clear_category: bool,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Resume tracking an expense
    Activate {
        /// Expense name or ID
        expense: String,
    },

    /// Pause an expense; it drops out of the dashboard
    Deactivate {
        /// Expense name or ID
        expense: String,
    },

    /// Delete an expense and its payments
    Delete {
        /// Expense name or ID
        expense: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Show the next due date of an expense
    Next {
        /// Expense name or ID
        expense: String,
        /// Evaluate as of this date instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn resolve_category(storage: &Storage, category: Option<&str>) -> UpkeepResult<Option<CategoryId>> {
    category
        .map(|c| CategoryService::new(storage).require(c).map(|c| c.id))
        .transpose()
}

fn category_name(storage: &Storage, id: Option<CategoryId>) -> UpkeepResult<Option<String>> {
    match id {
        Some(id) => Ok(storage.categories.get(id)?.map(|c| c.name)),
        None => Ok(None),
    }
}

pub fn handle_expense_command(
    storage: &Storage,
    user: &User,
    settings: &Settings,
    today: NaiveDate,
    cmd: ExpenseCommands,
) -> UpkeepResult<()> {
    let service = ExpenseService::new(storage, user.id);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            name,
            amount,
            frequency,
            due,
            category,
            description,
            inactive,
        } => {
            let mut input = CreateExpenseInput::new(name, amount, frequency, due.unwrap_or(today));
            input.category_id = resolve_category(storage, category.as_deref())?;
            input.description = description;
            input.is_active = !inactive;

            let expense = service.create(input)?;
            println!("Created expense: {} ({})", expense.name, expense.id);
            println!(
                "  {} {}, next due {}",
                expense.amount.format_with_symbol(currency),
                expense.frequency.label(),
                expense.next_recurrence(today)
            );
        }

        ExpenseCommands::List {
            all,
            category,
            uncategorized,
            frequency,
        } => {
            let mut filter = ExpenseFilter::new().include_inactive(all);
            if let Some(id) = resolve_category(storage, category.as_deref())? {
                filter = filter.category(id);
            }
            if uncategorized {
                filter = filter.uncategorized();
            }
            if let Some(frequency) = frequency {
                filter = filter.frequency(frequency);
            }

            let expenses = service.list(&filter)?;
            let names: Vec<Option<String>> = expenses
                .iter()
                .map(|e| category_name(storage, e.category_id))
                .collect::<UpkeepResult<_>>()?;
            let items: Vec<ExpenseListItem<'_>> = expenses
                .iter()
                .zip(&names)
                .map(|(expense, name)| ExpenseListItem {
                    expense,
                    category_name: name.as_deref(),
                })
                .collect();

            println!("{}", format_expense_list(&items, today, currency));
        }

        ExpenseCommands::Show { expense } => {
            let expense = service.require(&expense)?;
            let category = category_name(storage, expense.category_id)?;
            let payments = storage.payments.get_by_expense(expense.id)?;
            print!(
                "{}",
                format_expense_details(&expense, category.as_deref(), &payments, today, currency)
            );
        }

        ExpenseCommands::Edit {
            expense,
            name,
            amount,
            frequency,
            due,
            category,
            clear_category,
            description,
        } => {
            let expense = service.require(&expense)?;

            let category_id = if clear_category {
                Some(None)
            } else {
                resolve_category(storage, category.as_deref())?.map(Some)
            };
            let input = UpdateExpenseInput {
                name,
                amount,
                frequency,
                due_date: due,
                category_id,
                description,
            };

            if input.name.is_none()
                && input.amount.is_none()
                && input.frequency.is_none()
                && input.due_date.is_none()
                && input.category_id.is_none()
                && input.description.is_none()
            {
                println!("No changes specified. See 'upkeep expense edit --help'.");
                return Ok(());
            }

            let updated = service.update(expense.id, input)?;
            println!("Updated expense: {}", updated.name);
        }

        ExpenseCommands::Activate { expense } => {
            let expense = service.require(&expense)?;
            let expense = service.set_active(expense.id, true)?;
            println!("Activated: {}", expense.name);
        }

        ExpenseCommands::Deactivate { expense } => {
            let expense = service.require(&expense)?;
            let expense = service.set_active(expense.id, false)?;
            println!("Deactivated: {}", expense.name);
        }

        ExpenseCommands::Delete { expense, force } => {
            let target = service.require(&expense)?;

            if !force {
                let payments = storage.payments.get_by_expense(target.id)?.len();
                println!(
                    "This will delete '{}' and its {} payment(s).",
                    target.name, payments
                );
                println!("To proceed, run again with --force:");
                println!("  upkeep expense delete {} --force", target.id);
                return Ok(());
            }

            let (deleted, payments) = service.delete(target.id)?;
            println!(
                "Deleted expense: {} ({} payment(s) removed)",
                deleted.name,
                payments.len()
            );
        }

        ExpenseCommands::Next { expense, date } => {
            let expense = service.require(&expense)?;
            let as_of = date.unwrap_or(today);
            if !expense.is_active {
                eprintln!("Note: '{}' is inactive", expense.name);
            }
            println!("{}", expense.next_recurrence(as_of));
        }
    }

    Ok(())
}

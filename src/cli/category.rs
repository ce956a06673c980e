//! Category CLI commands
//!
//! Categories are shared between users; expense counts shown here only
//! cover the current user's expenses.

use clap::Subcommand;

use crate::display::{format_category_details, format_category_list};
use crate::error::UpkeepResult;
use crate::models::{CategoryId, User};
use crate::services::{CategoryService, ExpenseFilter, ExpenseService};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category or change its description
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category; its expenses become uncategorized
    Delete {
        /// Category name or ID
        category: String,
    },
}

fn owned_count(storage: &Storage, user: Option<&User>, id: CategoryId) -> UpkeepResult<usize> {
    match user {
        Some(user) => Ok(ExpenseService::new(storage, user.id)
            .list(&ExpenseFilter::new().include_inactive(true).category(id))?
            .len()),
        None => Ok(0),
    }
}

pub fn handle_category_command(
    storage: &Storage,
    user: Option<&User>,
    cmd: CategoryCommands,
) -> UpkeepResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let mut rows = Vec::new();
            for category in service.list()? {
                let count = owned_count(storage, user, category.id)?;
                rows.push((category, count));
            }
            println!("{}", format_category_list(&rows));
        }

        CategoryCommands::Create { name, description } => {
            let category = service.create(&name, &description)?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Show { category } => {
            let category = service.require(&category)?;
            let count = owned_count(storage, user, category.id)?;
            print!("{}", format_category_details(&category, count));
        }

        CategoryCommands::Edit {
            category,
            name,
            description,
        } => {
            let category = service.require(&category)?;

            if name.is_none() && description.is_none() {
                println!("No changes specified. Use --name or --description.");
                return Ok(());
            }

            let updated = service.update(category.id, name.as_deref(), description.as_deref())?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Delete { category } => {
            let category = service.require(&category)?;
            let (deleted, uncategorized) = service.delete(category.id)?;
            println!("Deleted category: {}", deleted.name);
            if uncategorized > 0 {
                println!("  {} expense(s) are now uncategorized", uncategorized);
            }
        }
    }

    Ok(())
}

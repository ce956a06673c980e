//! User CLI commands

use clap::Subcommand;

use crate::config::paths::UpkeepPaths;
use crate::config::settings::Settings;
use crate::display::format_user_list;
use crate::error::UpkeepResult;
use crate::services::UserService;
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Username
        username: String,
        /// Make this the current user
        #[arg(short, long)]
        switch: bool,
    },

    /// List users
    List,

    /// Set the current user
    Switch {
        /// Username or ID
        user: String,
    },

    /// Delete a user with all of their expenses and payments
    Delete {
        /// Username or ID
        user: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a user command; settings change when the current user does
pub fn handle_user_command(
    storage: &Storage,
    paths: &UpkeepPaths,
    settings: &mut Settings,
    cmd: UserCommands,
) -> UpkeepResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add { username, switch } => {
            let user = service.create(&username)?;
            println!("Created user: {} ({})", user.username, user.id);

            if switch || settings.current_user.is_none() {
                settings.current_user = Some(user.username.clone());
                settings.save(paths)?;
                println!("Current user is now '{}'", user.username);
            }
        }

        UserCommands::List => {
            let users = service.list()?;
            println!("{}", format_user_list(&users, settings.current_user.as_deref()));
        }

        UserCommands::Switch { user } => {
            let user = service.require(&user)?;
            settings.current_user = Some(user.username.clone());
            settings.save(paths)?;
            println!("Current user is now '{}'", user.username);
        }

        UserCommands::Delete { user, force } => {
            let target = service.require(&user)?;

            if !force {
                let expenses = storage.expenses.count_by_owner(target.id)?;
                println!(
                    "This will delete '{}' and their {} expense(s) with all payments.",
                    target.username, expenses
                );
                println!("To proceed, run again with --force:");
                println!("  upkeep user delete {} --force", user);
                return Ok(());
            }

            let deletion = service.delete(&user)?;
            println!(
                "Deleted user '{}' ({} expense(s), {} payment(s) removed)",
                deletion.user.username, deletion.expenses_removed, deletion.payments_removed
            );

            let was_current = settings
                .current_user
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(&deletion.user.username));
            if was_current {
                settings.current_user = None;
                settings.save(paths)?;
            }
        }
    }

    Ok(())
}

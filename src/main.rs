use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use upkeep::cli::{
    handle_audit_command, handle_category_command, handle_chart_command, handle_dashboard_command,
    handle_expense_command, handle_export_command, handle_import_command, handle_payment_command,
    handle_user_command, CategoryCommands, ExpenseCommands, ExportFormat, PaymentCommands,
    UserCommands,
};
use upkeep::config::{paths::UpkeepPaths, settings::Settings};
use upkeep::models::User;
use upkeep::services::UserService;
use upkeep::storage::{init::initialize_storage, Storage};

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "UPKEEP_LOG";

#[derive(Parser)]
#[command(
    name = "upkeep",
    version,
    about = "Track recurring bills, their payments and what is coming due",
    long_about = "Upkeep keeps a list of your recurring expenses, records payments \
                  against them and shows a dashboard of upcoming and overdue bills \
                  with totals by category."
)]
struct Cli {
    /// User to act as (defaults to the configured current user)
    #[arg(long, global = true, env = "UPKEEP_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory; with --user, also the first user
    Init,

    /// Show current configuration and paths
    Config,

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Recurring expense management
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Payment management
    #[command(subcommand, alias = "pay")]
    Payment(PaymentCommands),

    /// Show the dashboard (default)
    Dashboard {
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print category totals as chart JSON
    Chart {
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        pretty: bool,
    },

    /// Export your data
    Export {
        /// Output file ('-' for stdout); defaults to a timestamped name
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Import a JSON export into your data
    Import {
        /// Path to the JSON file
        file: PathBuf,
        /// Treat this date as today for the dashboard shown afterwards
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show recent changes
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries for this entity type
        #[arg(short, long)]
        entity: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }
}

fn today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn current_user(storage: &Storage, explicit: Option<&str>, settings: &Settings) -> Result<User> {
    Ok(UserService::new(storage).resolve_current(explicit, settings)?)
}

fn print_config(paths: &UpkeepPaths, settings: &Settings) {
    println!("Upkeep Configuration");
    println!("====================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Settings file:  {}", paths.settings_file().display());
    println!("Data directory: {}", paths.data_dir().display());
    println!("Snapshots:      {}", paths.backup_dir().display());
    println!("Audit log:      {}", paths.audit_log().display());
    println!();
    println!(
        "Current user:   {}",
        settings.current_user.as_deref().unwrap_or("(none)")
    );
    println!("Currency:       {}", settings.currency_symbol);
    println!(
        "Dashboard:      upcoming {} days, recent {} days, {} rows",
        settings.upcoming_window_days, settings.recent_window_days, settings.dashboard_limit
    );
    println!(
        "Snapshots:      keep {} recent, {} monthly{}",
        settings.backup_retention.daily_count,
        settings.backup_retention.monthly_count,
        if settings.backup_before_import {
            ", taken before each import"
        } else {
            " (disabled)"
        }
    );
    println!("Initialized:    {}", paths.is_initialized());
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let explicit_user = cli.user.as_deref();

    let paths = UpkeepPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Config never loads the data files, so paths can be shown for a damaged store
    let command = match cli.command.unwrap_or(Commands::Dashboard { date: None }) {
        Commands::Config => {
            print_config(&paths, &settings);
            return Ok(());
        }
        command => command,
    };

    let storage = Storage::open(paths.clone())?;

    match command {
        Commands::Init => {
            settings = initialize_storage(&paths)?;
            println!("Initialized upkeep at {}", paths.base_dir().display());

            if let Some(name) = explicit_user {
                let service = UserService::new(&storage);
                let user = match service.find(name)? {
                    Some(user) => user,
                    None => {
                        let user = service.create(name)?;
                        println!("Created user: {}", user.username);
                        user
                    }
                };
                settings.current_user = Some(user.username.clone());
                settings.save(&paths)?;
                println!("Current user is now '{}'", user.username);
            }
        }

        Commands::User(cmd) => {
            handle_user_command(&storage, &paths, &mut settings, cmd)?;
        }

        Commands::Category(cmd) => {
            // Categories are shared; managing them works before any user exists
            let user = current_user(&storage, explicit_user, &settings).ok();
            handle_category_command(&storage, user.as_ref(), cmd)?;
        }

        Commands::Expense(cmd) => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_expense_command(&storage, &user, &settings, today(None), cmd)?;
        }

        Commands::Payment(cmd) => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_payment_command(&storage, &user, &settings, today(None), cmd)?;
        }

        Commands::Dashboard { date } => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_dashboard_command(&storage, &user, &settings, today(date))?;
        }

        Commands::Chart { date, pretty } => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_chart_command(&storage, &user, &settings, today(date), pretty)?;
        }

        Commands::Export {
            output,
            format,
            pretty,
        } => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_export_command(&storage, &user, output, format, pretty, today(None))?;
        }

        Commands::Import { file, date } => {
            let user = current_user(&storage, explicit_user, &settings)?;
            handle_import_command(&storage, &paths, &settings, &user, &file, today(date))?;
        }

        Commands::Audit { limit, entity } => {
            handle_audit_command(&storage, limit, entity.as_deref())?;
        }

        Commands::Config => {}
    }

    Ok(())
}

//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Handlers print to
//! stdout and return errors for `main` to report.

pub mod audit;
pub mod category;
pub mod dashboard;
pub mod expense;
pub mod export;
pub mod import;
pub mod payment;
pub mod user;

pub use audit::handle_audit_command;
pub use category::{handle_category_command, CategoryCommands};
pub use dashboard::{handle_chart_command, handle_dashboard_command};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportFormat};
pub use import::{handle_import_command, Flash};
pub use payment::{handle_payment_command, PaymentCommands};
pub use user::{handle_user_command, UserCommands};

//! Display formatting for terminal output
//!
//! List views render through `tabled`; detail views are plain aligned text.

pub mod category;
pub mod dashboard;
pub mod expense;
pub mod payment;
pub mod user;

pub use category::{format_category_details, format_category_list};
pub use dashboard::format_dashboard;
pub use expense::{format_expense_details, format_expense_list};
pub use payment::format_payment_list;
pub use user::format_user_list;

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a rounded table
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

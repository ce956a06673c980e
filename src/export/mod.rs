//! Export module for Upkeep
//!
//! - JSON: the full per-user document, importable with `upkeep import`
//! - CSV: one row per expense, for spreadsheets

pub mod csv;
pub mod json;

pub use self::csv::export_expenses_csv;
pub use self::json::{
    default_export_filename, export_json, ExportDocument, ExportedCategory, ExportedExpense,
    ExportedPayment,
};

//! Reports module for Upkeep
//!
//! The dashboard summary and the chart data derived from it.

pub mod dashboard;

pub use dashboard::{
    CategoryTotal, ChartData, DashboardOptions, DashboardReport, ExpenseRow, RecentPayment,
    SatisfiedExpense, UpcomingExpense, UNCATEGORIZED,
};

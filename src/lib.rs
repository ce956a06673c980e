//! Upkeep - terminal tracker for recurring bills
//!
//! Users record recurring expenses with a cadence (daily through yearly),
//! log payments against them, and get a dashboard of what is coming due,
//! what is already paid for the current cycle, and where the money goes by
//! category. A user's data can be exported to JSON and imported back with
//! duplicate detection.
//!
//! # Architecture
//!
//! - `config`: path resolution and settings
//! - `error`: the `UpkeepError` type
//! - `models`: users, categories, expenses, payments and recurrence
//! - `storage`: JSON file tables with transactional writes
//! - `audit`: append-only log of every change
//! - `services`: validation, ownership scoping and import
//! - `reports`: the dashboard
//! - `export`: JSON and CSV export
//! - `backup`: data snapshots taken before each import
//! - `display` / `cli`: terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use upkeep::config::paths::UpkeepPaths;
//! use upkeep::reports::{DashboardOptions, DashboardReport};
//! use upkeep::services::UserService;
//! use upkeep::storage::Storage;
//!
//! let storage = Storage::open(UpkeepPaths::new()?)?;
//! let user = UserService::new(&storage).require("alice")?;
//! let today = chrono::Local::now().date_naive();
//! let report = DashboardReport::generate(&storage, &user, today, DashboardOptions::default())?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::UpkeepError;

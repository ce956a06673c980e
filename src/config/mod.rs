//! Configuration module for Upkeep
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::UpkeepPaths;
pub use settings::Settings;

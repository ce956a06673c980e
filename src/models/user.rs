//! User model
//!
//! Users own expenses. There is no authentication; a user is selected by
//! name for each invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// Maximum length of a username
pub const USERNAME_MAX: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            created_at: Utc::now(),
        }
    }

    /// Usernames are non-empty, free of whitespace, and at most 150 chars
    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() {
            return Err("Username cannot be empty".into());
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(format!(
                "Username '{}' cannot contain whitespace",
                self.username
            ));
        }
        let len = self.username.chars().count();
        if len > USERNAME_MAX {
            return Err(format!(
                "Username too long ({} chars, max {})",
                len, USERNAME_MAX
            ));
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

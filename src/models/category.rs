//! Category model
//!
//! Categories group expenses for totals. They are shared across users and
//! are optional on an expense.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;

/// Maximum length of a category name
pub const CATEGORY_NAME_MAX: usize = 100;

/// An expense category (e.g., "Utilities", "Rent")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category with a description
    pub fn with_description(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut category = Self::new(id, name);
        category.description = description.into();
        category
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > CATEGORY_NAME_MAX {
            return Err(CategoryValidationError::NameTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Category name too long ({} chars, max {})",
                len, CATEGORY_NAME_MAX
            ),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

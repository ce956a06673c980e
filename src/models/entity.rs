//! The kinds of record upkeep stores

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    User,
    Category,
    Expense,
    Payment,
}

impl Entity {
    pub const ALL: [Entity; 4] = [Self::User, Self::Category, Self::Expense, Self::Payment];

    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Category => "Category",
            Self::Expense => "Expense",
            Self::Payment => "Payment",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts "expense", "Expenses", "categories", ...
impl FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| {
                let singular = e.label().to_lowercase();
                let plural = match e {
                    Self::Category => "categories".to_string(),
                    _ => format!("{}s", singular),
                };
                wanted == singular || wanted == plural
            })
            .ok_or_else(|| {
                format!(
                    "Unknown entity type '{}' (expected user, category, expense or payment)",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_singular_and_plural() {
        assert_eq!("expenses".parse(), Ok(Entity::Expense));
        assert_eq!("Category".parse(), Ok(Entity::Category));
        assert_eq!("categories".parse(), Ok(Entity::Category));
        assert_eq!(" user ".parse(), Ok(Entity::User));
        assert!("widget".parse::<Entity>().is_err());
        assert!("categorie".parse::<Entity>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Entity::Payment).unwrap(), "\"payment\"");
        assert_eq!(Entity::Payment.to_string(), "Payment");
    }
}

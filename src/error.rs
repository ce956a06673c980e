//! Error type shared by every layer of upkeep

use thiserror::Error;

use crate::models::Entity;

pub type UpkeepResult<T> = Result<T, UpkeepError>;

#[derive(Error, Debug)]
pub enum UpkeepError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: Entity, key: String },

    /// Bad user input: amounts, names, dates
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active user. Pass --user, set UPKEEP_USER, or run 'upkeep user switch <name>'")]
    NoActiveUser,

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    /// Data files that cannot be read, parsed or written
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl UpkeepError {
    pub fn not_found(entity: Entity, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn duplicate(entity: Entity, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for UpkeepError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UpkeepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_name_the_entity() {
        let err = UpkeepError::not_found(Entity::Expense, "Rent");
        assert_eq!(err.to_string(), "Expense not found: Rent");
        assert!(err.is_not_found());
        assert!(!err.is_validation());

        let err = UpkeepError::duplicate(Entity::User, "alice");
        assert_eq!(err.to_string(), "User already exists: alice");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(UpkeepError::from(io), UpkeepError::Io(msg) if msg == "denied"));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(UpkeepError::from(json), UpkeepError::Json(_)));
    }

    #[test]
    fn test_no_active_user_suggests_a_fix() {
        assert!(UpkeepError::NoActiveUser.to_string().contains("--user"));
    }
}

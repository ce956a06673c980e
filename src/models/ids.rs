//! Strongly-typed ID wrappers for all entity types
//!
//! IDs are sequential integers assigned by the repositories. Using newtype
//! wrappers prevents accidentally mixing up IDs from different entity types at
//! compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw numeric id
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Get the raw numeric id
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// The id following this one
            pub const fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(CategoryId, "cat-");
define_id!(ExpenseId, "exp-");
define_id!(PaymentId, "pmt-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(CategoryId::new(3).to_string(), "cat-3");
        assert_eq!(ExpenseId::new(12).to_string(), "exp-12");
    }

    #[test]
    fn test_id_parse_with_and_without_prefix() {
        assert_eq!("7".parse::<ExpenseId>().unwrap(), ExpenseId::new(7));
        assert_eq!("exp-7".parse::<ExpenseId>().unwrap(), ExpenseId::new(7));
        assert!("cat-7".parse::<ExpenseId>().is_err());
        assert!("Rent".parse::<ExpenseId>().is_err());
    }

    #[test]
    fn test_id_serialization() {
        let id = PaymentId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: PaymentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_next() {
        assert_eq!(UserId::new(1).next(), UserId::new(2));
    }
}

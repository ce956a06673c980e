//! Recurrence cadence of an expense

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a recurring expense comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// All frequencies in cadence order
    pub fn all() -> &'static [Self] {
        &[
            Self::Daily,
            Self::Weekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Yearly,
        ]
    }

    /// Stored code, e.g. "MONTHLY"
    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Human label, e.g. "Monthly"
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    /// Parses codes and labels case-insensitively ("MONTHLY", "monthly")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|f| f.code().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownFrequency(needle.to_string()))
    }
}

/// Error for a frequency code that matches no cadence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrequency(pub String);

impl fmt::Display for UnknownFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown frequency '{}' (expected DAILY, WEEKLY, MONTHLY, QUARTERLY or YEARLY)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFrequency {}

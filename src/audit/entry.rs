//! One line of the audit log

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::UpkeepResult;
use crate::models::Entity;

use super::diff::changed_fields;

/// What happened to the record, with its state on either side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Change {
    Create {
        after: Value,
    },
    Update {
        before: Value,
        after: Value,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<String>,
    },
    Delete {
        before: Value,
    },
}

impl Change {
    pub fn created<T: Serialize>(record: &T) -> UpkeepResult<Self> {
        Ok(Self::Create {
            after: serde_json::to_value(record)?,
        })
    }

    pub fn updated<T: Serialize>(before: &T, after: &T) -> UpkeepResult<Self> {
        let before = serde_json::to_value(before)?;
        let after = serde_json::to_value(after)?;
        let fields = changed_fields(&before, &after);
        Ok(Self::Update {
            before,
            after,
            fields,
        })
    }

    pub fn deleted<T: Serialize>(record: &T) -> UpkeepResult<Self> {
        Ok(Self::Delete {
            before: serde_json::to_value(record)?,
        })
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "created",
            Self::Update { .. } => "updated",
            Self::Delete { .. } => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub entity: Entity,
    /// Display id, e.g. "exp-12"
    pub id: String,
    /// Expense name, username, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Shared by every entry one transaction wrote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<Uuid>,
    #[serde(flatten)]
    pub change: Change,
}

impl AuditEntry {
    pub fn new(
        entity: Entity,
        id: impl fmt::Display,
        label: Option<String>,
        change: Change,
    ) -> Self {
        Self {
            at: Utc::now(),
            entity,
            id: id.to_string(),
            label,
            batch: None,
            change,
        }
    }

    pub fn in_batch(self, batch: Uuid) -> Self {
        Self {
            batch: Some(batch),
            ..self
        }
    }
}

/// `2026-10-19 14:30:22  Expense exp-7 (Internet) updated [batch 1a2b3c4d]`,
/// followed by one indented line per changed field
impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {} {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.entity,
            self.id
        )?;
        if let Some(label) = &self.label {
            write!(f, " ({})", label)?;
        }
        write!(f, " {}", self.change.verb())?;
        if let Some(batch) = self.batch {
            let short = batch.simple().to_string();
            write!(f, " [batch {}]", &short[..8])?;
        }
        if let Change::Update { fields, .. } = &self.change {
            for field in fields {
                write!(f, "\n    {}", field)?;
            }
        }
        Ok(())
    }
}

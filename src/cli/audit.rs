//! Audit log command

use crate::error::{UpkeepError, UpkeepResult};
use crate::models::Entity;
use crate::storage::Storage;

pub fn handle_audit_command(
    storage: &Storage,
    limit: usize,
    entity: Option<&str>,
) -> UpkeepResult<()> {
    let entity = entity
        .map(|name| name.parse::<Entity>().map_err(UpkeepError::Validation))
        .transpose()?;

    let entries = storage.audit().tail(limit, entity)?;
    if entries.is_empty() {
        println!("No audit entries.");
    }
    for entry in entries {
        println!("{}", entry);
    }
    Ok(())
}

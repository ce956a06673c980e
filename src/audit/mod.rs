//! Audit log
//!
//! Every create, update and delete is appended to `audit.log` with the record
//! as it was before and after. Changes made inside a storage transaction are
//! held back until commit and share a batch id, so an import shows up as one
//! group and a rolled-back import leaves no trace.

mod diff;
mod entry;
mod logger;

pub use diff::changed_fields;
pub use entry::{AuditEntry, Change};
pub use logger::AuditLog;

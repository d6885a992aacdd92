//! Audit bounded context: append-only trail entries and field diffs.

mod diff;
mod entry;

pub use diff::{changed_fields, FieldChange};
pub use entry::{AuditAction, AuditLogEntry, CriticalAuditEntry, RequestContext};

//! Audit logging
//!
//! Records create, update, and delete operations with before/after values
//! in an append-only JSONL log.
//!
//! - `AuditEntry`: one log entry with timestamp, operation, entity
//!   information, and optional before/after values.
//! - `AuditLogger`: writes entries to the log file, one JSON object per
//!   line.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;

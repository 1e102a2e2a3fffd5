//! # Validated Record Schemas
//!
//! Concrete schemas for the four document kinds the remote store serves.
//! The store itself is schemaless; every document entering the core passes
//! through a `from_doc` decoder here, so required fields are enforced and
//! optional fields take their documented defaults exactly once, at the
//! boundary.
//!
//! Record sequences delivered by the store are newest-first. Decoders do
//! not re-sort.

mod base;
mod battle;
mod notification;
mod profile;

pub use base::{BaseRecord, Pathogen, PathogenKind};
pub use battle::{BattleOutcome, BattleRecord};
pub use notification::NotificationRecord;
pub use profile::{ProfileSnapshot, Resources};

use crate::errors::Result;

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// Record constructors use this for creation timestamps; decoders never
/// call it (remote documents carry their own timestamps).
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Decode a whole document sequence, failing on the first bad document.
///
/// Used by remote-source adapters that receive query snapshots as arrays
/// of loosely-typed documents.
pub fn decode_all<T, F>(docs: Vec<serde_json::Value>, decode: F) -> Result<Vec<T>>
where
    F: Fn(serde_json::Value) -> Result<T>,
{
    docs.into_iter().map(decode).collect()
}

//! # Player Profile Snapshot

use serde::{Deserialize, Serialize};

use crate::errors::{ImmunoError, Result};
use crate::identifiers::UserId;

/// Spendable resources attached to a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    /// Energy used to launch attacks
    #[serde(default)]
    pub energy: u32,
    /// Bio-material used to research antibodies
    #[serde(default)]
    pub bio_material: u32,
}

/// One snapshot of the player's profile document
///
/// The profile source emits `Option<ProfileSnapshot>`: `None` means the
/// identity exists but no profile document has been created yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    /// Owning player (required)
    pub id: UserId,
    /// Display name shown on screens (required)
    pub display_name: String,
    /// Spendable resources; zeroed when the document omits them
    #[serde(default)]
    pub resources: Resources,
    /// Immune-memory research level; new players start at 0
    #[serde(default)]
    pub immune_memory_level: u32,
    /// Creation time, ms since epoch (required)
    pub created_at_ms: i64,
    /// Last update time; defaults to creation time when omitted
    #[serde(default)]
    pub updated_at_ms: i64,
}

impl ProfileSnapshot {
    /// Decode a loosely-typed remote document into a validated snapshot.
    ///
    /// Missing or mistyped required fields (`id`, `displayName`,
    /// `createdAtMs`) are an [`ImmunoError::Invalid`]. `updatedAtMs`
    /// falls back to `createdAtMs` when absent.
    pub fn from_doc(doc: serde_json::Value) -> Result<Self> {
        let mut snapshot: Self = serde_json::from_value(doc)
            .map_err(|e| ImmunoError::invalid(format!("profile document: {e}")))?;
        if snapshot.updated_at_ms == 0 {
            snapshot.updated_at_ms = snapshot.created_at_ms;
        }
        Ok(snapshot)
    }
}

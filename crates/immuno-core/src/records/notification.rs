//! # Notification Records

use serde::{Deserialize, Serialize};

use crate::errors::{ImmunoError, Result};
use crate::identifiers::NotificationId;
use crate::records::now_ms;

/// An in-game notification with a read/unread flag
///
/// Notification sequences from the store are newest-first; the derived
/// `latest` value is simply the first element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Notification identifier (required)
    pub id: NotificationId,
    /// Short headline (required)
    pub title: String,
    /// Full message body (required)
    pub body: String,
    /// Whether the player has opened it; unread when the doc omits it
    #[serde(default)]
    pub read: bool,
    /// Creation time, ms since epoch (required)
    pub created_at_ms: i64,
}

impl NotificationRecord {
    /// Create a fresh unread notification stamped with the current time.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            title: title.into(),
            body: body.into(),
            read: false,
            created_at_ms: now_ms(),
        }
    }

    /// Decode a loosely-typed remote document into a validated record.
    pub fn from_doc(doc: serde_json::Value) -> Result<Self> {
        serde_json::from_value(doc)
            .map_err(|e| ImmunoError::invalid(format!("notification document: {e}")))
    }
}

//! # Battle History Records

use serde::{Deserialize, Serialize};

use crate::errors::{ImmunoError, Result};
use crate::identifiers::BattleId;

/// Final result of a fought battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleOutcome {
    /// The player's antibodies cleared the base
    Victory,
    /// The garrison held
    Defeat,
    /// Both sides exhausted
    Draw,
}

/// One fought battle in the player's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    /// Battle identifier (required)
    pub id: BattleId,
    /// Name of the base that was attacked (required)
    pub enemy_base_name: String,
    /// Final outcome (required)
    pub outcome: BattleOutcome,
    /// Credits actually earned; zero on defeat unless the doc says otherwise
    #[serde(default)]
    pub reward_credits: u32,
    /// When the battle was fought, ms since epoch (required)
    pub fought_at_ms: i64,
    /// Generated battle chronicle, absent until the narrator produced one
    #[serde(default)]
    pub chronicle: Option<String>,
}

impl BattleRecord {
    /// Decode a loosely-typed remote document into a validated record.
    pub fn from_doc(doc: serde_json::Value) -> Result<Self> {
        serde_json::from_value(doc)
            .map_err(|e| ImmunoError::invalid(format!("battle document: {e}")))
    }
}

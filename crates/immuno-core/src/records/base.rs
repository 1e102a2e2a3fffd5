//! # Enemy Base Records

use serde::{Deserialize, Serialize};

use crate::errors::{ImmunoError, Result};
use crate::identifiers::BaseId;

/// Pathogen family, determines which antibodies counter it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathogenKind {
    /// Fast attackers with low hit points
    Virus,
    /// Durable mid-tier units
    Bacteria,
    /// Slow units with high hit points
    Fungus,
}

/// One defending unit inside an enemy base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pathogen {
    /// Unit name shown in battle reports
    pub name: String,
    /// Pathogen family
    pub kind: PathogenKind,
    /// Remaining hit points
    pub hit_points: u32,
}

/// An attackable enemy viral base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRecord {
    /// Base identifier (required)
    pub id: BaseId,
    /// Name of the opposing player or AI threat (required)
    pub enemy_name: String,
    /// Difficulty rating used for matchmaking display
    #[serde(default)]
    pub threat_level: u32,
    /// Credits awarded on victory
    #[serde(default)]
    pub reward_credits: u32,
    /// Defending units; an undefended base decodes to an empty garrison
    #[serde(default)]
    pub pathogens: Vec<Pathogen>,
    /// Creation time, ms since epoch (required)
    pub created_at_ms: i64,
}

impl BaseRecord {
    /// Decode a loosely-typed remote document into a validated record.
    pub fn from_doc(doc: serde_json::Value) -> Result<Self> {
        serde_json::from_value(doc)
            .map_err(|e| ImmunoError::invalid(format!("base document: {e}")))
    }
}

//! Core identifier types used across the ImmunoWarriors client
//!
//! Opaque UUID newtypes for the entities the remote document store keys:
//! players, enemy bases, fought battles, and notifications. Identities are
//! value-shaped; absence of a [`UserId`] is a valid state, not an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ImmunoError;

fn parse_prefixed(s: &str, prefix: &str, kind: &str) -> Result<Uuid, ImmunoError> {
    let bare = s.strip_prefix(prefix).unwrap_or(s);
    Uuid::parse_str(bare).map_err(|e| ImmunoError::invalid(format!("malformed {kind} id: {e}")))
}

/// Authenticated player identifier
///
/// Present or absent; the reactive layer treats absence as a terminal
/// substitute-value state rather than a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ImmunoError;

    /// Parse from a `Display` rendering or a bare UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(s, "user-", "user").map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Enemy viral-base identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BaseId(pub Uuid);

impl BaseId {
    /// Create a new random base ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base-{}", self.0)
    }
}

impl FromStr for BaseId {
    type Err = ImmunoError;

    /// Parse from a `Display` rendering or a bare UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(s, "base-", "base").map(Self)
    }
}

impl From<Uuid> for BaseId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<BaseId> for Uuid {
    fn from(id: BaseId) -> Self {
        id.0
    }
}

/// Fought-battle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BattleId(pub Uuid);

impl BattleId {
    /// Create a new random battle ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "battle-{}", self.0)
    }
}

impl FromStr for BattleId {
    type Err = ImmunoError;

    /// Parse from a `Display` rendering or a bare UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(s, "battle-", "battle").map(Self)
    }
}

impl From<Uuid> for BattleId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<BattleId> for Uuid {
    fn from(id: BattleId) -> Self {
        id.0
    }
}

/// Notification identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Create a new random notification ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = ImmunoError;

    /// Parse from a `Display` rendering or a bare UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(s, "notification-", "notification").map(Self)
    }
}

impl From<Uuid> for NotificationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<NotificationId> for Uuid {
    fn from(id: NotificationId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let uuid = Uuid::nil();
        assert!(UserId::from_uuid(uuid).to_string().starts_with("user-"));
        assert!(BaseId::from_uuid(uuid).to_string().starts_with("base-"));
        assert!(BattleId::from_uuid(uuid).to_string().starts_with("battle-"));
        assert!(NotificationId::from_uuid(uuid)
            .to_string()
            .starts_with("notification-"));
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = UserId::new();
        assert_eq!(UserId::from_uuid(id.uuid()), id);
    }

    #[test]
    fn test_display_from_str_round_trip() {
        let user = UserId::new();
        assert_eq!(user.to_string().parse::<UserId>().unwrap(), user);

        let base = BaseId::new();
        assert_eq!(base.to_string().parse::<BaseId>().unwrap(), base);

        let battle = BattleId::new();
        assert_eq!(battle.to_string().parse::<BattleId>().unwrap(), battle);

        let notification = NotificationId::new();
        assert_eq!(
            notification
                .to_string()
                .parse::<NotificationId>()
                .unwrap(),
            notification
        );
    }

    #[test]
    fn test_from_str_accepts_bare_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(
            uuid.to_string().parse::<UserId>().unwrap(),
            UserId::from_uuid(uuid)
        );
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        let err = "user-not-a-uuid".parse::<UserId>().unwrap_err();
        assert!(matches!(err, ImmunoError::Invalid { .. }));
        assert!("".parse::<BattleId>().is_err());
    }
}

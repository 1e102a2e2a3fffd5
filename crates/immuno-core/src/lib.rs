//! ImmunoWarriors Core - Domain Foundation
//!
//! This crate provides the pure domain layer shared by every frontend of the
//! ImmunoWarriors client: identifier newtypes, validated record schemas for
//! the data the remote document store serves, and the unified error type.
//!
//! It contains no async runtime coupling and no I/O. The reactive bindings
//! that stream these records live in `immuno-app`.
//!
//! # Record Kinds
//!
//! - [`records::ProfileSnapshot`]: the player's profile and resources
//! - [`records::BaseRecord`]: an attackable enemy viral base
//! - [`records::BattleRecord`]: one fought battle and its outcome
//! - [`records::NotificationRecord`]: an in-game notification with a
//!   read/unread flag
//!
//! All records decode from loosely-typed remote documents through
//! `from_doc`, which enforces required fields and applies documented
//! defaults at the boundary rather than trusting shapes ad hoc downstream.

#![forbid(unsafe_code)]

/// User, base, battle, and notification identifiers
pub mod identifiers;

/// Validated record schemas for remote documents
pub mod records;

/// Unified error handling
pub mod errors;

pub use errors::{ImmunoError, Result};
pub use identifiers::{BaseId, BattleId, NotificationId, UserId};

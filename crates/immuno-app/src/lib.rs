//! ImmunoWarriors App - Portable Headless Application Core
//!
//! This crate is the reactive state-binding layer every ImmunoWarriors
//! frontend consumes. It owns no UI: it turns remote document sources into
//! identity-gated push streams, folds them into derived UI scalars, and
//! mediates the generative-text service behind a keyed, timeout-guarded
//! action cache.
//!
//! # Architecture
//!
//! - [`sources`]: boundary contracts — the [`sources::DataSource`] document
//!   store trait, the `SourceStream` item type, and the identity channel.
//! - [`gate`]: the identity gate — substitutes a default while no player is
//!   signed in, owns at most one live remote subscription per identity.
//! - [`derived`]: pure derived values (`unread_count`,
//!   `latest_notification`) with an explicit last-error side channel.
//! - [`actions`]: per-key memoized async actions with a deadline race,
//!   deterministic fallbacks, and scoped invalidation timers.
//! - [`narrative`]: the generative-text mediator ("battle chronicles",
//!   "tactical advice") built on the action cache.
//! - [`app`]: the [`app::AppCore`] dependency-injection facade frontends
//!   construct once per session.
//!
//! # Error Philosophy
//!
//! Nothing here surfaces an error to a screen. Absent identity substitutes
//! a defined value; source failures fold into error values but stay
//! observable through [`derived::Derived::last_error`]; generative calls
//! always eventually produce a string, falling back deterministically on
//! timeout or failure.
//!
//! Binding constructors spawn forwarding tasks and therefore must be called
//! from within a tokio runtime.

#![forbid(unsafe_code)]

pub mod actions;
pub mod app;
pub mod derived;
pub mod gate;
pub mod narrative;
pub mod sources;

pub use app::{AppConfig, AppCore};
pub use derived::Derived;
pub use sources::{DataSource, IdentityHandle, SourceStream};

//! # Application Core
//!
//! The dependency-injection context a frontend constructs once per
//! session: collaborators come in through the constructor, never through
//! ambient global lookups, so tests assemble an `AppCore` from fakes the
//! same way production assembles one from real clients.
//!
//! Every binding this facade hands out is identity-gated: while no player
//! is signed in the binding yields its documented substitute (no profile,
//! empty lists, zero unread) and holds no remote subscription at all.
//! Constructing a binding subscribes; dropping it tears the subscription
//! down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use immuno_core::records::{BaseRecord, BattleRecord, NotificationRecord, ProfileSnapshot};
use immuno_core::UserId;

use crate::derived::{self, Derived};
use crate::gate;
use crate::narrative::{
    Narrator, NarrativeService, ADVICE_DEADLINE, ADVICE_INVALIDATION_DELAY, CHRONICLE_DEADLINE,
};
use crate::sources::{DataSource, SourceStream};

/// Timing configuration for the narrative mediator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Deadline for the tactical-advice remote race.
    pub advice_deadline: Duration,
    /// Standalone forced-invalidation delay for advice entries.
    pub advice_invalidation_delay: Duration,
    /// Deadline for the battle-chronicle remote race.
    pub chronicle_deadline: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            advice_deadline: ADVICE_DEADLINE,
            advice_invalidation_delay: ADVICE_INVALIDATION_DELAY,
            chronicle_deadline: CHRONICLE_DEADLINE,
        }
    }
}

/// The headless application core frontends consume.
pub struct AppCore {
    data: Arc<dyn DataSource>,
    narrator: Narrator,
    identity: watch::Receiver<Option<UserId>>,
}

impl AppCore {
    /// Assemble a core from its collaborators.
    ///
    /// The identity receiver usually comes from
    /// [`IdentityHandle`](crate::sources::IdentityHandle), whose sender
    /// side stays with the authentication layer.
    pub fn new(
        config: AppConfig,
        data: Arc<dyn DataSource>,
        narrative: Arc<dyn NarrativeService>,
        identity: watch::Receiver<Option<UserId>>,
    ) -> Self {
        Self {
            data,
            narrator: Narrator::new(
                narrative,
                config.advice_deadline,
                config.advice_invalidation_delay,
                config.chronicle_deadline,
            ),
            identity,
        }
    }

    /// Current identity, readable synchronously.
    pub fn identity(&self) -> Option<UserId> {
        *self.identity.borrow()
    }

    /// Identity-gated profile stream; `None` while signed out or before a
    /// profile document exists.
    pub fn profile_updates(&self) -> SourceStream<Option<ProfileSnapshot>> {
        let data = Arc::clone(&self.data);
        gate::from_identity(self.identity.clone(), None, move |user| {
            data.profile(&user)
        })
    }

    /// Identity-gated enemy-base stream; empty while signed out.
    pub fn base_updates(&self) -> SourceStream<Vec<BaseRecord>> {
        let data = Arc::clone(&self.data);
        gate::from_identity(self.identity.clone(), Vec::new(), move |user| {
            data.bases(&user)
        })
    }

    /// Identity-gated battle-history stream; empty while signed out.
    pub fn battle_updates(&self) -> SourceStream<Vec<BattleRecord>> {
        let data = Arc::clone(&self.data);
        gate::from_identity(self.identity.clone(), Vec::new(), move |user| {
            data.battles(&user)
        })
    }

    /// Identity-gated notification stream; empty while signed out.
    pub fn notification_updates(&self) -> SourceStream<Vec<NotificationRecord>> {
        let data = Arc::clone(&self.data);
        gate::from_identity(self.identity.clone(), Vec::new(), move |user| {
            data.notifications(&user)
        })
    }

    /// Unread-notification count over the gated notification stream.
    pub fn unread_count(&self) -> Derived<usize> {
        derived::unread_count(self.notification_updates())
    }

    /// Most recent notification over the gated notification stream.
    pub fn latest_notification(&self) -> Derived<Option<NotificationRecord>> {
        derived::latest_notification(self.notification_updates())
    }

    /// The generative-text mediator.
    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }
}

//! # Narrative Mediator
//!
//! Thin orchestration over the generative-text service: battle chronicles
//! and tactical advice, each memoized per request payload in the action
//! cache and raced against a deadline. Frontends get a string every time,
//! never an error — on timeout or failure the request's own deterministic
//! fallback text stands in.
//!
//! Tactical advice carries two distinct timers: the 5-second remote race
//! inside the cache, and a separate standalone 6-second invalidation that
//! forces a fresh generation for the next request. They are different
//! mechanisms with different owners and must not be collapsed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use immuno_core::records::{BattleOutcome, BattleRecord};
use immuno_core::{ImmunoError, Result};

use crate::actions::{ActionCache, ActionOutcome, InvalidationGuard};

/// Deadline for the tactical-advice remote race.
pub const ADVICE_DEADLINE: Duration = Duration::from_secs(5);

/// Standalone forced-invalidation delay for a tactical-advice entry.
/// Independent of and longer than [`ADVICE_DEADLINE`].
pub const ADVICE_INVALIDATION_DELAY: Duration = Duration::from_secs(6);

/// Deadline for the battle-chronicle remote race.
pub const CHRONICLE_DEADLINE: Duration = Duration::from_secs(8);

/// The generative-text boundary.
///
/// Implementations may fail or hang indefinitely; the mediator never
/// assumes bounded latency from them.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    /// Generate a battle chronicle for a fought battle.
    async fn battle_chronicle(&self, request: &ChronicleRequest) -> Result<String>;

    /// Generate tactical advice for the player's current situation.
    async fn tactical_advice(&self, request: &AdviceRequest) -> Result<String>;
}

/// Payload for a battle-chronicle generation. Structural equality is the
/// cache key: the same battle asked twice joins the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChronicleRequest {
    /// Name of the base that was attacked.
    pub enemy_base_name: String,
    /// How the battle ended.
    pub outcome: BattleOutcome,
    /// Credits earned.
    pub reward_credits: u32,
}

impl ChronicleRequest {
    /// Build a request from a battle history record.
    pub fn from_battle(battle: &BattleRecord) -> Self {
        Self {
            enemy_base_name: battle.enemy_base_name.clone(),
            outcome: battle.outcome,
            reward_credits: battle.reward_credits,
        }
    }

    /// Deterministic fallback chronicle, a pure function of the payload.
    pub fn fallback_text(&self) -> String {
        match self.outcome {
            BattleOutcome::Victory => format!(
                "Your antibodies swept through {} and left no pathogen standing. \
                 The organism is safe, for now.",
                self.enemy_base_name
            ),
            BattleOutcome::Defeat => format!(
                "The garrison of {} held against every wave. Your forces retreat \
                 to the lymph nodes to regroup.",
                self.enemy_base_name
            ),
            BattleOutcome::Draw => format!(
                "Neither side prevailed at {}. Both armies withdraw, exhausted \
                 and unbeaten.",
                self.enemy_base_name
            ),
        }
    }
}

/// Payload for a tactical-advice generation. Structural equality is the
/// cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AdviceRequest {
    /// The opposing base under consideration, when one is targeted.
    pub enemy_base: Option<String>,
    /// Its threat level, when known.
    pub threat_level: Option<u32>,
}

impl AdviceRequest {
    /// Deterministic fallback advice, a pure function of the payload:
    /// names the opposing base when the payload names one, otherwise a
    /// fixed generic line.
    pub fn fallback_text(&self) -> String {
        match &self.enemy_base {
            Some(name) => format!(
                "Probe {name}'s weakest pathogen first and commit your \
                 antibodies in short waves.",
            ),
            None => {
                "Scan a nearby base, reinforce your immune memory, and attack \
                 when your energy is full."
                    .to_string()
            }
        }
    }
}

/// Cache key across both narrative kinds; one cache serves the mediator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NarrativeKey {
    Chronicle(ChronicleRequest),
    Advice(AdviceRequest),
}

/// The generative-text mediator owned by the app core.
pub struct Narrator {
    service: Arc<dyn NarrativeService>,
    cache: Arc<ActionCache<NarrativeKey>>,
    advice_deadline: Duration,
    advice_invalidation_delay: Duration,
    chronicle_deadline: Duration,
}

impl Narrator {
    /// Create a mediator with explicit timings (see [`crate::AppConfig`]).
    pub fn new(
        service: Arc<dyn NarrativeService>,
        advice_deadline: Duration,
        advice_invalidation_delay: Duration,
        chronicle_deadline: Duration,
    ) -> Self {
        Self {
            service,
            cache: Arc::new(ActionCache::new()),
            advice_deadline,
            advice_invalidation_delay,
            chronicle_deadline,
        }
    }

    /// Create a mediator with the default 5s/6s/8s timings.
    pub fn with_defaults(service: Arc<dyn NarrativeService>) -> Self {
        Self::new(
            service,
            ADVICE_DEADLINE,
            ADVICE_INVALIDATION_DELAY,
            CHRONICLE_DEADLINE,
        )
    }

    /// Generate (or join) the chronicle for a battle. Always a string.
    pub async fn battle_chronicle(&self, request: ChronicleRequest) -> ActionOutcome {
        let service = Arc::clone(&self.service);
        let fallback = request.fallback_text();
        let key = NarrativeKey::Chronicle(request.clone());
        self.cache
            .invoke(
                key,
                move || async move { service.battle_chronicle(&request).await }.boxed(),
                self.chronicle_deadline,
                fallback,
            )
            .await
    }

    /// Generate (or join) tactical advice. Always a string.
    pub async fn tactical_advice(&self, request: AdviceRequest) -> ActionOutcome {
        let service = Arc::clone(&self.service);
        let fallback = request.fallback_text();
        let key = NarrativeKey::Advice(request.clone());
        self.cache
            .invoke(
                key,
                move || async move { service.tactical_advice(&request).await }.boxed(),
                self.advice_deadline,
                fallback,
            )
            .await
    }

    /// Arm the standalone advice invalidation for `request`.
    ///
    /// Screens showing advice hold the guard for their own lifetime: after
    /// the delay the cached entry is discarded whatever its state, so the
    /// next request generates fresh advice. Dropping the guard (screen
    /// dismissed) cancels the timer.
    pub fn schedule_advice_refresh(&self, request: &AdviceRequest) -> InvalidationGuard {
        Arc::clone(&self.cache).schedule_invalidation(
            NarrativeKey::Advice(request.clone()),
            self.advice_invalidation_delay,
        )
    }

    /// Discard the cached chronicle for a battle, forcing regeneration.
    pub fn invalidate_chronicle(&self, request: &ChronicleRequest) -> bool {
        self.cache
            .invalidate(&NarrativeKey::Chronicle(request.clone()))
    }

    /// Discard the cached advice for a request, forcing regeneration.
    pub fn invalidate_advice(&self, request: &AdviceRequest) -> bool {
        self.cache.invalidate(&NarrativeKey::Advice(request.clone()))
    }

    /// Remote calls abandoned after their deadline, for operators/tests.
    pub fn orphaned_calls(&self) -> u64 {
        self.cache.orphaned_calls()
    }
}

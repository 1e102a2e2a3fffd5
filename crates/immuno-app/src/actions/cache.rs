//! # Action Cache with Timeout Fallback
//!
//! A single-slot memoized future per key: the first `invoke` for a key
//! starts the remote call and races it against a deadline; every
//! concurrent or later `invoke` with an equal key joins the same shared
//! outcome instead of issuing a duplicate call. Entries stay settled until
//! explicitly invalidated.
//!
//! The external contract is "always eventually a string, never an error":
//! remote failure and deadline expiry both fold into the caller-supplied
//! fallback, distinguished only by [`Resolution`].
//!
//! A timed-out remote call is not cancelled. It is abandoned-and-tracked:
//! a detached task awaits its eventual fate, logs it, and bumps the
//! orphan counter, so leaked calls are accounted for rather than silently
//! forgotten.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use immuno_core::ImmunoError;

use crate::actions::timer::InvalidationGuard;

/// How an action's observable outcome was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The remote call produced a value before the deadline.
    Settled,
    /// The deadline elapsed first; the text is the fallback.
    TimedOut,
    /// The remote call failed before the deadline; the text is the fallback.
    Failed,
}

/// The always-available result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Generated text, or the deterministic fallback.
    pub text: String,
    /// How the text was produced.
    pub resolution: Resolution,
}

impl ActionOutcome {
    /// Whether the text is a fallback rather than remote content.
    pub fn is_fallback(&self) -> bool {
        self.resolution != Resolution::Settled
    }
}

type SharedAction = Shared<BoxFuture<'static, ActionOutcome>>;

/// Per-key memoized async actions with a deadline race.
pub struct ActionCache<K> {
    entries: Mutex<HashMap<K, SharedAction>>,
    // Own allocation: detached tracking tasks hold it without extending
    // the cache's lifetime.
    orphaned: Arc<AtomicU64>,
}

impl<K> Default for ActionCache<K> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            orphaned: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<K> ActionCache<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run (or join) the action for `key`.
    ///
    /// Idempotent per key: while an entry exists, `remote_call` is not
    /// invoked again and every caller observes the identical outcome. The
    /// race starts when the first caller begins awaiting.
    pub async fn invoke<F>(
        &self,
        key: K,
        remote_call: F,
        deadline: Duration,
        fallback: String,
    ) -> ActionOutcome
    where
        F: FnOnce() -> BoxFuture<'static, Result<String, ImmunoError>>,
    {
        let shared = {
            let mut entries = self.entries.lock();
            if let Some(existing) = entries.get(&key) {
                tracing::debug!("action cache hit, joining in-flight or settled entry");
                existing.clone()
            } else {
                let orphaned = Arc::clone(&self.orphaned);
                let action = run_action(remote_call(), deadline, fallback, orphaned)
                    .boxed()
                    .shared();
                entries.insert(key, action.clone());
                action
            }
        };
        shared.await
    }

    /// Discard the entry for `key`, whatever its state. The next `invoke`
    /// starts a fresh remote call. Returns whether an entry existed.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            tracing::debug!("action cache entry invalidated");
        }
        removed
    }

    /// Number of remote calls abandoned after their deadline elapsed.
    pub fn orphaned_calls(&self) -> u64 {
        self.orphaned.load(Ordering::Relaxed)
    }

    /// Number of live (pending or settled) entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K> ActionCache<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Schedule a one-shot forced invalidation of `key` after `delay`.
    ///
    /// The timer fires regardless of the entry's state at that moment.
    /// Dropping the returned guard before the delay elapses cancels the
    /// timer unconditionally; the cache is held weakly, so a timer can
    /// never keep a dead cache alive or fire against one.
    pub fn schedule_invalidation(self: Arc<Self>, key: K, delay: Duration) -> InvalidationGuard {
        let cache = Arc::downgrade(&self);
        InvalidationGuard::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(cache) = Weak::upgrade(&cache) {
                cache.invalidate(&key);
            }
        })
    }
}

async fn run_action(
    call: BoxFuture<'static, Result<String, ImmunoError>>,
    deadline: Duration,
    fallback: String,
    orphaned: Arc<AtomicU64>,
) -> ActionOutcome {
    let mut in_flight = tokio::spawn(call);

    match tokio::time::timeout(deadline, &mut in_flight).await {
        Ok(Ok(Ok(text))) => ActionOutcome {
            text,
            resolution: Resolution::Settled,
        },
        Ok(Ok(Err(error))) => {
            tracing::warn!(%error, "remote call failed before deadline, using fallback");
            ActionOutcome {
                text: fallback,
                resolution: Resolution::Failed,
            }
        }
        Ok(Err(join_error)) => {
            tracing::warn!(%join_error, "remote call task aborted, using fallback");
            ActionOutcome {
                text: fallback,
                resolution: Resolution::Failed,
            }
        }
        Err(_elapsed) => {
            orphaned.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                deadline_ms = deadline.as_millis() as u64,
                "deadline elapsed, abandoning in-flight remote call"
            );
            // Abandon-and-track: the call keeps running detached; its
            // eventual fate is logged but can no longer affect the
            // observable outcome.
            tokio::spawn(async move {
                match in_flight.await {
                    Ok(Ok(_late_text)) => {
                        tracing::debug!("orphaned remote call settled after deadline, ignored");
                    }
                    Ok(Err(error)) => {
                        tracing::debug!(%error, "orphaned remote call failed after deadline");
                    }
                    Err(join_error) => {
                        tracing::warn!(%join_error, "orphaned remote call task aborted");
                    }
                }
            });
            ActionOutcome {
                text: fallback,
                resolution: Resolution::TimedOut,
            }
        }
    }
}

//! # Scoped Invalidation Timers
//!
//! A one-shot timer bound to an owning scope. The guard aborts its task
//! when dropped, on every exit path, so a timer can never outlive the
//! scope that scheduled it. Aborting an already-fired timer is a no-op.

use std::future::Future;

use tokio::task::JoinHandle;

/// Scope handle for a scheduled one-shot invalidation.
///
/// Hold it for as long as the invalidation should remain armed; drop it
/// to cancel. Created via
/// [`ActionCache::schedule_invalidation`](crate::actions::ActionCache::schedule_invalidation).
#[derive(Debug)]
pub struct InvalidationGuard {
    handle: JoinHandle<()>,
}

impl InvalidationGuard {
    pub(crate) fn spawn<F>(timer: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(timer),
        }
    }

    /// Whether the timer has already fired (or been cancelled).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel explicitly. Equivalent to dropping the guard.
    pub fn cancel(self) {}
}

impl Drop for InvalidationGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::ActionCache;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::time::Duration;

    async fn settle_entry(cache: &Arc<ActionCache<&'static str>>, key: &'static str) {
        let outcome = cache
            .invoke(
                key,
                || async { Ok("settled text".to_string()) }.boxed(),
                Duration::from_secs(5),
                "fallback".to_string(),
            )
            .await;
        assert!(!outcome.is_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_and_forces_invalidation() {
        let cache = Arc::new(ActionCache::new());
        settle_entry(&cache, "advice").await;
        assert_eq!(cache.len(), 1);

        let guard = Arc::clone(&cache).schedule_invalidation("advice", Duration::from_secs(6));
        tokio::time::sleep(Duration::from_secs(7)).await;

        assert!(cache.is_empty());
        assert!(guard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_guard_never_fires() {
        let cache = Arc::new(ActionCache::new());
        settle_entry(&cache, "advice").await;

        let guard = Arc::clone(&cache).schedule_invalidation("advice", Duration::from_secs(6));
        drop(guard);

        // Well past the original delay: the entry must be untouched.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_against_pending_entry() {
        let cache: Arc<ActionCache<&str>> = Arc::new(ActionCache::new());

        // An entry that will stay pending far beyond the timer.
        let cache_clone = Arc::clone(&cache);
        let pending = tokio::spawn(async move {
            cache_clone
                .invoke(
                    "advice",
                    || {
                        async {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                            Ok("too late".to_string())
                        }
                        .boxed()
                    },
                    Duration::from_secs(7200),
                    "fallback".to_string(),
                )
                .await
        });

        tokio::task::yield_now().await;
        assert_eq!(cache.len(), 1);

        let _guard = Arc::clone(&cache).schedule_invalidation("advice", Duration::from_secs(6));
        tokio::time::sleep(Duration::from_secs(10)).await;

        // Entry discarded while still pending; the joined caller keeps its
        // shared future, but the next invoke starts fresh.
        assert!(cache.is_empty());
        pending.abort();
    }
}

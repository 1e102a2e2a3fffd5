//! # Keyed Async Actions
//!
//! One-shot asynchronous computations memoized per key, raced against a
//! wall-clock deadline with a guaranteed deterministic fallback, plus the
//! scoped invalidation timers that supervise cache entries from the
//! outside.

mod cache;
mod timer;

pub use cache::{ActionCache, ActionOutcome, Resolution};
pub use timer::InvalidationGuard;

//! # Identity Gate
//!
//! Derives a gated [`SourceStream`] from the identity channel: while no
//! player is signed in, the gate emits a substitute value and holds no
//! remote subscription at all; once an identity appears, it subscribes
//! through the supplied factory and forwards every inner item in arrival
//! order.
//!
//! Invariants:
//!
//! - `when_absent` is emitted exactly once per signed-out period.
//! - At most one inner subscription is live at any instant; it is dropped
//!   before the gate reacts to any identity transition.
//! - The forwarding task exits when the consumer drops the gated stream or
//!   the identity channel closes, dropping the inner subscription with it.

use futures::StreamExt;
use tokio::sync::{mpsc, watch};

use immuno_core::UserId;

use crate::sources::{from_channel, SourceStream};

/// Buffer between the forwarding task and the consumer.
///
/// Small on purpose: backpressure pauses forwarding rather than queueing
/// unbounded state the consumer will never render.
const GATE_BUFFER: usize = 16;

/// Gate a source behind the identity channel.
///
/// `when_present` is invoked once per sign-in to open the real remote
/// subscription for that player. See the module docs for the emission
/// contract.
pub fn from_identity<T, F>(
    identity: watch::Receiver<Option<UserId>>,
    when_absent: T,
    when_present: F,
) -> SourceStream<T>
where
    T: Clone + Send + 'static,
    F: FnMut(UserId) -> SourceStream<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(GATE_BUFFER);
    tokio::spawn(forward(identity, when_absent, when_present, tx));
    from_channel(rx)
}

/// The gate's forwarding loop. One task per gated stream.
async fn forward<T, F>(
    mut identity: watch::Receiver<Option<UserId>>,
    when_absent: T,
    mut when_present: F,
    tx: mpsc::Sender<Result<T, immuno_core::ImmunoError>>,
) where
    T: Clone + Send + 'static,
    F: FnMut(UserId) -> SourceStream<T> + Send + 'static,
{
    let mut absent_announced = false;

    loop {
        let current = *identity.borrow_and_update();
        match current {
            None => {
                if !absent_announced {
                    if tx.send(Ok(when_absent.clone())).await.is_err() {
                        return;
                    }
                    absent_announced = true;
                }
                tokio::select! {
                    () = tx.closed() => return,
                    changed = identity.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
            Some(user) => {
                absent_announced = false;
                tracing::debug!(%user, "identity present, opening remote subscription");
                let mut inner = when_present(user);
                loop {
                    tokio::select! {
                        () = tx.closed() => return,
                        changed = identity.changed() => {
                            match changed {
                                // Drop the inner subscription before
                                // re-evaluating the new identity.
                                Ok(()) => break,
                                Err(_) => return,
                            }
                        }
                        item = inner.next() => {
                            match item {
                                Some(item) => {
                                    if tx.send(item).await.is_err() {
                                        return;
                                    }
                                }
                                None => {
                                    // Inner source ended on its own; stay
                                    // subscribed-less until identity moves.
                                    drop(inner);
                                    tokio::select! {
                                        () = tx.closed() => return,
                                        changed = identity.changed() => {
                                            match changed {
                                                Ok(()) => break,
                                                Err(_) => return,
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

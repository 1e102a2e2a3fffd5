//! # Boundary Contracts for Remote Sources
//!
//! The core never talks to the document store directly; it consumes
//! [`SourceStream`]s from a [`DataSource`] implementation injected at
//! construction. Failures travel *on* the stream as items, so a stream
//! survives a failed query and can keep emitting afterwards.
//!
//! Identity is a `tokio::sync::watch` channel: the current value is
//! readable synchronously, at most one identity is present at a time, and
//! every binding observes sign-in/sign-out transitions through its own
//! receiver clone.

use std::pin::Pin;

use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

use immuno_core::records::{BaseRecord, BattleRecord, NotificationRecord, ProfileSnapshot};
use immuno_core::{ImmunoError, UserId};

/// A push-based sequence of values from a remote collaborator.
///
/// `Err` items are failure signals, not termination: the stream may emit
/// again after one. The stream ends only when the underlying subscription
/// is torn down.
pub type SourceStream<T> = Pin<Box<dyn Stream<Item = Result<T, ImmunoError>> + Send>>;

/// Adapt a bounded channel receiver into a [`SourceStream`].
///
/// The standard way for `DataSource` implementations (and test fakes) to
/// hand out subscriptions: dropping the returned stream drops the
/// receiver, which the producing side observes as unsubscription.
pub fn from_channel<T: Send + 'static>(
    receiver: mpsc::Receiver<Result<T, ImmunoError>>,
) -> SourceStream<T> {
    Box::pin(ReceiverStream::new(receiver))
}

/// The remote document store boundary, one stream per document kind.
///
/// Implementations must tolerate repeated subscribe/unsubscribe cycles as
/// identity toggles, and must surface query failures as `Err` items rather
/// than panicking or ending the stream.
pub trait DataSource: Send + Sync + 'static {
    /// Stream of the player's profile document; `Ok(None)` means the
    /// identity exists but no profile has been created yet.
    fn profile(&self, user: &UserId) -> SourceStream<Option<ProfileSnapshot>>;

    /// Stream of scannable enemy bases, newest-first.
    fn bases(&self, user: &UserId) -> SourceStream<Vec<BaseRecord>>;

    /// Stream of the player's battle history, newest-first.
    fn battles(&self, user: &UserId) -> SourceStream<Vec<BattleRecord>>;

    /// Stream of the player's notifications, newest-first.
    fn notifications(&self, user: &UserId) -> SourceStream<Vec<NotificationRecord>>;
}

/// Sender side of the identity channel.
///
/// The authentication layer owns one of these; the core only ever holds
/// receivers. Transitions are deduplicated, so re-announcing the same
/// identity does not tear down live subscriptions.
#[derive(Debug)]
pub struct IdentityHandle {
    sender: watch::Sender<Option<UserId>>,
}

impl IdentityHandle {
    /// Create an identity channel starting in the signed-out state.
    pub fn new() -> (Self, watch::Receiver<Option<UserId>>) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, receiver)
    }

    /// Create an identity channel already signed in as `user`.
    pub fn signed_in(user: UserId) -> (Self, watch::Receiver<Option<UserId>>) {
        let (sender, receiver) = watch::channel(Some(user));
        (Self { sender }, receiver)
    }

    /// Announce a signed-in player. No-op if `user` is already current.
    pub fn sign_in(&self, user: UserId) {
        self.sender.send_if_modified(|current| {
            if *current == Some(user) {
                false
            } else {
                *current = Some(user);
                true
            }
        });
    }

    /// Announce sign-out. No-op if already signed out.
    pub fn sign_out(&self) {
        self.sender.send_if_modified(|current| {
            if current.is_none() {
                false
            } else {
                *current = None;
                true
            }
        });
    }

    /// Current identity, readable synchronously.
    pub fn current(&self) -> Option<UserId> {
        *self.sender.borrow()
    }

    /// A fresh receiver observing the current value and future transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}

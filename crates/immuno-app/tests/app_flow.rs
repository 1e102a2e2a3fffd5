//! End-to-end flows through `AppCore` with in-memory collaborators:
//! sign-in/sign-out cycles over gated bindings, and the generative-text
//! deadline race observed from the outside.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use immuno_app::narrative::{AdviceRequest, NarrativeService};
use immuno_app::sources::{from_channel, DataSource, IdentityHandle, SourceStream};
use immuno_app::{AppConfig, AppCore, Derived};
use immuno_core::records::{
    BaseRecord, BattleRecord, NotificationRecord, ProfileSnapshot, Resources,
};
use immuno_core::{ImmunoError, Result, UserId};

// =============================================================================
// In-memory collaborators
// =============================================================================

/// One document kind: remembers the latest item and replays it to new
/// subscribers, like a remote snapshot listener does.
struct Feed<T> {
    current: Mutex<Option<std::result::Result<T, ImmunoError>>>,
    subscribers: Mutex<Vec<mpsc::Sender<std::result::Result<T, ImmunoError>>>>,
}

impl<T: Clone + Send + 'static> Feed<T> {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn subscribe(&self) -> SourceStream<T> {
        let (tx, rx) = mpsc::channel(16);
        if let Some(current) = self.current.lock().clone() {
            tx.try_send(current).expect("fresh channel has capacity");
        }
        self.subscribers.lock().push(tx);
        from_channel(rx)
    }

    fn push(&self, item: std::result::Result<T, ImmunoError>) {
        *self.current.lock() = Some(item.clone());
        self.subscribers
            .lock()
            .retain(|tx| tx.try_send(item.clone()).is_ok());
    }

    fn live_subscribers(&self) -> usize {
        let mut subs = self.subscribers.lock();
        subs.retain(|tx| !tx.is_closed());
        subs.len()
    }
}

struct FakeStore {
    profile: Feed<Option<ProfileSnapshot>>,
    bases: Feed<Vec<BaseRecord>>,
    battles: Feed<Vec<BattleRecord>>,
    notifications: Feed<Vec<NotificationRecord>>,
}

impl FakeStore {
    fn new() -> Self {
        Self {
            profile: Feed::new(),
            bases: Feed::new(),
            battles: Feed::new(),
            notifications: Feed::new(),
        }
    }
}

impl DataSource for FakeStore {
    fn profile(&self, _user: &UserId) -> SourceStream<Option<ProfileSnapshot>> {
        self.profile.subscribe()
    }

    fn bases(&self, _user: &UserId) -> SourceStream<Vec<BaseRecord>> {
        self.bases.subscribe()
    }

    fn battles(&self, _user: &UserId) -> SourceStream<Vec<BattleRecord>> {
        self.battles.subscribe()
    }

    fn notifications(&self, _user: &UserId) -> SourceStream<Vec<NotificationRecord>> {
        self.notifications.subscribe()
    }
}

/// Generative service with fixed latency and a canned answer.
struct FakeNarrative {
    latency: Duration,
    answer: &'static str,
}

#[async_trait]
impl NarrativeService for FakeNarrative {
    async fn battle_chronicle(
        &self,
        _request: &immuno_app::narrative::ChronicleRequest,
    ) -> Result<String> {
        tokio::time::sleep(self.latency).await;
        Ok(self.answer.to_string())
    }

    async fn tactical_advice(&self, _request: &AdviceRequest) -> Result<String> {
        tokio::time::sleep(self.latency).await;
        Ok(self.answer.to_string())
    }
}

fn app_with(
    store: Arc<FakeStore>,
    latency: Duration,
    answer: &'static str,
) -> (AppCore, IdentityHandle) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let (handle, identity) = IdentityHandle::new();
    let core = AppCore::new(
        AppConfig::default(),
        store,
        Arc::new(FakeNarrative { latency, answer }),
        identity,
    );
    (core, handle)
}

fn unread_note(title: &str) -> NotificationRecord {
    NotificationRecord::new(title, "body")
}

async fn next_value<R: Clone>(handle: &mut Derived<R>) -> R {
    assert!(handle.changed().await, "derived fold ended unexpectedly");
    handle.get()
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test]
async fn unread_count_follows_sign_in_cycle() {
    let store = Arc::new(FakeStore::new());
    let (core, auth) = app_with(Arc::clone(&store), Duration::ZERO, "unused");

    let mut unread = core.unread_count();

    // Signed out: the substitute empty list derives to zero, and the
    // store has never been queried.
    assert_eq!(next_value(&mut unread).await, 0);
    assert_eq!(store.notifications.live_subscribers(), 0);

    // Sign in: the store already holds two unread notifications.
    store
        .notifications
        .push(Ok(vec![unread_note("a"), unread_note("b")]));
    auth.sign_in(UserId::new());
    assert_eq!(next_value(&mut unread).await, 2);
    assert_eq!(store.notifications.live_subscribers(), 1);

    // A read-flag update propagates.
    let mut notes = vec![unread_note("a"), unread_note("b")];
    notes[0].read = true;
    store.notifications.push(Ok(notes));
    assert_eq!(next_value(&mut unread).await, 1);

    // Sign out: back to the substitute, subscription torn down.
    auth.sign_out();
    assert_eq!(next_value(&mut unread).await, 0);
    assert_eq!(store.notifications.live_subscribers(), 0);
}

#[tokio::test]
async fn profile_stream_substitutes_none_while_signed_out() {
    let store = Arc::new(FakeStore::new());
    let (core, auth) = app_with(Arc::clone(&store), Duration::ZERO, "unused");

    let mut profiles = core.profile_updates();
    assert!(profiles.next().await.unwrap().unwrap().is_none());

    let user = UserId::new();
    store.profile.push(Ok(Some(ProfileSnapshot {
        id: user,
        display_name: "Commander".to_string(),
        resources: Resources {
            energy: 50,
            bio_material: 10,
        },
        immune_memory_level: 3,
        created_at_ms: 1,
        updated_at_ms: 1,
    })));
    auth.sign_in(user);

    let snapshot = profiles.next().await.unwrap().unwrap().unwrap();
    assert_eq!(snapshot.display_name, "Commander");
}

#[tokio::test]
async fn source_failure_reaches_derived_side_channel() {
    let store = Arc::new(FakeStore::new());
    let (core, auth) = app_with(Arc::clone(&store), Duration::ZERO, "unused");

    let mut unread = core.unread_count();
    assert_eq!(next_value(&mut unread).await, 0);

    auth.sign_in(UserId::new());
    store.notifications.push(Ok(vec![unread_note("a")]));
    assert_eq!(next_value(&mut unread).await, 1);

    store
        .notifications
        .push(Err(ImmunoError::network("listener dropped")));
    assert_eq!(next_value(&mut unread).await, 0);
    assert_matches!(unread.last_error(), Some(ImmunoError::Network { .. }));
}

#[tokio::test(start_paused = true)]
async fn slow_advice_yields_fallback_not_late_answer() {
    let store = Arc::new(FakeStore::new());
    let (core, _auth) = app_with(store, Duration::from_secs(7), "X");

    let request = AdviceRequest {
        enemy_base: Some("Necrovirus Prime".to_string()),
        threat_level: Some(7),
    };
    let outcome = core.narrator().tactical_advice(request.clone()).await;

    assert!(outcome.is_fallback());
    assert_eq!(outcome.text, request.fallback_text());
    assert_ne!(outcome.text, "X");
    assert_eq!(core.narrator().orphaned_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn fast_advice_yields_remote_answer() {
    let store = Arc::new(FakeStore::new());
    let (core, _auth) = app_with(store, Duration::from_secs(2), "Y");

    let outcome = core
        .narrator()
        .tactical_advice(AdviceRequest::default())
        .await;

    assert!(!outcome.is_fallback());
    assert_eq!(outcome.text, "Y");
    assert_eq!(core.narrator().orphaned_calls(), 0);
}

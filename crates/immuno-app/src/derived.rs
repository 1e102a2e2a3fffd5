//! # Derived Values
//!
//! Pure, synchronous recomputations over the latest complete emission of a
//! source stream. A derived value never propagates a source failure: the
//! failure folds into a caller-supplied error value, and the error itself
//! is parked on an explicit side channel so persistent upstream trouble
//! stays distinguishable from "legitimately empty".
//!
//! The fold observes every source item in arrival order; the handle itself
//! is last-value-wins, like any watch.

use futures::StreamExt;
use tokio::sync::watch;

use immuno_core::records::NotificationRecord;
use immuno_core::ImmunoError;

use crate::sources::SourceStream;

/// Read handle for a derived value.
///
/// Cheap to clone; every clone observes the same underlying fold. Dropping
/// all handles tears down the fold task and its source subscription.
#[derive(Debug, Clone)]
pub struct Derived<R> {
    value: watch::Receiver<R>,
    last_error: watch::Receiver<Option<ImmunoError>>,
}

impl<R: Clone> Derived<R> {
    /// Current derived value, synchronously.
    pub fn get(&self) -> R {
        self.value.borrow().clone()
    }

    /// Wait for the next recomputation. Returns `false` once the fold has
    /// ended (source exhausted and task gone).
    pub async fn changed(&mut self) -> bool {
        self.value.changed().await.is_ok()
    }

    /// The most recent source failure, if the value currently reflects
    /// one. Cleared by the next successful emission.
    pub fn last_error(&self) -> Option<ImmunoError> {
        self.last_error.borrow().clone()
    }
}

/// Reactively fold a source stream into a derived value.
///
/// - Before the first item: `loading_value`.
/// - On `Ok(t)`: `map(t)`, clearing the error side channel.
/// - On `Err(e)`: `error_value`, recording `e` on the side channel.
///
/// `map` must be pure and total over everything the source can emit,
/// including empty sequences.
pub fn derive<T, R, F>(
    mut source: SourceStream<T>,
    loading_value: R,
    error_value: R,
    map: F,
) -> Derived<R>
where
    T: Send + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(T) -> R + Send + 'static,
{
    let (value_tx, value_rx) = watch::channel(loading_value);
    let (error_tx, error_rx) = watch::channel(None);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = value_tx.closed() => return,
                item = source.next() => match item {
                    Some(Ok(input)) => {
                        error_tx.send_replace(None);
                        if value_tx.send(map(input)).is_err() {
                            return;
                        }
                    }
                    Some(Err(error)) => {
                        tracing::warn!(%error, "source failure folded into error value");
                        error_tx.send_replace(Some(error));
                        if value_tx.send(error_value.clone()).is_err() {
                            return;
                        }
                    }
                    None => return,
                },
            }
        }
    });

    Derived {
        value: value_rx,
        last_error: error_rx,
    }
}

/// Count of unread notifications. Loading and failure both read as 0.
pub fn unread_count(source: SourceStream<Vec<NotificationRecord>>) -> Derived<usize> {
    derive(source, 0, 0, |notes| {
        notes.iter().filter(|note| !note.read).count()
    })
}

/// Most recent notification, or `None` while loading, on failure, or for
/// an empty sequence. Sequences are newest-first, so this is the head.
pub fn latest_notification(
    source: SourceStream<Vec<NotificationRecord>>,
) -> Derived<Option<NotificationRecord>> {
    derive(source, None, None, |notes| notes.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::from_channel;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    fn note(title: &str, read: bool) -> NotificationRecord {
        NotificationRecord {
            read,
            ..NotificationRecord::new(title, "body")
        }
    }

    async fn settled<R: Clone>(handle: &mut Derived<R>) -> R {
        assert!(handle.changed().await, "fold ended unexpectedly");
        handle.get()
    }

    #[tokio::test]
    async fn test_loading_value_before_first_emission() {
        let (_tx, rx) = mpsc::channel(4);
        let handle = unread_count(from_channel(rx));
        assert_eq!(handle.get(), 0);
        assert!(handle.last_error().is_none());
    }

    #[tokio::test]
    async fn test_unread_count_over_sequences() {
        let (tx, rx) = mpsc::channel(4);
        let mut handle = unread_count(from_channel(rx));

        tx.send(Ok(vec![note("a", false), note("b", true), note("c", false)]))
            .await
            .unwrap();
        assert_eq!(settled(&mut handle).await, 2);

        tx.send(Ok(Vec::new())).await.unwrap();
        assert_eq!(settled(&mut handle).await, 0);
    }

    #[tokio::test]
    async fn test_latest_notification_is_head_or_none() {
        let (tx, rx) = mpsc::channel(4);
        let mut handle = latest_notification(from_channel(rx));

        let newest = note("newest", false);
        tx.send(Ok(vec![newest.clone(), note("older", true)]))
            .await
            .unwrap();
        assert_eq!(settled(&mut handle).await.unwrap().title, newest.title);

        tx.send(Ok(Vec::new())).await.unwrap();
        assert!(settled(&mut handle).await.is_none());
    }

    #[tokio::test]
    async fn test_failure_folds_to_error_value_with_side_channel() {
        let (tx, rx) = mpsc::channel(4);
        let mut handle = unread_count(from_channel(rx));

        tx.send(Ok(vec![note("a", false)])).await.unwrap();
        assert_eq!(settled(&mut handle).await, 1);

        tx.send(Err(ImmunoError::network("query failed")))
            .await
            .unwrap();
        assert_eq!(settled(&mut handle).await, 0);
        assert_matches!(handle.last_error(), Some(ImmunoError::Network { .. }));

        // Next good emission clears the side channel.
        tx.send(Ok(vec![note("a", false)])).await.unwrap();
        assert_eq!(settled(&mut handle).await, 1);
        assert!(handle.last_error().is_none());
    }

    #[tokio::test]
    async fn test_fold_observes_every_item_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let mut handle = unread_count(from_channel(rx));

        for unread in 1..=3usize {
            let notes = (0..unread).map(|i| note(&format!("n{i}"), false)).collect();
            tx.send(Ok(notes)).await.unwrap();
            assert_eq!(settled(&mut handle).await, unread);
        }
    }
}

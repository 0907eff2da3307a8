//! Change bus
//!
//! Hot multicast of changed keys. Every subscriber owns an unbounded queue
//! and receives every key published after it subscribed, in publish order.
//! Nothing is buffered for future subscribers: a key published before
//! [`ChangeBus::subscribe`] returns is never seen by that subscriber.
//!
//! Dropping a [`KeyChanges`] unsubscribes it; its queue is pruned on the next
//! publish. Other subscribers are unaffected.

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_util::stream::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::observability::Event;

/// Multicast publisher of changed keys, scoped to one orchestrator
#[derive(Debug, Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<String>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It sees every key published from now on.
    pub fn subscribe(&self) -> KeyChanges {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        KeyChanges { rx }
    }

    /// Deliver `key` to every live subscriber, returning how many received it
    pub fn publish(&self, key: &str) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(key.to_string()).is_ok());
        let delivered = subscribers.len();
        debug!(event = %Event::ChangePublished, key, subscribers = delivered, "change published");
        delivered
    }

    /// Number of subscribers still registered. Dropped subscribers are
    /// counted until the next publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<String>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One subscription to a [`ChangeBus`]
///
/// Also a [`Stream`] of keys. The stream ends once the bus is dropped and
/// every queued key has been yielded.
#[derive(Debug)]
pub struct KeyChanges {
    rx: mpsc::UnboundedReceiver<String>,
}

impl KeyChanges {
    /// Wait for the next changed key
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Take the next changed key if one is already queued
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Stream for KeyChanges {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.rx.poll_recv(cx)
    }
}

//! Multicast event channel
//!
//! This module provides the publish/subscribe primitive behind the
//! identity streams. A channel fans every published event out to all
//! subscribers that exist at publish time. There is no replay: a
//! subscriber created after an event was published never sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use uuid::Uuid;

/// Default number of undelivered events a subscriber may fall behind by.
pub const DEFAULT_CAPACITY: usize = 64;

/// Event channel error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// Every sender was dropped
    #[error("Channel closed")]
    ChannelClosed,

    /// The subscriber fell behind and missed events
    #[error("Subscriber lagged behind by {0} events")]
    Lagged(u64),
}

/// Result type for event channel operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Event channel statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventChannelStats {
    /// Total events published
    pub events_published: u64,
    /// Total events received by subscribers
    pub events_delivered: u64,
    /// Live subscriptions
    pub active_subscriptions: usize,
    /// When the last event was published
    pub last_published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    active: AtomicUsize,
    // Unix millis, 0 when nothing was published yet
    last_published_ms: AtomicI64,
}

/// Multicast channel with no replay.
///
/// Cloning the channel yields another handle on the same stream, so the
/// owner can hand publishing rights to callbacks while keeping its own.
///
/// # Example
///
/// ```rust,no_run
/// use reconcile_events::EventChannel;
///
/// async fn example() {
///     let channel: EventChannel<String> = EventChannel::new("greetings");
///     let mut sub = channel.subscribe();
///
///     channel.publish("hello".to_string());
///     let received = sub.recv().await.unwrap();
///     assert_eq!(received, "hello");
/// }
/// ```
pub struct EventChannel<T> {
    name: Arc<str>,
    sender: broadcast::Sender<T>,
    counters: Arc<Counters>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sender: self.sender.clone(),
            counters: self.counters.clone(),
        }
    }
}

impl<T> std::fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Clone + Send + 'static> EventChannel<T> {
    /// Create a new channel with the default capacity.
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// Create with custom capacity.
    ///
    /// A capacity of zero is bumped to one, the broadcast minimum.
    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self {
            name: Arc::from(name),
            sender,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Channel name, used in log fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers the event was queued for. Zero
    /// subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: T) -> usize {
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        self.counters
            .last_published_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::trace!(channel = %self.name, receivers, "Event published");
                receivers
            }
            Err(_) => {
                tracing::trace!(channel = %self.name, "Event published with no subscribers");
                0
            }
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> Subscription<T> {
        self.counters.active.fetch_add(1, Ordering::Relaxed);

        Subscription {
            id: Uuid::now_v7(),
            channel: self.name.clone(),
            receiver: self.sender.subscribe(),
            counters: self.counters.clone(),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Snapshot of the channel statistics.
    pub fn stats(&self) -> EventChannelStats {
        let last_ms = self.counters.last_published_ms.load(Ordering::Relaxed);

        EventChannelStats {
            events_published: self.counters.published.load(Ordering::Relaxed),
            events_delivered: self.counters.delivered.load(Ordering::Relaxed),
            active_subscriptions: self.counters.active.load(Ordering::Relaxed),
            last_published_at: if last_ms == 0 {
                None
            } else {
                DateTime::from_timestamp_millis(last_ms)
            },
        }
    }
}

/// Subscription handle for receiving events.
///
/// Dropping the handle ends the subscription.
pub struct Subscription<T> {
    /// Subscription ID
    pub id: Uuid,
    channel: Arc<str>,
    receiver: broadcast::Receiver<T>,
    counters: Arc<Counters>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}

impl<T: Clone> Subscription<T> {
    /// Receive the next event.
    pub async fn recv(&mut self) -> EventBusResult<T> {
        match self.receiver.recv().await {
            Ok(event) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(event)
            }
            Err(RecvError::Closed) => Err(EventBusError::ChannelClosed),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(channel = %self.channel, missed, "Subscriber lagged");
                Err(EventBusError::Lagged(missed))
            }
        }
    }

    /// Receive an already queued event without waiting.
    ///
    /// Returns `Ok(None)` when nothing is queued.
    pub fn try_recv(&mut self) -> EventBusResult<Option<T>> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(Some(event))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(EventBusError::ChannelClosed),
            Err(TryRecvError::Lagged(missed)) => Err(EventBusError::Lagged(missed)),
        }
    }

    /// Name of the channel this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::Relaxed);
    }
}

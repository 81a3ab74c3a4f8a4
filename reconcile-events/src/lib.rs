//! # Reconcile Events
//!
//! Multicast event channels used to fan identity state out to many
//! listeners without re-querying the identity layers.
//!
//! ## Overview
//!
//! - **EventChannel**: publish/subscribe over a tokio broadcast channel
//! - **Subscription**: per-listener receive handle, dropped to unsubscribe
//! - **Stats**: publish/delivery counters per channel
//!
//! ## Semantics
//!
//! Channels never replay. An event reaches exactly the subscribers that
//! existed when it was published, so late subscribers miss earlier
//! events. Publishing is synchronous and never blocks, which lets native
//! callbacks publish without an async context.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reconcile_events::EventChannel;
//!
//! async fn example() {
//!     let auth_state: EventChannel<Option<String>> = EventChannel::new("auth_state");
//!
//!     let mut sub = auth_state.subscribe();
//!     auth_state.publish(Some("uid-123".to_string()));
//!
//!     while let Ok(change) = sub.recv().await {
//!         println!("user: {:?}", change);
//!     }
//! }
//! ```

pub mod channel;

pub use channel::{
    EventBusError, EventBusResult, EventChannel, EventChannelStats, Subscription, DEFAULT_CAPACITY,
};

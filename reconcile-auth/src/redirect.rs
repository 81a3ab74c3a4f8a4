//! Redirect recovery protocol
//!
//! A redirect sign-in navigates away from the page, so its outcome has to
//! be picked up on the next page load. Before navigating, the provider id
//! is written into the URL query under a well-known key (the marker).
//! On load, a present marker moves recovery from `Idle` to `Awaiting`; the
//! redirect result is then fetched, published once on the redirect-result
//! stream, and the marker is removed.
//!
//! ```text
//! Idle ──marker present at load──▶ Awaiting{provider} ──result/error──▶ Resolved
//! ```

use crate::bridge::BrowserAuth;
use crate::error::{AuthError, ErrorPayload};
use crate::loader::LoaderSlot;
use crate::models::SignInResult;
use crate::normalize;
use crate::provider;
use crate::query::QueryState;
use reconcile_events::{EventChannel, Subscription};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Recovery lifecycle for one page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedirectState {
    /// No redirect marker at load
    Idle,
    /// Marker found, waiting for the redirect result
    Awaiting {
        /// Provider id read from the marker
        provider: String,
    },
    /// Result published and marker removed
    Resolved,
}

/// Value published on the redirect-result stream.
///
/// Serializes as the bare result or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectOutcome {
    // Tried first when deserializing; a result never has an `error` key
    /// Redirect failed or returned no user
    Failed(ErrorPayload),
    /// Redirect completed with a user
    SignedIn(SignInResult),
}

impl RedirectOutcome {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, RedirectOutcome::SignedIn(_))
    }
}

/// Pending-redirect marker stored in the URL query.
#[derive(Clone)]
pub struct RedirectMarker {
    state: Arc<dyn QueryState>,
    key: String,
}

impl std::fmt::Debug for RedirectMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectMarker")
            .field("key", &self.key)
            .field("value", &self.read())
            .finish()
    }
}

impl RedirectMarker {
    pub fn new(state: Arc<dyn QueryState>, key: impl Into<String>) -> Self {
        Self {
            state,
            key: key.into(),
        }
    }

    /// Query key holding the marker.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record that a redirect to `provider_id` is about to start.
    pub fn write(&self, provider_id: &str) {
        self.state.set(&self.key, provider_id);
    }

    /// Provider id of the pending redirect.
    pub fn read(&self) -> Option<String> {
        self.state.get(&self.key).filter(|value| !value.is_empty())
    }

    /// Remove the marker, leaving other query keys alone.
    pub fn clear(&self) {
        self.state.remove(&self.key);
    }
}

/// Recovers the outcome of a redirect sign-in after a page load.
pub struct RedirectRecovery {
    browser: Arc<dyn BrowserAuth>,
    marker: RedirectMarker,
    loader: Arc<LoaderSlot>,
    results: EventChannel<RedirectOutcome>,
    state: Mutex<RedirectState>,
    started: AtomicBool,
}

impl std::fmt::Debug for RedirectRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectRecovery")
            .field("marker", &self.marker)
            .field("state", &self.state())
            .finish()
    }
}

impl RedirectRecovery {
    /// Build recovery for the current page load.
    ///
    /// The marker is inspected exactly once, here.
    pub fn new(
        browser: Arc<dyn BrowserAuth>,
        marker: RedirectMarker,
        loader: Arc<LoaderSlot>,
        capacity: usize,
    ) -> Self {
        let state = match marker.read() {
            Some(provider) => {
                tracing::info!(provider = %provider, "Pending redirect sign in detected");
                RedirectState::Awaiting { provider }
            }
            None => RedirectState::Idle,
        };

        Self {
            browser,
            marker,
            loader,
            results: EventChannel::with_capacity("redirect_result", capacity),
            state: Mutex::new(state),
            started: AtomicBool::new(false),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RedirectState {
        self.lock_state().clone()
    }

    /// Marker shared with the web sign-in adapter.
    pub fn marker(&self) -> &RedirectMarker {
        &self.marker
    }

    /// Subscribe to recovered redirect outcomes.
    ///
    /// There is no replay: subscribe before calling `recover`.
    pub fn results(&self) -> Subscription<RedirectOutcome> {
        self.results.subscribe()
    }

    /// Fetch and publish the redirect result.
    ///
    /// Does nothing unless the marker was present at load, and runs at
    /// most once. Every path ends with the marker removed, the loading
    /// indicator dismissed, and exactly one outcome published.
    pub async fn recover(&self) -> Option<RedirectOutcome> {
        let provider = match self.state() {
            RedirectState::Awaiting { provider } => provider,
            _ => return None,
        };
        if self.started.swap(true, Ordering::SeqCst) {
            return None;
        }

        let loader = self.loader.present(Some(&provider)).await;

        let outcome = match self.browser.get_redirect_result().await {
            Ok(Some(result)) => {
                let provider_id = result.provider_id.as_deref().unwrap_or(provider.as_str());
                let credential = provider::lookup(provider_id)
                    .and_then(|entry| (entry.extract_web)(&result));

                tracing::info!(provider = %provider_id, uid = %result.user.uid, "Redirect sign in recovered");
                RedirectOutcome::SignedIn(normalize::sign_in_result(
                    Some(&result.user),
                    credential.as_ref(),
                ))
            }
            Ok(None) => {
                let err = AuthError::RedirectRecoveryFailure("no user in redirect result".to_string());
                tracing::warn!(provider = %provider, error = %err, "Redirect returned no user");
                RedirectOutcome::Failed(err.to_payload())
            }
            Err(e) => {
                let err = AuthError::RedirectRecoveryFailure(e.normalized());
                tracing::error!(provider = %provider, error = %e, "Failed to get redirect result");
                RedirectOutcome::Failed(err.to_payload())
            }
        };

        self.marker.clear();
        self.loader.release(loader).await;
        *self.lock_state() = RedirectState::Resolved;

        let receivers = self.results.publish(outcome.clone());
        tracing::debug!(receivers, signed_in = outcome.is_signed_in(), "Redirect outcome published");

        Some(outcome)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RedirectState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//! Native session listener
//!
//! Subscribes to native auth state changes and republishes them on the
//! `auth_state` stream. The listener is the only writer of the current
//! user snapshot; everyone else reads a copy.

use crate::bridge::{AuthStateListener, NativeBridge};
use crate::error::{AuthError, AuthResult};
use crate::models::{AuthStateChange, NativeAuthStateChange, SessionUser};
use reconcile_events::{EventChannel, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Tracks the signed-in user reported by the native layer.
pub struct SessionListener {
    native: Arc<dyn NativeBridge>,
    current: Arc<watch::Sender<Option<SessionUser>>>,
    events: EventChannel<AuthStateChange>,
    registration_failed: AtomicBool,
}

impl std::fmt::Debug for SessionListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionListener")
            .field("signed_in", &self.current.borrow().is_some())
            .field("events", &self.events)
            .finish()
    }
}

impl SessionListener {
    /// Create a listener; nothing is registered until `start`.
    pub fn new(native: Arc<dyn NativeBridge>, capacity: usize) -> Self {
        let (current, _) = watch::channel(None);

        Self {
            native,
            current: Arc::new(current),
            events: EventChannel::with_capacity("auth_state", capacity),
            registration_failed: AtomicBool::new(false),
        }
    }

    /// Register the native listener.
    ///
    /// Previously registered native listeners are removed first, so
    /// calling this again (a hot navigation re-running initialization)
    /// never causes duplicate delivery. A failed registration is logged
    /// once and returned to the caller; it is not retried.
    pub async fn start(&self) -> AuthResult<()> {
        let registration = async {
            self.native.remove_all_listeners().await?;
            self.native.add_auth_state_listener(self.listener()).await
        };

        match registration.await {
            Ok(()) => {
                self.registration_failed.store(false, Ordering::Relaxed);
                tracing::debug!("Native auth state listener registered");
                Ok(())
            }
            Err(e) => {
                if !self.registration_failed.swap(true, Ordering::Relaxed) {
                    tracing::error!(error = %e, "Failed to register native auth state listener");
                }
                Err(AuthError::ListenerRegistration(e.normalized()))
            }
        }
    }

    fn listener(&self) -> AuthStateListener {
        let current = self.current.clone();
        let events = self.events.clone();

        Arc::new(move |change: NativeAuthStateChange| {
            let signed_in = change.user.is_some();
            current.send_replace(change.user.clone());

            let receivers = events.publish(AuthStateChange::now(change.user));
            tracing::debug!(signed_in, receivers, "Native auth state changed");
        })
    }

    /// Detach from the native layer.
    pub async fn detach(&self) -> AuthResult<()> {
        self.native
            .remove_all_listeners()
            .await
            .map_err(|e| AuthError::ListenerRegistration(e.normalized()))
    }

    /// Copy of the current user snapshot.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.current.borrow().clone()
    }

    /// Watch the current user snapshot.
    pub fn watch_current_user(&self) -> watch::Receiver<Option<SessionUser>> {
        self.current.subscribe()
    }

    /// Subscribe to auth state changes from now on.
    pub fn auth_state(&self) -> Subscription<AuthStateChange> {
        self.events.subscribe()
    }
}

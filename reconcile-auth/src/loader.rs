//! Single-instance loading indicator
//!
//! At most one indicator is current. Presenting while one is up
//! dismisses the old one first, so no indicator is ever orphaned.
//! Indicator failures are logged and never fail a sign-in.
//!
//! The slot is shared by every sign-in path and by redirect recovery. A
//! path that presented an indicator ends with `release(id)` using the id
//! it got back, so it never closes an indicator another path put up after
//! it. `dismiss` clears whatever is current and is meant for teardown.

use crate::bridge::{LoaderId, LoadingPresenter};
use crate::provider::ProviderKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Message shown while signing in with `provider`.
///
/// Known provider ids map to their display name; anything else is
/// capitalized as-is (`email` becomes `Email`).
pub fn loading_message(provider: Option<&str>) -> String {
    let name = match provider.map(str::trim).filter(|p| !p.is_empty()) {
        None => return "Signing in ...".to_string(),
        Some(provider) => match ProviderKind::parse(provider) {
            Some(kind) => kind.display_name().to_string(),
            None => capitalize(provider),
        },
    };

    format!("Signing in with {}", name)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Owner of the current loading indicator.
pub struct LoaderSlot {
    presenter: Arc<dyn LoadingPresenter>,
    duration: Duration,
    active: Mutex<Option<LoaderId>>,
}

impl std::fmt::Debug for LoaderSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderSlot")
            .field("duration", &self.duration)
            .finish()
    }
}

impl LoaderSlot {
    /// Create an empty slot.
    pub fn new(presenter: Arc<dyn LoadingPresenter>, duration: Duration) -> Self {
        Self {
            presenter,
            duration,
            active: Mutex::new(None),
        }
    }

    /// Present an indicator for `provider`, replacing any active one.
    ///
    /// Returns the new indicator id, or `None` if the host failed to
    /// present it.
    pub async fn present(&self, provider: Option<&str>) -> Option<LoaderId> {
        let message = loading_message(provider);
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            tracing::debug!(loader = %previous, "Replacing active loading indicator");
            if let Err(e) = self.presenter.dismiss(previous).await {
                tracing::warn!(loader = %previous, error = %e, "Failed to dismiss loading indicator");
            }
        }

        match self.presenter.present(&message, self.duration).await {
            Ok(id) => {
                *active = Some(id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!(message = %message, error = %e, "Failed to present loading indicator");
                None
            }
        }
    }

    /// Dismiss the indicator `id` if it is still the current one.
    ///
    /// Returns whether it was dismissed. `None` (nothing was presented)
    /// and a replaced indicator are no-ops.
    pub async fn release(&self, id: Option<LoaderId>) -> bool {
        let Some(id) = id else {
            return false;
        };

        {
            let mut active = self.active.lock().await;
            if *active != Some(id) {
                tracing::debug!(loader = %id, "Loading indicator already replaced");
                return false;
            }
            *active = None;
        }

        if let Err(e) = self.presenter.dismiss(id).await {
            tracing::warn!(loader = %id, error = %e, "Failed to dismiss loading indicator");
        }
        true
    }

    /// Dismiss the active indicator, if any.
    ///
    /// Returns whether an indicator was active.
    pub async fn dismiss(&self) -> bool {
        let Some(id) = self.active.lock().await.take() else {
            return false;
        };

        if let Err(e) = self.presenter.dismiss(id).await {
            tracing::warn!(loader = %id, error = %e, "Failed to dismiss loading indicator");
        }
        true
    }

    /// Id of the active indicator.
    pub async fn active(&self) -> Option<LoaderId> {
        *self.active.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderResult;
    use async_trait::async_trait;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingPresenter {
        log: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LoadingPresenter for RecordingPresenter {
        async fn present(&self, message: &str, _duration: Duration) -> ProviderResult<LoaderId> {
            let id = Uuid::now_v7();
            self.log.lock().unwrap().push(format!("present {}", message));
            Ok(id)
        }

        async fn dismiss(&self, _id: LoaderId) -> ProviderResult<()> {
            self.log.lock().unwrap().push("dismiss".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_loading_message() {
        assert_eq!(loading_message(Some("google.com")), "Signing in with Google");
        assert_eq!(loading_message(Some("email")), "Signing in with Email");
        assert_eq!(loading_message(None), "Signing in ...");
        assert_eq!(loading_message(Some("")), "Signing in ...");
    }

    #[tokio::test]
    async fn test_present_replaces_active_indicator() {
        let presenter = Arc::new(RecordingPresenter::default());
        let slot = LoaderSlot::new(presenter.clone(), Duration::from_secs(4));

        let first = slot.present(Some("google.com")).await.unwrap();
        let second = slot.present(Some("twitter.com")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(slot.active().await, Some(second));
        assert_eq!(
            *presenter.log.lock().unwrap(),
            vec![
                "present Signing in with Google",
                "dismiss",
                "present Signing in with Twitter"
            ]
        );
    }

    #[tokio::test]
    async fn test_release_keeps_newer_indicator() {
        let presenter = Arc::new(RecordingPresenter::default());
        let slot = LoaderSlot::new(presenter.clone(), Duration::from_secs(4));

        let recovery = slot.present(Some("google.com")).await;
        let email = slot.present(Some("email")).await;

        // Finishing the replaced path leaves the newer indicator up
        assert!(!slot.release(recovery).await);
        assert_eq!(slot.active().await, email);

        assert!(slot.release(email).await);
        assert!(slot.active().await.is_none());
        assert!(!slot.release(None).await);
        assert_eq!(
            *presenter.log.lock().unwrap(),
            vec![
                "present Signing in with Google",
                "dismiss",
                "present Signing in with Email",
                "dismiss"
            ]
        );
    }

    #[tokio::test]
    async fn test_dismiss_is_idempotent() {
        let presenter = Arc::new(RecordingPresenter::default());
        let slot = LoaderSlot::new(presenter.clone(), Duration::from_secs(4));

        slot.present(None).await;
        assert!(slot.dismiss().await);
        assert!(!slot.dismiss().await);
        assert!(slot.active().await.is_none());
    }
}

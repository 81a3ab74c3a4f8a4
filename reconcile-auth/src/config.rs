//! Reconciliation engine configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! match a stock four-provider setup.

use crate::error::{AuthError, AuthResult};
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default query key carrying the pending redirect marker.
pub const DEFAULT_REDIRECT_QUERY_KEY: &str = "auth-redirect";

/// Default avatar shown for password accounts.
pub const DEFAULT_PLACEHOLDER_AVATAR: &str =
    "https://s3-us-west-2.amazonaws.com/ionicthemes/otros/avatar-placeholder.png";

/// Largest accepted stream channel capacity.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Query key holding the pending redirect marker.
    pub redirect_query_key: String,

    /// How long a loading indicator stays up before auto-dismissing.
    pub loader_duration_ms: u64,

    /// Providers that may be used for social sign-in.
    pub providers: Vec<ProviderKind>,

    /// Use popups on every web platform instead of redirects.
    pub force_popup: bool,

    /// Capacity of the auth-state and redirect-result channels.
    pub event_capacity: usize,

    /// Avatar used in profiles of password accounts.
    pub placeholder_avatar_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_query_key: DEFAULT_REDIRECT_QUERY_KEY.to_string(),
            loader_duration_ms: 4000,
            providers: ProviderKind::ALL.to_vec(),
            force_popup: false,
            event_capacity: reconcile_events::DEFAULT_CAPACITY,
            placeholder_avatar_url: DEFAULT_PLACEHOLDER_AVATAR.to_string(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AUTH_REDIRECT_QUERY_KEY`: marker query key (default: auth-redirect)
    /// - `AUTH_LOADER_DURATION_MS`: loading indicator duration (default: 4000)
    /// - `AUTH_PROVIDERS`: comma separated provider ids (default: all four)
    /// - `AUTH_FORCE_POPUP`: popups on every web platform (default: false)
    /// - `AUTH_EVENT_CAPACITY`: stream channel capacity (default: 64)
    /// - `AUTH_PLACEHOLDER_AVATAR_URL`: avatar for password accounts
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            redirect_query_key: std::env::var("AUTH_REDIRECT_QUERY_KEY")
                .unwrap_or(default.redirect_query_key),
            loader_duration_ms: std::env::var("AUTH_LOADER_DURATION_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.loader_duration_ms),
            providers: std::env::var("AUTH_PROVIDERS")
                .map(|s| parse_providers(&s))
                .unwrap_or(default.providers),
            force_popup: std::env::var("AUTH_FORCE_POPUP")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.force_popup),
            event_capacity: std::env::var("AUTH_EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.event_capacity),
            placeholder_avatar_url: std::env::var("AUTH_PLACEHOLDER_AVATAR_URL")
                .unwrap_or(default.placeholder_avatar_url),
        }
    }

    /// Loading indicator duration.
    pub fn loader_duration(&self) -> Duration {
        Duration::from_millis(self.loader_duration_ms)
    }

    /// Whether a provider may be used.
    pub fn is_enabled(&self, provider: ProviderKind) -> bool {
        self.providers.contains(&provider)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.redirect_query_key.trim().is_empty() {
            return Err(AuthError::ConfigError(
                "redirect_query_key must not be empty".to_string(),
            ));
        }
        if self.providers.is_empty() {
            return Err(AuthError::ConfigError(
                "at least one provider must be enabled".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(AuthError::ConfigError(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(AuthError::ConfigError(format!(
                "event_capacity must be at most {}",
                MAX_EVENT_CAPACITY
            )));
        }
        Ok(())
    }
}

/// Parse a comma separated provider list, skipping unknown entries.
fn parse_providers(raw: &str) -> Vec<ProviderKind> {
    let mut providers = Vec::new();

    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match ProviderKind::parse(item) {
            Some(kind) if !providers.contains(&kind) => providers.push(kind),
            Some(_) => {}
            None => tracing::warn!(provider = %item, "Ignoring unknown provider in AUTH_PROVIDERS"),
        }
    }

    providers
}

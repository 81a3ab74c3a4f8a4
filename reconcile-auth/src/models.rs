//! Identity data model
//!
//! Normalized shapes handed to callers (`SessionUser`, `Credential`,
//! `SignInResult`, `AuthStateChange`) and the raw shapes consumed from the
//! native bridge and the browser SDK. Raw shapes only flow into the
//! normalizer; nothing else reads their fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the signed-in user.
///
/// Replaced wholesale on every state change. `None` where a
/// `Option<SessionUser>` is expected means signed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Stable user identifier
    pub uid: String,

    /// Display name
    pub display_name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Whether the email was verified
    pub email_verified: bool,

    /// Anonymous account
    pub is_anonymous: bool,

    /// Phone number
    pub phone_number: Option<String>,

    /// Profile photo URL
    pub photo_url: Option<String>,

    /// Provider that authenticated the user (`google.com`, `password`)
    pub provider_id: String,

    /// Multi-tenancy tenant
    pub tenant_id: Option<String>,
}

/// Credential produced by a sign-in.
///
/// Token fields are only present for token-bearing providers and are
/// omitted from the serialized form otherwise. Used once to establish a
/// session, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Provider identifier
    pub provider_id: String,

    /// OAuth access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// OpenID Connect ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// OAuth 1.0 token secret (Twitter only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// The single success shape returned by every sign-in path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResult {
    /// Signed-in user
    pub user: Option<SessionUser>,

    /// Provider credential, `None` for password sign-ins
    pub credential: Option<Credential>,
}

/// Auth state change published on the `auth_state` stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStateChange {
    /// New user, `None` when signed out
    pub user: Option<SessionUser>,

    /// When the change was observed
    pub observed_at: DateTime<Utc>,
}

impl AuthStateChange {
    /// Wrap a user snapshot observed now.
    pub fn now(user: Option<SessionUser>) -> Self {
        Self {
            user,
            observed_at: Utc::now(),
        }
    }

    /// Whether a user is signed in after this change.
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

// ============================================================================
// Native bridge shapes
// ============================================================================

/// Credential fields as reported by the native bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCredential {
    /// Provider identifier
    pub provider_id: String,

    /// OAuth access token
    pub access_token: Option<String>,

    /// ID token
    pub id_token: Option<String>,

    /// Raw nonce used for the ID token (Apple)
    pub nonce: Option<String>,

    /// OAuth 1.0 token secret (Twitter)
    pub secret: Option<String>,
}

/// Result of a native-bridge sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSignInResult {
    /// User on the native layer
    pub user: Option<SessionUser>,

    /// Provider credential obtained natively
    pub credential: Option<NativeCredential>,
}

/// State change delivered by the native listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAuthStateChange {
    /// Native user, `None` when signed out
    pub user: Option<SessionUser>,
}

/// Options forwarded with a native sign-in call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeSignInOptions {
    /// Additional OAuth scopes
    pub scopes: Vec<String>,
}

// ============================================================================
// Browser SDK shapes
// ============================================================================

/// User metadata kept by the browser SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserMetadata {
    /// Account creation time
    pub creation_time: Option<String>,
    /// Last sign-in time
    pub last_sign_in_time: Option<String>,
}

/// User object as held by the browser SDK.
///
/// Carries more than the normalized snapshot; the normalizer picks the
/// session fields and drops the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// Stable user identifier
    pub uid: String,
    /// Display name
    pub display_name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Email verified
    pub email_verified: bool,
    /// Anonymous account
    pub is_anonymous: bool,
    /// Phone number
    pub phone_number: Option<String>,
    /// Photo URL
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Provider identifier
    pub provider_id: String,
    /// Tenant
    pub tenant_id: Option<String>,
    /// Long-lived refresh token, never exposed
    pub refresh_token: Option<String>,
    /// Account metadata
    #[serde(default)]
    pub metadata: ProviderUserMetadata,
}

/// OAuth credential held by the browser SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredential {
    /// Provider identifier
    pub provider_id: String,
    /// Sign-in method
    pub sign_in_method: String,
    /// Access token
    pub access_token: Option<String>,
    /// ID token
    pub id_token: Option<String>,
    /// OAuth 1.0 secret
    pub secret: Option<String>,
    /// Raw nonce bound to the ID token
    pub raw_nonce: Option<String>,
}

/// Credential held by the browser SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderCredential {
    /// Token-bearing OAuth credential
    #[serde(rename = "oauth")]
    OAuth(OAuthCredential),
    /// Any other credential (password, phone)
    Other {
        /// Provider identifier
        provider_id: String,
        /// Sign-in method
        sign_in_method: String,
    },
}

impl ProviderCredential {
    /// Provider identifier of the credential.
    pub fn provider_id(&self) -> &str {
        match self {
            ProviderCredential::OAuth(oauth) => &oauth.provider_id,
            ProviderCredential::Other { provider_id, .. } => provider_id,
        }
    }
}

/// Outcome of a browser SDK sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    /// Signed-in user
    pub user: ProviderUser,
    /// Provider that produced the sign-in, `None` for password sign-ins
    pub provider_id: Option<String>,
    /// Credential the SDK obtained from the provider
    pub credential: Option<ProviderCredential>,
}

/// Provider object passed to popup and redirect flows.
///
/// Built fresh for every call so scopes never leak between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProviderRequest {
    /// Provider identifier
    pub provider_id: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl AuthProviderRequest {
    /// Create a provider object without scopes.
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            scopes: Vec::new(),
        }
    }

    /// Add a scope, ignoring duplicates.
    pub fn add_scope(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
    }

    /// Add several scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for scope in scopes {
            self.add_scope(scope);
        }
        self
    }
}

/// Input to a browser SDK credential constructor.
///
/// Each provider family takes a different set of native fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRequest {
    /// Generic OAuth provider with ID token and raw nonce (Apple)
    IdTokenWithNonce {
        /// Provider identifier
        provider_id: String,
        /// ID token
        id_token: Option<String>,
        /// Raw nonce
        raw_nonce: Option<String>,
    },
    /// Facebook access token
    Facebook {
        /// Access token
        access_token: Option<String>,
    },
    /// Google ID token plus access token
    Google {
        /// ID token
        id_token: Option<String>,
        /// Access token
        access_token: Option<String>,
    },
    /// Twitter OAuth 1.0 token and secret
    Twitter {
        /// Access token
        access_token: Option<String>,
        /// Token secret
        secret: Option<String>,
    },
}

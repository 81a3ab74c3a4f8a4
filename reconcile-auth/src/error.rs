//! Error types for sign-in reconciliation
//!
//! This module defines every failure the reconciliation engine can
//! report, plus the normalized `{error: string}` payload handed to
//! callers and the provider-side error shape consumed from the identity
//! layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reported by an identity layer (native bridge or browser SDK).
///
/// Providers report a machine code (`auth/popup-closed-by-user`), a
/// human message, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Provider error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human readable message
    pub message: String,
}

impl ProviderError {
    /// Create an error with a code and a message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Create an error that only carries a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Code if present, otherwise the message.
    pub fn normalized(&self) -> String {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => code.to_string(),
            _ if !self.message.is_empty() => self.message.clone(),
            _ => "undefined".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Result type for identity layer calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Reconciliation error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The native bridge returned no sign-in result
    #[error("Native sign in failed: {0}")]
    NativeAuthFailure(String),

    /// Building a browser credential from a native result failed
    #[error("Credential mapping failed for {provider}: {reason}")]
    CredentialMappingFailure {
        /// Provider identifier
        provider: String,
        /// Normalized provider error
        reason: String,
    },

    /// Popup, redirect, credential or password sign-in was rejected
    #[error("Web sign in failed: {0}")]
    WebAuthFailure(String),

    /// The redirect result could not be recovered after a page load
    #[error("Redirect recovery failed: {0}")]
    RedirectRecoveryFailure(String),

    /// Native layer sign-out was rejected
    #[error("Native auth sign out error: {0}")]
    NativeSignOutFailure(String),

    /// Web layer sign-out was rejected (native session already cleared)
    #[error("Web auth sign out error: {0}")]
    WebSignOutFailure(String),

    /// Registering the native auth-state listener failed
    #[error("Auth state listener registration failed: {0}")]
    ListenerRegistration(String),

    /// Another social sign-in is still in flight
    #[error("A sign in with {0} is already in progress")]
    SignInInProgress(String),

    /// Provider is known but not enabled by configuration
    #[error("Provider is disabled: {0}")]
    ProviderDisabled(String),

    /// Provider identifier is not in the provider table
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for reconciliation operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Normalized error shape surfaced to callers and redirect listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Provider code, provider message, or engine description
    pub error: String,
}

impl ErrorPayload {
    /// Create a payload from any displayable reason.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<&ProviderError> for ErrorPayload {
    fn from(err: &ProviderError) -> Self {
        Self::new(err.normalized())
    }
}

impl AuthError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NativeAuthFailure(_) => "NATIVE_AUTH_FAILURE",
            AuthError::CredentialMappingFailure { .. } => "CREDENTIAL_MAPPING_FAILURE",
            AuthError::WebAuthFailure(_) => "WEB_AUTH_FAILURE",
            AuthError::RedirectRecoveryFailure(_) => "REDIRECT_RECOVERY_FAILURE",
            AuthError::NativeSignOutFailure(_) => "NATIVE_SIGN_OUT_FAILURE",
            AuthError::WebSignOutFailure(_) => "WEB_SIGN_OUT_FAILURE",
            AuthError::ListenerRegistration(_) => "LISTENER_REGISTRATION",
            AuthError::SignInInProgress(_) => "SIGN_IN_IN_PROGRESS",
            AuthError::ProviderDisabled(_) => "PROVIDER_DISABLED",
            AuthError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// The provider-derived reason without the engine prefix.
    pub fn reason(&self) -> &str {
        match self {
            AuthError::NativeAuthFailure(reason)
            | AuthError::WebAuthFailure(reason)
            | AuthError::RedirectRecoveryFailure(reason)
            | AuthError::NativeSignOutFailure(reason)
            | AuthError::WebSignOutFailure(reason)
            | AuthError::ListenerRegistration(reason)
            | AuthError::SignInInProgress(reason)
            | AuthError::ProviderDisabled(reason)
            | AuthError::UnknownProvider(reason)
            | AuthError::ConfigError(reason) => reason,
            AuthError::CredentialMappingFailure { reason, .. } => reason,
        }
    }

    /// Normalized `{error}` payload for callers.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.reason())
    }

    /// Whether the user can simply try again.
    ///
    /// Configuration problems and listener registration failures will not
    /// go away on a retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AuthError::ListenerRegistration(_)
                | AuthError::ProviderDisabled(_)
                | AuthError::UnknownProvider(_)
                | AuthError::ConfigError(_)
        )
    }
}

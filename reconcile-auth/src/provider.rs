//! Social provider table
//!
//! Every provider-specific decision lives here: which native bridge call
//! signs a provider in, which native fields feed the browser credential
//! constructor, and which tokens a web sign-in result keeps. Adding a
//! provider means adding one `ProviderKind` variant and one table row.

use crate::bridge::NativeBridge;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{
    CredentialRequest, NativeCredential, NativeSignInOptions, NativeSignInResult, OAuthCredential,
    ProviderCredential, UserCredential,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Supported social providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Sign in with Apple
    #[serde(rename = "apple.com")]
    Apple,
    /// Facebook Login
    #[serde(rename = "facebook.com")]
    Facebook,
    /// Google Sign-In
    #[serde(rename = "google.com")]
    Google,
    /// Twitter (OAuth 1.0)
    #[serde(rename = "twitter.com")]
    Twitter,
}

impl ProviderKind {
    /// Every supported provider, in table order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Apple,
        ProviderKind::Facebook,
        ProviderKind::Google,
        ProviderKind::Twitter,
    ];

    /// Provider identifier used by both identity layers.
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderKind::Apple => "apple.com",
            ProviderKind::Facebook => "facebook.com",
            ProviderKind::Google => "google.com",
            ProviderKind::Twitter => "twitter.com",
        }
    }

    /// Parse from a provider identifier or a bare name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "apple.com" | "apple" => Some(ProviderKind::Apple),
            "facebook.com" | "facebook" => Some(ProviderKind::Facebook),
            "google.com" | "google" => Some(ProviderKind::Google),
            "twitter.com" | "twitter" => Some(ProviderKind::Twitter),
            _ => None,
        }
    }

    /// Human name shown by the loading indicator.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Apple => "Apple",
            ProviderKind::Facebook => "Facebook",
            ProviderKind::Google => "Google",
            ProviderKind::Twitter => "Twitter",
        }
    }

    /// Scopes requested by the per-provider sign-in entry points.
    pub fn default_scopes(&self) -> Vec<&'static str> {
        match self {
            ProviderKind::Apple => vec!["name", "email"],
            ProviderKind::Facebook => vec!["email"],
            ProviderKind::Google => vec!["profile", "email"],
            ProviderKind::Twitter => vec!["name", "email"],
        }
    }

    /// Table row for this provider.
    pub fn entry(&self) -> &'static ProviderEntry {
        let index = match self {
            ProviderKind::Apple => 0,
            ProviderKind::Facebook => 1,
            ProviderKind::Google => 2,
            ProviderKind::Twitter => 3,
        };
        &PROVIDER_TABLE[index]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_id())
    }
}

/// Invokes the native bridge sign-in method for one provider.
pub type NativeInvoker = for<'a> fn(
    &'a dyn NativeBridge,
    &'a NativeSignInOptions,
) -> BoxFuture<'a, ProviderResult<Option<NativeSignInResult>>>;

/// Selects the native credential fields a provider's constructor takes.
pub type CredentialMapper = fn(&NativeCredential) -> CredentialRequest;

/// Pulls a provider's credential out of a web sign-in result.
pub type CredentialExtractor = fn(&UserCredential) -> Option<ProviderCredential>;

/// One row of the provider table.
pub struct ProviderEntry {
    /// Provider this row describes
    pub kind: ProviderKind,
    /// Native bridge sign-in
    pub native: NativeInvoker,
    /// Native credential to constructor input
    pub map_native: CredentialMapper,
    /// Web result to credential
    pub extract_web: CredentialExtractor,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("kind", &self.kind)
            .finish()
    }
}

static PROVIDER_TABLE: [ProviderEntry; 4] = [
    ProviderEntry {
        kind: ProviderKind::Apple,
        native: apple_native,
        map_native: apple_map,
        extract_web: apple_extract,
    },
    ProviderEntry {
        kind: ProviderKind::Facebook,
        native: facebook_native,
        map_native: facebook_map,
        extract_web: facebook_extract,
    },
    ProviderEntry {
        kind: ProviderKind::Google,
        native: google_native,
        map_native: google_map,
        extract_web: google_extract,
    },
    ProviderEntry {
        kind: ProviderKind::Twitter,
        native: twitter_native,
        map_native: twitter_map,
        extract_web: twitter_extract,
    },
];

/// Find the table row for a provider identifier.
pub fn lookup(provider_id: &str) -> Option<&'static ProviderEntry> {
    ProviderKind::parse(provider_id).map(|kind| kind.entry())
}

fn apple_native<'a>(
    bridge: &'a dyn NativeBridge,
    options: &'a NativeSignInOptions,
) -> BoxFuture<'a, ProviderResult<Option<NativeSignInResult>>> {
    bridge.sign_in_with_apple(options)
}

fn facebook_native<'a>(
    bridge: &'a dyn NativeBridge,
    options: &'a NativeSignInOptions,
) -> BoxFuture<'a, ProviderResult<Option<NativeSignInResult>>> {
    bridge.sign_in_with_facebook(options)
}

fn google_native<'a>(
    bridge: &'a dyn NativeBridge,
    options: &'a NativeSignInOptions,
) -> BoxFuture<'a, ProviderResult<Option<NativeSignInResult>>> {
    bridge.sign_in_with_google(options)
}

fn twitter_native<'a>(
    bridge: &'a dyn NativeBridge,
    options: &'a NativeSignInOptions,
) -> BoxFuture<'a, ProviderResult<Option<NativeSignInResult>>> {
    bridge.sign_in_with_twitter(options)
}

fn apple_map(native: &NativeCredential) -> CredentialRequest {
    CredentialRequest::IdTokenWithNonce {
        provider_id: ProviderKind::Apple.provider_id().to_string(),
        id_token: native.id_token.clone(),
        raw_nonce: native.nonce.clone(),
    }
}

fn facebook_map(native: &NativeCredential) -> CredentialRequest {
    CredentialRequest::Facebook {
        access_token: native.access_token.clone(),
    }
}

fn google_map(native: &NativeCredential) -> CredentialRequest {
    CredentialRequest::Google {
        id_token: native.id_token.clone(),
        access_token: native.access_token.clone(),
    }
}

fn twitter_map(native: &NativeCredential) -> CredentialRequest {
    CredentialRequest::Twitter {
        access_token: native.access_token.clone(),
        secret: native.secret.clone(),
    }
}

fn oauth_credential(result: &UserCredential, kind: ProviderKind) -> Option<&OAuthCredential> {
    match &result.credential {
        Some(ProviderCredential::OAuth(oauth)) if oauth.provider_id == kind.provider_id() => {
            Some(oauth)
        }
        _ => None,
    }
}

fn apple_extract(result: &UserCredential) -> Option<ProviderCredential> {
    oauth_credential(result, ProviderKind::Apple).map(|oauth| {
        ProviderCredential::OAuth(OAuthCredential {
            provider_id: oauth.provider_id.clone(),
            sign_in_method: oauth.sign_in_method.clone(),
            access_token: oauth.access_token.clone(),
            id_token: oauth.id_token.clone(),
            secret: None,
            raw_nonce: oauth.raw_nonce.clone(),
        })
    })
}

fn facebook_extract(result: &UserCredential) -> Option<ProviderCredential> {
    oauth_credential(result, ProviderKind::Facebook).map(|oauth| {
        ProviderCredential::OAuth(OAuthCredential {
            provider_id: oauth.provider_id.clone(),
            sign_in_method: oauth.sign_in_method.clone(),
            access_token: oauth.access_token.clone(),
            ..Default::default()
        })
    })
}

fn google_extract(result: &UserCredential) -> Option<ProviderCredential> {
    oauth_credential(result, ProviderKind::Google).map(|oauth| {
        ProviderCredential::OAuth(OAuthCredential {
            provider_id: oauth.provider_id.clone(),
            sign_in_method: oauth.sign_in_method.clone(),
            access_token: oauth.access_token.clone(),
            id_token: oauth.id_token.clone(),
            ..Default::default()
        })
    })
}

fn twitter_extract(result: &UserCredential) -> Option<ProviderCredential> {
    oauth_credential(result, ProviderKind::Twitter).map(|oauth| {
        ProviderCredential::OAuth(OAuthCredential {
            provider_id: oauth.provider_id.clone(),
            sign_in_method: oauth.sign_in_method.clone(),
            access_token: oauth.access_token.clone(),
            secret: oauth.secret.clone(),
            ..Default::default()
        })
    })
}

fn argument_error(provider: ProviderKind, message: &str) -> ProviderError {
    ProviderError::new(
        "auth/argument-error",
        format!("{} credential {}", provider.provider_id(), message),
    )
}

fn oauth(provider: ProviderKind) -> OAuthCredential {
    OAuthCredential {
        provider_id: provider.provider_id().to_string(),
        sign_in_method: provider.provider_id().to_string(),
        ..Default::default()
    }
}

/// Browser-side credential constructor.
///
/// Rejects requests that lack the tokens the provider requires.
pub fn construct_credential(request: &CredentialRequest) -> ProviderResult<ProviderCredential> {
    let credential = match request {
        CredentialRequest::IdTokenWithNonce {
            provider_id,
            id_token,
            raw_nonce,
        } => {
            let kind = ProviderKind::parse(provider_id).unwrap_or(ProviderKind::Apple);
            if id_token.is_none() {
                return Err(argument_error(kind, "requires an ID token"));
            }
            OAuthCredential {
                provider_id: provider_id.clone(),
                sign_in_method: provider_id.clone(),
                id_token: id_token.clone(),
                raw_nonce: raw_nonce.clone(),
                ..Default::default()
            }
        }
        CredentialRequest::Facebook { access_token } => {
            let access_token = access_token
                .clone()
                .ok_or_else(|| argument_error(ProviderKind::Facebook, "requires an access token"))?;
            OAuthCredential {
                access_token: Some(access_token),
                ..oauth(ProviderKind::Facebook)
            }
        }
        CredentialRequest::Google {
            id_token,
            access_token,
        } => {
            if id_token.is_none() && access_token.is_none() {
                return Err(argument_error(
                    ProviderKind::Google,
                    "requires an ID token or an access token",
                ));
            }
            OAuthCredential {
                id_token: id_token.clone(),
                access_token: access_token.clone(),
                ..oauth(ProviderKind::Google)
            }
        }
        CredentialRequest::Twitter {
            access_token,
            secret,
        } => match (access_token, secret) {
            (Some(access_token), Some(secret)) => OAuthCredential {
                access_token: Some(access_token.clone()),
                secret: Some(secret.clone()),
                ..oauth(ProviderKind::Twitter)
            },
            _ => {
                return Err(argument_error(
                    ProviderKind::Twitter,
                    "requires an access token and a secret",
                ))
            }
        },
    };

    Ok(ProviderCredential::OAuth(credential))
}

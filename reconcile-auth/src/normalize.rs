//! Result normalization
//!
//! The only place field selection happens. Every adapter routes raw
//! provider output through these functions before returning.

use crate::models::{
    Credential, ProviderCredential, ProviderUser, SessionUser, SignInResult, UserCredential,
};

/// Pick the session fields from a browser SDK user.
pub fn user_from_provider_user(user: Option<&ProviderUser>) -> Option<SessionUser> {
    let user = user?;

    Some(SessionUser {
        uid: user.uid.clone(),
        display_name: user.display_name.clone(),
        email: user.email.clone(),
        email_verified: user.email_verified,
        is_anonymous: user.is_anonymous,
        phone_number: user.phone_number.clone(),
        photo_url: user.photo_url.clone(),
        provider_id: user.provider_id.clone(),
        tenant_id: user.tenant_id.clone(),
    })
}

/// Pick the credential fields from a browser SDK credential.
///
/// Token fields are only read from the token-bearing OAuth subtype; for
/// any other credential they stay absent.
pub fn credential_from_provider_credential(
    credential: Option<&ProviderCredential>,
) -> Option<Credential> {
    let credential = credential?;

    let mut result = Credential {
        provider_id: credential.provider_id().to_string(),
        access_token: None,
        id_token: None,
        secret: None,
    };

    if let ProviderCredential::OAuth(oauth) = credential {
        result.access_token = oauth.access_token.clone();
        result.id_token = oauth.id_token.clone();
        result.secret = oauth.secret.clone();
    }

    Some(result)
}

/// Build a sign-in result from a user and the credential that produced it.
pub fn sign_in_result(
    user: Option<&ProviderUser>,
    credential: Option<&ProviderCredential>,
) -> SignInResult {
    SignInResult {
        user: user_from_provider_user(user),
        credential: credential_from_provider_credential(credential),
    }
}

/// Build a sign-in result for password flows, which carry no credential.
pub fn sign_in_result_from_user_credential(result: &UserCredential) -> SignInResult {
    SignInResult {
        user: user_from_provider_user(Some(&result.user)),
        credential: None,
    }
}

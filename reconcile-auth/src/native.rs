//! Native sign-in adapter
//!
//! Runs a provider sign-in on the native layer, converts the native
//! credential into a browser credential through the provider table and
//! establishes the browser session with it. Both layers end up signed in.

use crate::bridge::{BrowserAuth, NativeBridge};
use crate::error::{AuthError, AuthResult};
use crate::models::{NativeCredential, NativeSignInOptions, ProviderCredential, SignInResult};
use crate::normalize;
use crate::provider::ProviderKind;
use std::sync::Arc;

/// Native bridge sign-in followed by a browser credential sign-in.
pub struct NativeSignIn {
    native: Arc<dyn NativeBridge>,
    browser: Arc<dyn BrowserAuth>,
}

impl NativeSignIn {
    /// Create the adapter over both identity layers.
    pub fn new(native: Arc<dyn NativeBridge>, browser: Arc<dyn BrowserAuth>) -> Self {
        Self { native, browser }
    }

    /// Sign `provider` in on both layers.
    pub async fn sign_in(&self, provider: ProviderKind, scopes: &[String]) -> AuthResult<SignInResult> {
        let entry = provider.entry();
        let options = NativeSignInOptions {
            scopes: scopes.to_vec(),
        };

        let native_result = (entry.native)(&*self.native, &options)
            .await
            .map_err(|e| AuthError::NativeAuthFailure(e.normalized()))?
            .ok_or_else(|| {
                AuthError::NativeAuthFailure(format!("no result from native {} sign in", provider))
            })?;

        let native_credential = native_result.credential.unwrap_or_else(|| NativeCredential {
            provider_id: provider.provider_id().to_string(),
            ..Default::default()
        });

        let credential = match self.map_credential(provider, &native_credential) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Native credential could not be mapped");
                return Err(AuthError::WebAuthFailure(format!(
                    "cannot establish a web session without a {} credential: {}",
                    provider,
                    e.reason()
                )));
            }
        };

        let web_result = self
            .browser
            .sign_in_with_credential(&credential)
            .await
            .map_err(|e| AuthError::WebAuthFailure(e.normalized()))?;

        tracing::info!(provider = %provider, uid = %web_result.user.uid, "Native sign in reconciled with web session");

        Ok(normalize::sign_in_result(
            Some(&web_result.user),
            Some(&credential),
        ))
    }

    /// Build the browser credential for a native credential.
    pub fn map_credential(
        &self,
        provider: ProviderKind,
        native: &NativeCredential,
    ) -> AuthResult<ProviderCredential> {
        let request = (provider.entry().map_native)(native);

        self.browser
            .build_credential(&request)
            .map_err(|e| AuthError::CredentialMappingFailure {
                provider: provider.provider_id().to_string(),
                reason: e.normalized(),
            })
    }
}

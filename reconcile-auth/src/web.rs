//! Web sign-in adapter
//!
//! Browser-only social sign-in, either through a popup that resolves in
//! place or through a full-page redirect whose outcome is recovered on the
//! next page load.

use crate::bridge::BrowserAuth;
use crate::error::{AuthError, AuthResult};
use crate::models::{AuthProviderRequest, SignInResult};
use crate::normalize;
use crate::provider::ProviderKind;
use crate::redirect::RedirectMarker;
use crate::strategy::SignInStrategy;
use std::sync::Arc;

/// Browser flow used for a social sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebFlow {
    Popup,
    Redirect,
}

impl WebFlow {
    /// Browser flow for a strategy; `None` for the native bridge.
    pub fn for_strategy(strategy: SignInStrategy) -> Option<Self> {
        match strategy {
            SignInStrategy::Popup => Some(WebFlow::Popup),
            SignInStrategy::Redirect => Some(WebFlow::Redirect),
            SignInStrategy::NativeBridge => None,
        }
    }
}

/// Outcome of a social sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Sign-in finished on this page
    Completed(SignInResult),
    /// The page is navigating to the provider; the result arrives on the
    /// redirect-result stream after the next load
    Redirecting {
        /// Provider the redirect was started for
        provider: ProviderKind,
    },
}

impl SignInOutcome {
    /// The result, when sign-in finished on this page.
    pub fn into_result(self) -> Option<SignInResult> {
        match self {
            SignInOutcome::Completed(result) => Some(result),
            SignInOutcome::Redirecting { .. } => None,
        }
    }
}

/// Popup and redirect sign-in against the browser SDK.
pub struct WebSignIn {
    browser: Arc<dyn BrowserAuth>,
    marker: RedirectMarker,
}

impl WebSignIn {
    /// Create the adapter; `marker` is written before a redirect leaves the page.
    pub fn new(browser: Arc<dyn BrowserAuth>, marker: RedirectMarker) -> Self {
        Self { browser, marker }
    }

    /// Sign `provider` in with the given browser flow.
    ///
    /// A fresh provider request is built for every call so scopes never
    /// accumulate across sign-ins.
    pub async fn sign_in(
        &self,
        provider: ProviderKind,
        scopes: &[String],
        flow: WebFlow,
    ) -> AuthResult<SignInOutcome> {
        let request = AuthProviderRequest::new(provider.provider_id()).with_scopes(scopes.iter().cloned());

        match flow {
            WebFlow::Popup => self.popup(provider, &request).await.map(SignInOutcome::Completed),
            WebFlow::Redirect => self.redirect(provider, &request).await,
        }
    }

    async fn popup(
        &self,
        provider: ProviderKind,
        request: &AuthProviderRequest,
    ) -> AuthResult<SignInResult> {
        let result = self
            .browser
            .sign_in_with_popup(request)
            .await
            .map_err(|e| AuthError::WebAuthFailure(e.normalized()))?
            .ok_or_else(|| {
                AuthError::WebAuthFailure(format!("no result from {} popup sign in", provider))
            })?;

        let credential = (provider.entry().extract_web)(&result);
        tracing::info!(provider = %provider, uid = %result.user.uid, "Popup sign in completed");

        Ok(normalize::sign_in_result(Some(&result.user), credential.as_ref()))
    }

    async fn redirect(
        &self,
        provider: ProviderKind,
        request: &AuthProviderRequest,
    ) -> AuthResult<SignInOutcome> {
        self.marker.write(provider.provider_id());

        if let Err(e) = self.browser.sign_in_with_redirect(request).await {
            self.marker.clear();
            tracing::warn!(provider = %provider, error = %e, "Failed to start redirect sign in");
            return Err(AuthError::WebAuthFailure(e.normalized()));
        }

        tracing::info!(provider = %provider, "Redirecting to provider");
        Ok(SignInOutcome::Redirecting { provider })
    }
}

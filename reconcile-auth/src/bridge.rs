//! Identity layer interfaces
//!
//! The engine never talks to a platform directly. The native on-device
//! identity provider, the browser identity SDK and the loading indicator
//! are consumed through the traits below; hosts plug in their bindings.

use crate::error::ProviderResult;
use crate::models::{
    AuthProviderRequest, CredentialRequest, NativeAuthStateChange, NativeSignInOptions,
    NativeSignInResult, ProviderCredential, ProviderUser, UserCredential,
};
use crate::provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Callback registered with the native layer for auth state changes.
///
/// Delivery is asynchronous and may happen without any sign-in call, for
/// example when a session is restored at app launch.
pub type AuthStateListener = Arc<dyn Fn(NativeAuthStateChange) + Send + Sync>;

/// Native on-device identity bridge.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    /// Sign in with Apple on the native layer.
    async fn sign_in_with_apple(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>>;

    /// Sign in with Facebook on the native layer.
    async fn sign_in_with_facebook(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>>;

    /// Sign in with Google on the native layer.
    async fn sign_in_with_google(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>>;

    /// Sign in with Twitter on the native layer.
    async fn sign_in_with_twitter(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>>;

    /// Sign out of the native layer.
    async fn sign_out(&self) -> ProviderResult<()>;

    /// Register a listener for `authStateChange`.
    async fn add_auth_state_listener(&self, listener: AuthStateListener) -> ProviderResult<()>;

    /// Drop every registered listener.
    async fn remove_all_listeners(&self) -> ProviderResult<()>;
}

/// Browser identity SDK.
#[async_trait]
pub trait BrowserAuth: Send + Sync {
    /// Sign in through a popup window.
    ///
    /// A popup dismissed by the user resolves with a provider error.
    async fn sign_in_with_popup(
        &self,
        provider: &AuthProviderRequest,
    ) -> ProviderResult<Option<UserCredential>>;

    /// Start a full-page redirect to the provider.
    ///
    /// On a real page this never returns to the caller; the outcome is
    /// recovered with `get_redirect_result` on the next page load.
    async fn sign_in_with_redirect(&self, provider: &AuthProviderRequest) -> ProviderResult<()>;

    /// Outcome of the redirect that brought the user back to this page.
    async fn get_redirect_result(&self) -> ProviderResult<Option<UserCredential>>;

    /// Establish a browser session from an existing credential.
    async fn sign_in_with_credential(
        &self,
        credential: &ProviderCredential,
    ) -> ProviderResult<UserCredential>;

    /// Password sign-in.
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<UserCredential>;

    /// Password sign-up.
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<UserCredential>;

    /// Sign out of the browser layer.
    async fn sign_out(&self) -> ProviderResult<()>;

    /// User currently held by the SDK.
    fn current_user(&self) -> Option<ProviderUser>;

    /// Per-provider credential constructor.
    ///
    /// The default mirrors the SDK's static constructors, which reject
    /// requests missing the tokens a provider needs.
    fn build_credential(&self, request: &CredentialRequest) -> ProviderResult<ProviderCredential> {
        provider::construct_credential(request)
    }
}

/// Identifier of a presented loading indicator.
pub type LoaderId = Uuid;

/// Host-side loading indicator (a modal spinner).
#[async_trait]
pub trait LoadingPresenter: Send + Sync {
    /// Present an indicator that auto-dismisses after `duration`.
    async fn present(&self, message: &str, duration: Duration) -> ProviderResult<LoaderId>;

    /// Dismiss a presented indicator.
    async fn dismiss(&self, id: LoaderId) -> ProviderResult<()>;
}

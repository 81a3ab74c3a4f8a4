//! Authentication service
//!
//! Entry point for hosts. Wires the session listener, the strategy policy,
//! the native and web adapters and redirect recovery behind one API.

use crate::bridge::{BrowserAuth, LoadingPresenter, NativeBridge};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::loader::LoaderSlot;
use crate::models::{AuthStateChange, SessionUser, SignInResult};
use crate::native::NativeSignIn;
use crate::normalize;
use crate::profile::{self, ProfileModel, ProfileStore};
use crate::provider::ProviderKind;
use crate::query::QueryState;
use crate::redirect::{RedirectMarker, RedirectOutcome, RedirectRecovery, RedirectState};
use crate::session::SessionListener;
use crate::signout;
use crate::strategy::{select_strategy_with, Platform, SignInStrategy};
use crate::web::{SignInOutcome, WebFlow, WebSignIn};
use futures::stream::BoxStream;
use reconcile_events::Subscription;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Host bindings the service runs against.
#[derive(Clone)]
pub struct AuthLayers {
    /// Native on-device identity bridge
    pub native: Arc<dyn NativeBridge>,
    /// Browser identity SDK
    pub browser: Arc<dyn BrowserAuth>,
    /// Query string of the current page
    pub query: Arc<dyn QueryState>,
    /// Loading indicator host
    pub presenter: Arc<dyn LoadingPresenter>,
}

/// Sign-in reconciliation service.
pub struct AuthService {
    config: AuthConfig,
    platform: Platform,
    native: Arc<dyn NativeBridge>,
    browser: Arc<dyn BrowserAuth>,
    loader: Arc<LoaderSlot>,
    session: SessionListener,
    native_sign_in: NativeSignIn,
    web_sign_in: WebSignIn,
    redirect: RedirectRecovery,
    in_flight: Mutex<Option<ProviderKind>>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("session", &self.session)
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Clears the in-flight slot when a sign-in ends, however it ends.
struct InFlightGuard<'a> {
    slot: &'a Mutex<Option<ProviderKind>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

fn lock(slot: &Mutex<Option<ProviderKind>>) -> std::sync::MutexGuard<'_, Option<ProviderKind>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AuthService {
    /// Create a service for one page load.
    ///
    /// The redirect marker is read from `layers.query` here, so construct
    /// the service once per load.
    pub fn new(config: AuthConfig, platform: Platform, layers: AuthLayers) -> AuthResult<Self> {
        config.validate()?;

        let loader = Arc::new(LoaderSlot::new(
            layers.presenter.clone(),
            config.loader_duration(),
        ));
        let marker = RedirectMarker::new(layers.query.clone(), config.redirect_query_key.clone());

        let session = SessionListener::new(layers.native.clone(), config.event_capacity);
        let native_sign_in = NativeSignIn::new(layers.native.clone(), layers.browser.clone());
        let web_sign_in = WebSignIn::new(layers.browser.clone(), marker.clone());
        let redirect = RedirectRecovery::new(
            layers.browser.clone(),
            marker,
            loader.clone(),
            config.event_capacity,
        );

        tracing::debug!(platform = ?platform, "Auth service created");

        Ok(Self {
            config,
            platform,
            native: layers.native,
            browser: layers.browser,
            loader,
            session,
            native_sign_in,
            web_sign_in,
            redirect,
            in_flight: Mutex::new(None),
        })
    }

    /// Start listening for native auth state and recover a pending redirect.
    ///
    /// Subscribe to `auth_state` and `redirect_results` before calling
    /// this; neither stream replays. Redirect recovery runs even when the
    /// listener could not be registered, and the registration error is
    /// returned afterwards.
    pub async fn initialize(&self) -> AuthResult<Option<RedirectOutcome>> {
        let listener = self.session.start().await;
        let outcome = self.redirect.recover().await;

        listener?;
        Ok(outcome)
    }

    /// Platform this service was created for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Strategy social sign-ins use on this platform.
    pub fn strategy(&self) -> SignInStrategy {
        select_strategy_with(self.platform, self.config.force_popup)
    }

    /// Social sign-in with explicit scopes.
    ///
    /// Only one social sign-in may be in flight; a second call fails with
    /// `SignInInProgress` without touching either layer. The loading
    /// indicator is dismissed on every path.
    pub async fn sign_in_with(
        &self,
        provider: ProviderKind,
        scopes: &[String],
    ) -> AuthResult<SignInOutcome> {
        if !self.config.is_enabled(provider) {
            return Err(AuthError::ProviderDisabled(provider.provider_id().to_string()));
        }

        let _guard = self.begin(provider)?;
        let strategy = self.strategy();
        tracing::info!(provider = %provider, strategy = ?strategy, "Starting social sign in");

        let loader = self.loader.present(Some(provider.provider_id())).await;

        let result = match WebFlow::for_strategy(strategy) {
            None => self
                .native_sign_in
                .sign_in(provider, scopes)
                .await
                .map(SignInOutcome::Completed),
            Some(flow) => self.web_sign_in.sign_in(provider, scopes, flow).await,
        };

        self.loader.release(loader).await;

        if let Err(e) = &result {
            tracing::warn!(provider = %provider, error = %e, "Social sign in failed");
        }
        result
    }

    /// Social sign-in by provider identifier.
    pub async fn sign_in_with_provider_id(
        &self,
        provider_id: &str,
        scopes: &[String],
    ) -> AuthResult<SignInOutcome> {
        let provider = ProviderKind::parse(provider_id)
            .ok_or_else(|| AuthError::UnknownProvider(provider_id.to_string()))?;
        self.sign_in_with(provider, scopes).await
    }

    async fn sign_in_with_defaults(&self, provider: ProviderKind) -> AuthResult<SignInOutcome> {
        let scopes: Vec<String> = provider
            .default_scopes()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.sign_in_with(provider, &scopes).await
    }

    pub async fn sign_in_with_apple(&self) -> AuthResult<SignInOutcome> {
        self.sign_in_with_defaults(ProviderKind::Apple).await
    }

    pub async fn sign_in_with_facebook(&self) -> AuthResult<SignInOutcome> {
        self.sign_in_with_defaults(ProviderKind::Facebook).await
    }

    pub async fn sign_in_with_google(&self) -> AuthResult<SignInOutcome> {
        self.sign_in_with_defaults(ProviderKind::Google).await
    }

    pub async fn sign_in_with_twitter(&self) -> AuthResult<SignInOutcome> {
        self.sign_in_with_defaults(ProviderKind::Twitter).await
    }

    /// Password sign-in on the browser layer.
    ///
    /// The result never carries a credential.
    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResult<SignInResult> {
        let loader = self.loader.present(Some("email")).await;
        let result = self
            .browser
            .sign_in_with_email_and_password(email, password)
            .await;
        self.loader.release(loader).await;

        let result = result.map_err(|e| AuthError::WebAuthFailure(e.normalized()))?;
        tracing::info!(uid = %result.user.uid, "Password sign in completed");

        Ok(normalize::sign_in_result_from_user_credential(&result))
    }

    /// Password sign-up on the browser layer.
    pub async fn sign_up_with_email(&self, email: &str, password: &str) -> AuthResult<SignInResult> {
        let loader = self.loader.present(Some("email")).await;
        let result = self
            .browser
            .create_user_with_email_and_password(email, password)
            .await;
        self.loader.release(loader).await;

        let result = result.map_err(|e| AuthError::WebAuthFailure(e.normalized()))?;
        tracing::info!(uid = %result.user.uid, "Password account created");

        Ok(normalize::sign_in_result_from_user_credential(&result))
    }

    /// Sign out of the native layer, then the web layer.
    pub async fn sign_out(&self) -> AuthResult<()> {
        signout::sign_out(&*self.native, &*self.browser).await
    }

    /// Auth state changes reported by the native layer from now on.
    pub fn auth_state(&self) -> Subscription<AuthStateChange> {
        self.session.auth_state()
    }

    /// Redirect outcomes recovered on this page load.
    pub fn redirect_results(&self) -> Subscription<RedirectOutcome> {
        self.redirect.results()
    }

    /// Redirect recovery state for this page load.
    pub fn redirect_state(&self) -> RedirectState {
        self.redirect.state()
    }

    /// Last user reported by the native layer.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.current_user()
    }

    pub fn watch_current_user(&self) -> watch::Receiver<Option<SessionUser>> {
        self.session.watch_current_user()
    }

    /// Profile model stream for the browser SDK's current user.
    pub fn profile_source(&self) -> BoxStream<'static, ProfileModel> {
        profile::profile_source(&*self.browser, &self.config.placeholder_avatar_url)
    }

    /// Hand the profile source to a store.
    pub fn load_profile(&self, store: &dyn ProfileStore, delay: Option<Duration>) {
        store.load(self.profile_source(), delay);
    }

    /// Detach from the native layer and drop any loading indicator.
    pub async fn dispose(&self) {
        if let Err(e) = self.session.detach().await {
            tracing::warn!(error = %e, "Failed to remove native auth state listeners");
        }
        self.loader.dismiss().await;
        tracing::debug!("Auth service disposed");
    }

    fn begin(&self, provider: ProviderKind) -> AuthResult<InFlightGuard<'_>> {
        let mut slot = lock(&self.in_flight);
        if let Some(active) = *slot {
            tracing::warn!(provider = %provider, active = %active, "Rejecting concurrent social sign in");
            return Err(AuthError::SignInInProgress(active.provider_id().to_string()));
        }
        *slot = Some(provider);

        Ok(InFlightGuard {
            slot: &self.in_flight,
        })
    }
}

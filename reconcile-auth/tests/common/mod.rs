//! In-memory identity layers for integration tests.
//!
//! Both fakes append to a shared call log so tests can assert the order
//! in which the engine touched the native and web layers.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::BoxStream;
use reconcile_auth::{
    AuthProviderRequest, AuthStateListener, BrowserAuth, LoaderId, LoadingPresenter,
    NativeAuthStateChange, NativeBridge, NativeCredential, NativeSignInOptions,
    NativeSignInResult, OAuthCredential, ProfileModel, ProfileStore, ProviderCredential,
    ProviderError, ProviderKind, ProviderResult, ProviderUser, SessionUser, UserCredential,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

/// Ordered record of identity layer calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &CallLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Number of log entries starting with `prefix`.
pub fn count_calls(log: &CallLog, prefix: &str) -> usize {
    log.lock().unwrap().iter().filter(|e| e.starts_with(prefix)).count()
}

// ---------------------------------------------------------------------------
// Native bridge
// ---------------------------------------------------------------------------

pub struct FakeNative {
    log: CallLog,
    listeners: Mutex<Vec<AuthStateListener>>,
    results: Mutex<HashMap<String, ProviderResult<Option<NativeSignInResult>>>>,
    scopes: Mutex<Vec<Vec<String>>>,
    sign_out_error: Mutex<Option<ProviderError>>,
    listener_error: Mutex<Option<ProviderError>>,
}

impl FakeNative {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            listeners: Mutex::new(Vec::new()),
            results: Mutex::new(HashMap::new()),
            scopes: Mutex::new(Vec::new()),
            sign_out_error: Mutex::new(None),
            listener_error: Mutex::new(None),
        }
    }

    pub fn set_result(&self, provider: ProviderKind, result: ProviderResult<Option<NativeSignInResult>>) {
        self.results
            .lock()
            .unwrap()
            .insert(provider.provider_id().to_string(), result);
    }

    pub fn fail_sign_out(&self, error: ProviderError) {
        *self.sign_out_error.lock().unwrap() = Some(error);
    }

    pub fn fail_listener_registration(&self, error: ProviderError) {
        *self.listener_error.lock().unwrap() = Some(error);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn last_scopes(&self) -> Option<Vec<String>> {
        self.scopes.lock().unwrap().last().cloned()
    }

    /// Deliver an auth state change to every registered listener.
    pub fn emit(&self, user: Option<SessionUser>) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener(NativeAuthStateChange { user: user.clone() });
        }
    }

    fn sign_in(
        &self,
        provider: ProviderKind,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>> {
        record(&self.log, format!("native.sign_in:{}", provider.provider_id()));
        self.scopes.lock().unwrap().push(options.scopes.clone());

        self.results
            .lock()
            .unwrap()
            .get(provider.provider_id())
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::message("no native result configured")))
    }
}

#[async_trait]
impl NativeBridge for FakeNative {
    async fn sign_in_with_apple(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>> {
        self.sign_in(ProviderKind::Apple, options)
    }

    async fn sign_in_with_facebook(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>> {
        self.sign_in(ProviderKind::Facebook, options)
    }

    async fn sign_in_with_google(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>> {
        self.sign_in(ProviderKind::Google, options)
    }

    async fn sign_in_with_twitter(
        &self,
        options: &NativeSignInOptions,
    ) -> ProviderResult<Option<NativeSignInResult>> {
        self.sign_in(ProviderKind::Twitter, options)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        record(&self.log, "native.sign_out");
        match self.sign_out_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn add_auth_state_listener(&self, listener: AuthStateListener) -> ProviderResult<()> {
        record(&self.log, "native.add_listener");
        if let Some(error) = self.listener_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.listeners.lock().unwrap().push(listener);
        Ok(())
    }

    async fn remove_all_listeners(&self) -> ProviderResult<()> {
        record(&self.log, "native.remove_listeners");
        self.listeners.lock().unwrap().clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Browser SDK
// ---------------------------------------------------------------------------

pub struct FakeBrowser {
    log: CallLog,
    popup_result: Mutex<ProviderResult<Option<UserCredential>>>,
    popup_gate: Mutex<Option<Arc<Notify>>>,
    redirect_start_error: Mutex<Option<ProviderError>>,
    redirect_result: Mutex<ProviderResult<Option<UserCredential>>>,
    redirect_gate: Mutex<Option<Arc<Notify>>>,
    password_result: Mutex<ProviderResult<UserCredential>>,
    sign_out_error: Mutex<Option<ProviderError>>,
    current_user: Mutex<Option<ProviderUser>>,
    requests: Mutex<Vec<AuthProviderRequest>>,
    credentials: Mutex<Vec<ProviderCredential>>,
}

impl FakeBrowser {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            popup_result: Mutex::new(Ok(None)),
            popup_gate: Mutex::new(None),
            redirect_start_error: Mutex::new(None),
            redirect_result: Mutex::new(Ok(None)),
            redirect_gate: Mutex::new(None),
            password_result: Mutex::new(Err(ProviderError::new(
                "auth/user-not-found",
                "There is no user record",
            ))),
            sign_out_error: Mutex::new(None),
            current_user: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn set_popup_result(&self, result: ProviderResult<Option<UserCredential>>) {
        *self.popup_result.lock().unwrap() = result;
    }

    /// Hold `sign_in_with_popup` until the returned gate is notified.
    pub fn gate_popup(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.popup_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_redirect_start(&self, error: ProviderError) {
        *self.redirect_start_error.lock().unwrap() = Some(error);
    }

    pub fn set_redirect_result(&self, result: ProviderResult<Option<UserCredential>>) {
        *self.redirect_result.lock().unwrap() = result;
    }

    /// Hold `get_redirect_result` until the returned gate is notified.
    pub fn gate_redirect_result(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.redirect_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_password_result(&self, result: ProviderResult<UserCredential>) {
        *self.password_result.lock().unwrap() = result;
    }

    pub fn fail_sign_out(&self, error: ProviderError) {
        *self.sign_out_error.lock().unwrap() = Some(error);
    }

    pub fn set_current_user(&self, user: Option<ProviderUser>) {
        *self.current_user.lock().unwrap() = user;
    }

    pub fn requests(&self) -> Vec<AuthProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn credentials(&self) -> Vec<ProviderCredential> {
        self.credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserAuth for FakeBrowser {
    async fn sign_in_with_popup(
        &self,
        provider: &AuthProviderRequest,
    ) -> ProviderResult<Option<UserCredential>> {
        record(&self.log, format!("web.popup:{}", provider.provider_id));
        self.requests.lock().unwrap().push(provider.clone());
        let gate = self.popup_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.popup_result.lock().unwrap().clone()
    }

    async fn sign_in_with_redirect(&self, provider: &AuthProviderRequest) -> ProviderResult<()> {
        record(&self.log, format!("web.redirect:{}", provider.provider_id));
        self.requests.lock().unwrap().push(provider.clone());
        match self.redirect_start_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn get_redirect_result(&self) -> ProviderResult<Option<UserCredential>> {
        record(&self.log, "web.get_redirect_result");
        let gate = self.redirect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.redirect_result.lock().unwrap().clone()
    }

    async fn sign_in_with_credential(
        &self,
        credential: &ProviderCredential,
    ) -> ProviderResult<UserCredential> {
        record(&self.log, format!("web.credential:{}", credential.provider_id()));
        self.credentials.lock().unwrap().push(credential.clone());

        let user = provider_user("web-uid", credential.provider_id());
        *self.current_user.lock().unwrap() = Some(user.clone());

        Ok(UserCredential {
            user,
            provider_id: Some(credential.provider_id().to_string()),
            credential: Some(credential.clone()),
        })
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        _password: &str,
    ) -> ProviderResult<UserCredential> {
        record(&self.log, format!("web.password:{}", email));
        self.password_result.lock().unwrap().clone()
    }

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        _password: &str,
    ) -> ProviderResult<UserCredential> {
        record(&self.log, format!("web.create_user:{}", email));
        self.password_result.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        record(&self.log, "web.sign_out");
        match self.sign_out_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn current_user(&self) -> Option<ProviderUser> {
        self.current_user.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Loading indicator and profile store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingPresenter {
    log: Mutex<Vec<String>>,
    active: Mutex<Vec<LoaderId>>,
}

impl RecordingPresenter {
    pub fn messages(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.strip_prefix("present ").map(str::to_string))
            .collect()
    }

    pub fn dismiss_count(&self) -> usize {
        self.log.lock().unwrap().iter().filter(|e| *e == "dismiss").count()
    }

    /// Indicators presented and not yet dismissed.
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }
}

#[async_trait]
impl LoadingPresenter for RecordingPresenter {
    async fn present(&self, message: &str, _duration: Duration) -> ProviderResult<LoaderId> {
        let id = Uuid::now_v7();
        self.log.lock().unwrap().push(format!("present {}", message));
        self.active.lock().unwrap().push(id);
        Ok(id)
    }

    async fn dismiss(&self, id: LoaderId) -> ProviderResult<()> {
        self.log.lock().unwrap().push("dismiss".to_string());
        self.active.lock().unwrap().retain(|active| *active != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingProfileStore {
    loaded: Mutex<Option<(BoxStream<'static, ProfileModel>, Option<Duration>)>>,
}

impl RecordingProfileStore {
    pub fn take(&self) -> Option<(BoxStream<'static, ProfileModel>, Option<Duration>)> {
        self.loaded.lock().unwrap().take()
    }
}

impl ProfileStore for RecordingProfileStore {
    fn load(&self, source: BoxStream<'static, ProfileModel>, delay: Option<Duration>) {
        *self.loaded.lock().unwrap() = Some((source, delay));
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn provider_user(uid: &str, provider_id: &str) -> ProviderUser {
    ProviderUser {
        uid: uid.to_string(),
        display_name: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        email_verified: true,
        provider_id: provider_id.to_string(),
        photo_url: Some("https://lh3.googleusercontent.com/a/photo=s96-c".to_string()),
        refresh_token: Some("refresh-token".to_string()),
        ..Default::default()
    }
}

pub fn session_user(uid: &str) -> SessionUser {
    SessionUser {
        uid: uid.to_string(),
        display_name: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        email_verified: true,
        is_anonymous: false,
        phone_number: None,
        photo_url: None,
        provider_id: "google.com".to_string(),
        tenant_id: None,
    }
}

/// Native result carrying every token field.
pub fn native_result(provider: ProviderKind) -> NativeSignInResult {
    NativeSignInResult {
        user: Some(session_user("native-uid")),
        credential: Some(NativeCredential {
            provider_id: provider.provider_id().to_string(),
            access_token: Some(format!("{}-access", provider.display_name().to_lowercase())),
            id_token: Some(format!("{}-id", provider.display_name().to_lowercase())),
            nonce: Some("raw-nonce".to_string()),
            secret: Some(format!("{}-secret", provider.display_name().to_lowercase())),
        }),
    }
}

/// Web sign-in result with a full OAuth credential for `provider`.
pub fn oauth_user_credential(provider: ProviderKind) -> UserCredential {
    let provider_id = provider.provider_id().to_string();

    UserCredential {
        user: provider_user("web-uid", &provider_id),
        provider_id: Some(provider_id.clone()),
        credential: Some(ProviderCredential::OAuth(OAuthCredential {
            provider_id: provider_id.clone(),
            sign_in_method: provider_id,
            access_token: Some("web-access".to_string()),
            id_token: Some("web-id".to_string()),
            secret: Some("web-secret".to_string()),
            raw_nonce: None,
        })),
    }
}

/// Password sign-in result; the SDK reports a non-OAuth credential.
pub fn password_user_credential(email: &str) -> UserCredential {
    UserCredential {
        user: ProviderUser {
            email: Some(email.to_string()),
            ..provider_user("password-uid", "password")
        },
        provider_id: None,
        credential: Some(ProviderCredential::Other {
            provider_id: "password".to_string(),
            sign_in_method: "password".to_string(),
        }),
    }
}

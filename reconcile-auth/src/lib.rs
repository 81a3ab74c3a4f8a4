//! # Reconcile Auth
//!
//! Keeps a native on-device identity layer and a browser identity SDK
//! signed in to the same account, whichever of them starts the sign-in.
//!
//! ## Overview
//!
//! The reconcile-auth crate handles:
//! - **Session tracking**: native auth state republished on a multicast stream
//! - **Strategy selection**: native bridge, popup or redirect per platform
//! - **Native sign-in**: native credential converted into a browser session
//! - **Web sign-in**: popup and full-page redirect flows
//! - **Redirect recovery**: pending-redirect marker carried across a reload
//! - **Normalization**: one `{user, credential}` shape for every path
//! - **Sign-out**: native first, then web
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reconcile_auth::{AuthConfig, AuthLayers, AuthService, Platform, PlatformFlags};
//!
//! async fn example(layers: AuthLayers) -> reconcile_auth::AuthResult<()> {
//!     let platform = Platform::detect(PlatformFlags {
//!         is_desktop: true,
//!         ..Default::default()
//!     });
//!     let service = AuthService::new(AuthConfig::from_env(), platform, layers)?;
//!
//!     // Subscribe before initializing; streams never replay
//!     let mut redirects = service.redirect_results();
//!     let mut auth_state = service.auth_state();
//!     service.initialize().await?;
//!
//!     let outcome = service.sign_in_with_google().await?;
//!     println!("{:?}", outcome);
//!
//!     let _ = (redirects.try_recv(), auth_state.try_recv());
//!     service.sign_out().await
//! }
//! ```
//!
//! ## Host Bindings
//!
//! The engine reaches its environment only through traits:
//! - `NativeBridge`: the on-device identity plugin
//! - `BrowserAuth`: the browser identity SDK
//! - `QueryState`: the page URL's query string
//! - `LoadingPresenter`: the modal loading indicator
//! - `ProfileStore`: the profile screen's state holder

pub mod bridge;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod native;
pub mod normalize;
pub mod profile;
pub mod provider;
pub mod query;
pub mod redirect;
pub mod service;
pub mod session;
pub mod signout;
pub mod strategy;
pub mod web;

// Re-export main types
pub use bridge::{AuthStateListener, BrowserAuth, LoaderId, LoadingPresenter, NativeBridge};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, ErrorPayload, ProviderError, ProviderResult};
pub use loader::{loading_message, LoaderSlot};
pub use models::{
    AuthProviderRequest, AuthStateChange, Credential, CredentialRequest, NativeAuthStateChange,
    NativeCredential, NativeSignInOptions, NativeSignInResult, OAuthCredential,
    ProviderCredential, ProviderUser, ProviderUserMetadata, SessionUser, SignInResult,
    UserCredential,
};
pub use native::NativeSignIn;
pub use profile::{ProfileModel, ProfileStore};
pub use provider::{ProviderEntry, ProviderKind};
pub use query::{QueryState, UrlQueryState};
pub use redirect::{RedirectMarker, RedirectOutcome, RedirectRecovery, RedirectState};
pub use service::{AuthLayers, AuthService};
pub use session::SessionListener;
pub use signout::SIGN_OUT_SUCCESS;
pub use strategy::{select_strategy, select_strategy_with, Platform, PlatformFlags, SignInStrategy};
pub use web::{SignInOutcome, WebFlow, WebSignIn};

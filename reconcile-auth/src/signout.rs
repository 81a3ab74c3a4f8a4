//! Two-phase sign-out
//!
//! The native layer signs out first. The web layer is only touched after
//! the native layer succeeded, so a native failure leaves both sessions
//! as they were.

use crate::bridge::{BrowserAuth, NativeBridge};
use crate::error::{AuthError, AuthResult};

/// Message logged after both layers signed out.
pub const SIGN_OUT_SUCCESS: &str = "Successfully sign out from native and web";

/// Sign out of the native layer, then the web layer.
///
/// A web failure after a native success leaves the layers diverged
/// (native signed out, web signed in); the error says which phase failed.
pub async fn sign_out(native: &dyn NativeBridge, browser: &dyn BrowserAuth) -> AuthResult<()> {
    if let Err(e) = native.sign_out().await {
        tracing::error!(error = %e, "Native auth sign out error");
        return Err(AuthError::NativeSignOutFailure(e.normalized()));
    }

    if let Err(e) = browser.sign_out().await {
        tracing::error!(error = %e, "Web auth sign out error");
        return Err(AuthError::WebSignOutFailure(e.normalized()));
    }

    tracing::info!("{}", SIGN_OUT_SUCCESS);
    Ok(())
}

//! Profile data source
//!
//! Turns the browser SDK's current user into the model a profile screen
//! renders. Missing fields become prompt text and provider photo URLs are
//! rewritten to their large variants.

use crate::bridge::BrowserAuth;
use crate::models::SessionUser;
use crate::normalize;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NAME_PROMPT: &str = "What's your name?";
const ROLE_PROMPT: &str = "How would you describe yourself?";
const DESCRIPTION_PROMPT: &str = "Anything else you would like to share with the world?";
const PHONE_PROMPT: &str = "Is there a number where I can reach you?";
const EMAIL_PROMPT: &str = "Where can I send you emails?";

/// Provider label shown for password accounts.
pub const PASSWORD_PROVIDER_LABEL: &str = "Credentials";

/// Profile screen model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileModel {
    pub image: Option<String>,
    pub name: String,
    pub role: String,
    pub description: String,
    pub phone_number: String,
    pub email: String,
    pub provider: String,
    /// Placeholder shown while the real profile loads
    pub is_shell: bool,
}

impl ProfileModel {
    /// Empty placeholder model.
    pub fn shell() -> Self {
        Self {
            is_shell: true,
            ..Default::default()
        }
    }

    /// Build the model for a signed-in user.
    pub fn from_session_user(user: &SessionUser, placeholder_avatar: &str) -> Self {
        let provider = if user.provider_id == "password" {
            PASSWORD_PROVIDER_LABEL.to_string()
        } else {
            user.provider_id.clone()
        };

        Self {
            image: photo_url(&user.provider_id, user.photo_url.as_deref(), placeholder_avatar),
            name: user.display_name.clone().unwrap_or_else(|| NAME_PROMPT.to_string()),
            role: ROLE_PROMPT.to_string(),
            description: DESCRIPTION_PROMPT.to_string(),
            phone_number: user
                .phone_number
                .clone()
                .unwrap_or_else(|| PHONE_PROMPT.to_string()),
            email: user.email.clone().unwrap_or_else(|| EMAIL_PROMPT.to_string()),
            provider,
            is_shell: false,
        }
    }
}

/// Large variant of a provider photo URL.
///
/// Password accounts always get the placeholder avatar.
pub fn photo_url(provider_id: &str, url: Option<&str>, placeholder_avatar: &str) -> Option<String> {
    if provider_id == "password" {
        return Some(placeholder_avatar.to_string());
    }

    let url = url?;
    let enlarged = match provider_id {
        "facebook.com" => format!("{}?height=400", url),
        "twitter.com" => url.replace("_normal", "_400x400"),
        "google.com" => url.split('=').next().unwrap_or(url).to_string(),
        _ => url.to_string(),
    };

    Some(enlarged)
}

/// Receives a profile source and shows it, optionally after a delay.
pub trait ProfileStore: Send + Sync {
    fn load(&self, source: BoxStream<'static, ProfileModel>, delay: Option<Duration>);
}

/// Stream of profile models for the SDK's current user.
///
/// The current user is read once, when this is called. A signed-out SDK
/// yields an empty stream.
pub fn profile_source(browser: &dyn BrowserAuth, placeholder_avatar: &str) -> BoxStream<'static, ProfileModel> {
    let model = normalize::user_from_provider_user(browser.current_user().as_ref())
        .map(|user| ProfileModel::from_session_user(&user, placeholder_avatar));

    stream::iter(model).boxed()
}

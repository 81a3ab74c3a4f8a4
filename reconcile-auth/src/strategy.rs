//! Sign-in strategy selection
//!
//! Picks how a social sign-in runs on the current platform. Native apps
//! go through the native bridge, desktop browsers use a popup, and every
//! other browser context (mobile web, installed PWA) uses a full-page
//! redirect since popups are blocked or awkward on touch browsers.

use serde::{Deserialize, Serialize};

/// Runtime platform classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Packaged native app with the identity bridge available
    NativeApp,
    /// Desktop browser with a multi-window UI
    DesktopWeb,
    /// Mobile or tablet browser
    MobileWeb,
    /// Web app installed to a home screen
    InstalledPwa,
}

impl Platform {
    /// Classify from host capability flags.
    ///
    /// The native flag wins over everything; a desktop flag only counts
    /// when the app is not running standalone.
    pub fn detect(flags: PlatformFlags) -> Self {
        if flags.is_native {
            Platform::NativeApp
        } else if flags.is_standalone {
            Platform::InstalledPwa
        } else if flags.is_desktop {
            Platform::DesktopWeb
        } else {
            Platform::MobileWeb
        }
    }

    /// Whether the app runs inside a browser.
    pub fn is_web(&self) -> bool {
        !matches!(self, Platform::NativeApp)
    }
}

/// Capability flags reported by the host runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFlags {
    /// Running inside the native container
    pub is_native: bool,
    /// Desktop form factor
    pub is_desktop: bool,
    /// Launched as an installed web app
    pub is_standalone: bool,
}

/// How a social sign-in is carried out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignInStrategy {
    /// Native bridge sign-in, then a browser session from its credential
    NativeBridge,
    /// Browser popup window
    Popup,
    /// Full-page redirect, recovered on the next page load
    Redirect,
}

/// Pick the strategy for a platform.
pub fn select_strategy(platform: Platform) -> SignInStrategy {
    match platform {
        Platform::NativeApp => SignInStrategy::NativeBridge,
        Platform::DesktopWeb => SignInStrategy::Popup,
        Platform::MobileWeb | Platform::InstalledPwa => SignInStrategy::Redirect,
    }
}

/// Pick the strategy, optionally forcing popups on every web platform.
pub fn select_strategy_with(platform: Platform, force_popup: bool) -> SignInStrategy {
    match select_strategy(platform) {
        SignInStrategy::Redirect if force_popup => SignInStrategy::Popup,
        strategy => strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_policy() {
        assert_eq!(select_strategy(Platform::NativeApp), SignInStrategy::NativeBridge);
        assert_eq!(select_strategy(Platform::DesktopWeb), SignInStrategy::Popup);
        assert_eq!(select_strategy(Platform::MobileWeb), SignInStrategy::Redirect);
        assert_eq!(select_strategy(Platform::InstalledPwa), SignInStrategy::Redirect);
    }

    #[test]
    fn test_force_popup_never_affects_native() {
        assert_eq!(
            select_strategy_with(Platform::NativeApp, true),
            SignInStrategy::NativeBridge
        );
        assert_eq!(
            select_strategy_with(Platform::MobileWeb, true),
            SignInStrategy::Popup
        );
        assert_eq!(
            select_strategy_with(Platform::MobileWeb, false),
            SignInStrategy::Redirect
        );
    }

    #[test]
    fn test_detect() {
        let native = PlatformFlags {
            is_native: true,
            is_desktop: true,
            is_standalone: false,
        };
        assert_eq!(Platform::detect(native), Platform::NativeApp);

        let desktop = PlatformFlags {
            is_desktop: true,
            ..Default::default()
        };
        assert_eq!(Platform::detect(desktop), Platform::DesktopWeb);

        let pwa = PlatformFlags {
            is_desktop: true,
            is_standalone: true,
            ..Default::default()
        };
        assert_eq!(Platform::detect(pwa), Platform::InstalledPwa);

        assert_eq!(Platform::detect(PlatformFlags::default()), Platform::MobileWeb);
        assert!(!Platform::NativeApp.is_web());
    }
}

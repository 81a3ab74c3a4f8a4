//! URL query-state channel
//!
//! The redirect marker survives a full page navigation by living in the
//! navigable URL's query string. `QueryState` abstracts any key-value
//! slot that is addressable before and after a reload; `UrlQueryState`
//! is the in-memory URL implementation.

use std::sync::Mutex;

/// Key-value slot that survives a page reload.
pub trait QueryState: Send + Sync {
    /// Read a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove a key. Other keys are untouched.
    fn remove(&self, key: &str);
}

/// Navigable URL whose query string is the persistence channel.
///
/// Writes replace the current history entry rather than pushing a new one.
#[derive(Debug)]
pub struct UrlQueryState {
    location: Mutex<Location>,
}

#[derive(Debug, Clone)]
struct Location {
    path: String,
    params: Vec<(String, String)>,
    fragment: Option<String>,
}

impl Location {
    fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let params = serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unparseable query string");
            Vec::new()
        });

        Self {
            path: path.to_string(),
            params,
            fragment,
        }
    }

    fn render(&self) -> String {
        let mut url = self.path.clone();

        if !self.params.is_empty() {
            // Pairs of strings always encode
            let query = serde_urlencoded::to_string(&self.params).unwrap_or_default();
            url.push('?');
            url.push_str(&query);
        }

        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }

        url
    }
}

impl UrlQueryState {
    /// Start from a URL such as `/auth/sign-in?next=profile`.
    pub fn new(url: &str) -> Self {
        Self {
            location: Mutex::new(Location::parse(url)),
        }
    }

    /// Current URL, path plus query plus fragment.
    pub fn url(&self) -> String {
        self.lock().render()
    }

    /// Path without query or fragment.
    pub fn path(&self) -> String {
        self.lock().path.clone()
    }

    /// Simulate a reload: the URL survives, everything else is rebuilt.
    pub fn reload(&self) -> Self {
        Self::new(&self.url())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Location> {
        // A poisoned lock still holds a consistent location
        self.location
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl QueryState for UrlQueryState {
    fn get(&self, key: &str) -> Option<String> {
        self.lock()
            .params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        let mut location = self.lock();
        location.params.retain(|(k, _)| k != key);
        location.params.push((key.to_string(), value.to_string()));
    }

    fn remove(&self, key: &str) {
        self.lock().params.retain(|(k, _)| k != key);
    }
}

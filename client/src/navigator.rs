//! Location and navigation seam.
//!
//! The session client needs to know where the visitor is (for the locale and
//! to avoid redirect loops on the login page) and to send them elsewhere.

use std::sync::Mutex;

pub trait Navigator: Send + Sync {
    /// Current location path, e.g. `/ar/feed`.
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}

/// Navigator that only tracks a location and its history.
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self { history: Mutex::new(vec![start.to_owned()]) }
    }

    /// Every location visited, starting with the initial one.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Locations navigated to after the initial one.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.history().into_iter().skip(1).collect()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(%path, "navigate");
        self.history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_owned());
    }
}

/// Whether `path` is a login page, where forced redirects are suppressed.
#[must_use]
pub fn is_login_path(path: &str) -> bool {
    path.contains("/login")
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

//! Auth-session state for the current visitor.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware views to coordinate login redirects
//! and identity-dependent rendering. The owner calls [`SessionController::mount`]
//! once and [`SessionController::route_changed`] on every navigation; both
//! refetch the session through the fetch wrapper.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use envelope::{Locale, SessionUser};

use crate::navigator::is_login_path;
use crate::net::api::ApiClient;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Send visitors without a session to the login page.
    pub required: bool,
}

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

#[derive(Debug, Default)]
struct Inner {
    auth: AuthState,
    last_path: Option<String>,
}

pub struct SessionController {
    client: ApiClient,
    options: SessionOptions,
    inner: Mutex<Inner>,
}

impl SessionController {
    /// Starts out loading with no user.
    #[must_use]
    pub fn new(client: ApiClient, options: SessionOptions) -> Self {
        Self { client, options, inner: Mutex::new(Inner::default()) }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.lock().auth.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.lock().auth.user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().auth.loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().auth.user.is_some()
    }

    /// Fetch the session for the current location.
    pub async fn mount(&self) {
        let path = self.client.navigator().current_path();
        self.lock().last_path = Some(path);
        self.refetch().await;
    }

    /// Refetch when `path` differs from the last location seen. Returns
    /// whether a fetch happened.
    pub async fn route_changed(&self, path: &str) -> bool {
        {
            let mut inner = self.lock();
            if inner.last_path.as_deref() == Some(path) {
                return false;
            }
            inner.last_path = Some(path.to_owned());
        }
        self.refetch().await;
        true
    }

    /// Reload the current user.
    ///
    /// An authentication failure clears the user. Any other failure is logged
    /// and leaves the previous user in place.
    pub async fn refetch(&self) {
        self.lock().auth.loading = true;
        let result = self.client.get_session().await;

        let signed_out = {
            let mut inner = self.lock();
            inner.auth.loading = false;
            match result {
                Ok(user) => {
                    inner.auth.user = user;
                    inner.auth.user.is_none()
                }
                Err(e) => {
                    tracing::error!(error = %e, "session fetch failed");
                    false
                }
            }
        };

        if signed_out && self.options.required {
            self.redirect_to_login();
        }
    }

    /// End the session and go to the login page, whether or not the backend
    /// acknowledged the logout. Neither this nor the `required` redirect
    /// navigates when the visitor is already on a login page.
    pub async fn logout(&self) {
        match self.client.logout().await {
            Ok(response) if !response.is_success() => {
                tracing::warn!(status = response.status(), "logout rejected");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "logout failed"),
        }
        self.lock().auth.user = None;
        self.redirect_to_login();
    }

    fn redirect_to_login(&self) {
        let navigator = self.client.navigator();
        let current = navigator.current_path();
        if is_login_path(&current) {
            return;
        }
        navigator.navigate(&Locale::from_path(&current).login_path());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Single-flight token refresh.
//!
//! DESIGN
//! ======
//! Each `ApiClient` owns one `RefreshCoordinator`. While a refresh is in
//! flight, the slot holds a shared handle to it; every caller that hits a 401
//! in the meantime awaits that same handle instead of starting another call.
//! The refresh future empties the slot itself just before it resolves, so the
//! waiters wake to an idle coordinator and a later 401 starts a fresh attempt.
//!
//! Only one refresh request is ever outstanding. Without this, N concurrent
//! 401s would each rotate the refresh token and invalidate one another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// Result of one refresh attempt, observed identically by every waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New tokens were issued; the original call may be retried.
    Refreshed,
    /// The visitor had no refresh token. Not an error, so no redirect.
    NoRefreshToken,
    /// Refresh was rejected or never reached the backend. Credentials were
    /// cleared and the visitor redirected to login.
    Failed,
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_refreshed(self) -> bool {
        matches!(self, Self::Refreshed)
    }
}

type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
pub struct RefreshCoordinator {
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

fn lock(slot: &Mutex<Option<InFlight>>) -> MutexGuard<'_, Option<InFlight>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    /// Join the in-flight refresh, or start one with `start` if none is running.
    ///
    /// `start` is invoked only when this call becomes the leader.
    pub async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let shared = {
            let mut slot = lock(&self.in_flight);
            if let Some(existing) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let attempt = start();
                let release = Arc::clone(&self.in_flight);
                let shared = async move {
                    let outcome = attempt.await;
                    lock(&release).take();
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(shared.clone());
                shared
            }
        };
        shared.await
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

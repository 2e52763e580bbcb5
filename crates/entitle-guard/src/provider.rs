//! In-process entitlement provider.
//!
//! The session provider owns the principal and refreshes it on login,
//! on token refresh, or after a permissions fetch. Guards never talk to
//! it directly; they read [`ProviderSnapshot`]s from a
//! [`tokio::sync::watch`] channel.
//!
//! ```text
//!   new() ──► loading ──resolve(p)──► ready(p) ──invalidate()──► loading
//!                 │                                                │
//!                 └──fail(e)──► ready(empty, error) ◄──────────────┘
//! ```
//!
//! A failed load resolves to an empty principal instead of staying in
//! loading, so guards settle on "denied" rather than spin forever.

use entitle_auth::Principal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Immutable view of provider state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSnapshot {
    /// Entitlements are being (re)loaded.
    pub loading: bool,
    /// Current principal. Empty while nothing has resolved.
    pub principal: Arc<Principal>,
    /// Incremented on every resolve or failure.
    pub generation: u64,
    /// Last load failure, if the current principal came from one.
    pub error: Option<String>,
}

impl ProviderSnapshot {
    /// A snapshot that has not resolved yet.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            loading: true,
            principal: Arc::new(Principal::new()),
            generation: 0,
            error: None,
        }
    }

    /// A resolved snapshot, for callers that already hold a principal.
    #[must_use]
    pub fn ready(principal: Principal) -> Self {
        Self {
            loading: false,
            principal: Arc::new(principal),
            generation: 1,
            error: None,
        }
    }
}

/// Publishes principal snapshots to guards.
#[derive(Debug)]
pub struct EntitlementProvider {
    tx: watch::Sender<ProviderSnapshot>,
}

impl EntitlementProvider {
    /// Creates a provider in the loading state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProviderSnapshot::loading());
        Self { tx }
    }

    /// Publishes a freshly loaded principal.
    pub fn resolve(&self, principal: Principal) {
        self.tx.send_modify(|s| {
            s.loading = false;
            s.principal = Arc::new(principal);
            s.generation += 1;
            s.error = None;
            debug!(generation = s.generation, principal = %s.principal, "entitlements resolved");
        });
    }

    /// Records a load failure. Guards see an empty principal.
    pub fn fail(&self, error: impl Into<String>) {
        let error = error.into();
        self.tx.send_modify(|s| {
            s.loading = false;
            s.principal = Arc::new(Principal::new());
            s.generation += 1;
            warn!(generation = s.generation, error = %error, "entitlement load failed, nothing granted");
            s.error = Some(error);
        });
    }

    /// Marks entitlements stale. Guards fall back to the placeholder
    /// until the next resolve or failure.
    pub fn invalidate(&self) {
        self.tx.send_modify(|s| {
            s.loading = true;
            debug!(generation = s.generation, "entitlements invalidated");
        });
    }

    /// Subscribes to snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProviderSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ProviderSnapshot {
        self.tx.borrow().clone()
    }
}

impl Default for EntitlementProvider {
    fn default() -> Self {
        Self::new()
    }
}

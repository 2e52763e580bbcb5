//! The guard state machine.

use crate::notify::{DenialNotice, Notifier, TracingNotifier};
use crate::provider::ProviderSnapshot;
use crate::rule::{GuardOutcome, GuardSpec, OnDeny, Redirect};
use crate::GuardState;
use entitle_auth::{AccessDenied, AccessPolicy, Decision, DefaultPolicy};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

/// Shared mount flag.
///
/// Clone it out of a guard before handing the guard to a task; calling
/// [`unmount`](Self::unmount) from anywhere stops the guard from
/// transitioning or notifying again.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Marks the guard unmounted.
    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Returns `true` until [`unmount`](Self::unmount) is called.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Enforces a [`GuardSpec`] against provider snapshots.
///
/// One `Guard` corresponds to one mounted surface (a route, a workspace,
/// a button). It holds the only per-instance state the lifecycle needs:
/// the current [`GuardState`], the set of denial reasons already
/// notified, and whether a misconfiguration was already reported.
///
/// # Example
///
/// ```
/// use entitle_auth::Principal;
/// use entitle_guard::{Guard, GuardOutcome, GuardSpec, GuardState, OnDeny, ProviderSnapshot};
///
/// let mut guard = Guard::new("campaigns", GuardSpec::feature(["CAMPAIGN_VIEW"]))
///     .at("/campaigns")
///     .on_deny(OnDeny::Redirect { to: "/no-access".into() });
///
/// assert_eq!(guard.evaluate(&ProviderSnapshot::loading()), GuardOutcome::Placeholder);
///
/// let outcome = guard.evaluate(&ProviderSnapshot::ready(Principal::new()));
/// assert_eq!(guard.state(), GuardState::Denied);
/// match outcome {
///     GuardOutcome::Redirect(r) => {
///         assert_eq!(r.location(), "/no-access?reason=feature&from=%2Fcampaigns");
///     }
///     other => panic!("expected redirect, got {other:?}"),
/// }
/// ```
pub struct Guard {
    name: String,
    spec: GuardSpec,
    on_deny: OnDeny,
    path: String,
    policy: Arc<dyn AccessPolicy>,
    notifier: Arc<dyn Notifier>,
    state: GuardState,
    last: GuardOutcome,
    notified: HashSet<AccessDenied>,
    misconfiguration_reported: bool,
    mount: MountHandle,
}

impl Guard {
    /// Creates a mounted guard in [`GuardState::Loading`].
    ///
    /// Defaults: inline fallback on deny, path `/`, [`DefaultPolicy`],
    /// [`TracingNotifier`].
    #[must_use]
    pub fn new(name: impl Into<String>, spec: GuardSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            on_deny: OnDeny::default(),
            path: "/".into(),
            policy: Arc::new(DefaultPolicy),
            notifier: Arc::new(TracingNotifier),
            state: GuardState::Loading,
            last: GuardOutcome::Placeholder,
            notified: HashSet::new(),
            misconfiguration_reported: false,
            mount: MountHandle::new(),
        }
    }

    /// Sets the route this guard sits on (used as `from` in redirects).
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the denial strategy.
    #[must_use]
    pub fn on_deny(mut self, on_deny: OnDeny) -> Self {
        self.on_deny = on_deny;
        self
    }

    /// Replaces the access policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Guard name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current declaration.
    #[must_use]
    pub fn spec(&self) -> &GuardSpec {
        &self.spec
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Handle for unmounting from elsewhere.
    #[must_use]
    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    /// Unmounts this guard.
    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Swaps the declaration, e.g. after navigating to another route.
    ///
    /// The next [`evaluate`](Self::evaluate) recomputes from scratch.
    /// Reasons already notified stay latched.
    pub fn set_spec(&mut self, spec: GuardSpec) {
        if self.spec != spec {
            debug!(guard = %self.name, from = %self.spec, to = %spec, "guard spec changed");
            self.spec = spec;
            self.state = GuardState::Loading;
            self.last = GuardOutcome::Placeholder;
            self.misconfiguration_reported = false;
        }
    }

    /// Moves the guard to another route.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Evaluates the guard against one provider snapshot.
    ///
    /// - Provider loading → [`GuardOutcome::Placeholder`]; the policy is
    ///   not consulted.
    /// - Unusable declaration → [`GuardOutcome::Misconfigured`], logged
    ///   once.
    /// - Denied → fallback or redirect per [`OnDeny`]; the notifier
    ///   fires once per distinct reason.
    ///
    /// After unmount, returns the last outcome unchanged.
    pub fn evaluate(&mut self, snapshot: &ProviderSnapshot) -> GuardOutcome {
        if !self.mount.is_mounted() {
            return self.last.clone();
        }

        let outcome = if snapshot.loading {
            GuardOutcome::Placeholder
        } else {
            match self
                .spec
                .decide(&self.name, self.policy.as_ref(), &snapshot.principal)
            {
                Ok(Decision::Allowed(_)) => GuardOutcome::Content,
                Ok(Decision::Denied(reason)) => self.deny(reason),
                Err(err) => {
                    if !self.misconfiguration_reported {
                        self.misconfiguration_reported = true;
                        error!(guard = %self.name, spec = %self.spec, path = %self.path, "{err}");
                    }
                    GuardOutcome::Misconfigured(err)
                }
            }
        };

        let state = outcome.state();
        if state != self.state {
            debug!(guard = %self.name, from = %self.state, to = %state, "guard transition");
        }
        self.state = state;
        self.last = outcome.clone();
        outcome
    }

    fn deny(&mut self, reason: AccessDenied) -> GuardOutcome {
        if self.notified.insert(reason.clone()) {
            self.notifier.notify(&DenialNotice {
                guard: self.name.clone(),
                path: self.path.clone(),
                reason: reason.clone(),
            });
        }

        match &self.on_deny {
            OnDeny::Fallback => GuardOutcome::Fallback(reason),
            OnDeny::Redirect { to } => GuardOutcome::Redirect(Redirect {
                to: to.clone(),
                reason,
                from: self.path.clone(),
            }),
        }
    }

    /// Waits until the provider is no longer loading, then evaluates.
    ///
    /// Returns `None` if the guard is unmounted before or while waiting,
    /// or if the provider goes away.
    pub async fn settle(
        &mut self,
        rx: &mut watch::Receiver<ProviderSnapshot>,
    ) -> Option<GuardOutcome> {
        if !self.mount.is_mounted() {
            return None;
        }

        let snapshot = match rx.wait_for(|s| !s.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => {
                debug!(guard = %self.name, "provider dropped before entitlements resolved");
                return None;
            }
        };

        if !self.mount.is_mounted() {
            debug!(guard = %self.name, "unmounted while loading, skipping evaluation");
            return None;
        }

        Some(self.evaluate(&snapshot))
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("on_deny", &self.on_deny)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("mounted", &self.mount.is_mounted())
            .finish_non_exhaustive()
    }
}

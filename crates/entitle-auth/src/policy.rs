//! Access policy trait.
//!
//! The free functions in [`decision`](crate::decision) are the rules.
//! [`AccessPolicy`] is the seam where callers plug those rules into a
//! running console: guards and the navigation filter hold a
//! `&dyn AccessPolicy` rather than calling the functions directly, so a
//! deployment can swap in its own policy (or a test double).
//!
//! # Architecture
//!
//! ```text
//! AccessPolicy trait (entitle-auth)
//!          │
//!          ├── DefaultPolicy            <- engine rules + audit logging
//!          │
//!          └── custom impls (tests, kiosk mode, ...)
//! ```

use crate::decision::{explain, explain_perms, Decision, MatchPolicy};
use crate::{Principal, Requirement};
use entitle_types::CapabilityKey;

/// Abstract access policy.
///
/// # Example
///
/// ```
/// use entitle_auth::{AccessPolicy, AllowReason, CapabilityKey, Decision, MatchPolicy, Principal, Requirement};
///
/// struct OpenDoor;
///
/// impl AccessPolicy for OpenDoor {
///     fn check_feature(&self, _: &Principal, _: Option<&Requirement>) -> Decision {
///         Decision::Allowed(AllowReason::Bypass)
///     }
///
///     fn check_perms(&self, _: &Principal, _: &[CapabilityKey], _: MatchPolicy) -> Decision {
///         Decision::Allowed(AllowReason::Bypass)
///     }
/// }
///
/// let policy = OpenDoor;
/// assert!(policy.can_use_feature(&Principal::new(), Some(&Requirement::features(["x"]))));
/// ```
pub trait AccessPolicy: Send + Sync {
    /// Decides a feature requirement.
    fn check_feature(&self, principal: &Principal, requirement: Option<&Requirement>) -> Decision;

    /// Decides a permission-code list, using the principal as lookup.
    fn check_perms(
        &self,
        principal: &Principal,
        perms: &[CapabilityKey],
        policy: MatchPolicy,
    ) -> Decision;

    /// Boolean form of [`check_feature`](Self::check_feature).
    fn can_use_feature(&self, principal: &Principal, requirement: Option<&Requirement>) -> bool {
        self.check_feature(principal, requirement).is_allowed()
    }

    /// Boolean form of [`check_perms`](Self::check_perms).
    fn has_required_perms(
        &self,
        principal: &Principal,
        perms: &[CapabilityKey],
        policy: MatchPolicy,
    ) -> bool {
        self.check_perms(principal, perms, policy).is_allowed()
    }
}

/// The standard policy: engine rules plus audit logging.
///
/// Allows log at `debug`, denials at `info`. Neither is a warning: a
/// denial is a normal answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl AccessPolicy for DefaultPolicy {
    fn check_feature(&self, principal: &Principal, requirement: Option<&Requirement>) -> Decision {
        let decision = explain(principal, requirement);

        // Audit logging
        match &decision {
            Decision::Allowed(reason) => tracing::debug!(
                principal = %principal,
                reason = ?reason,
                "feature allowed"
            ),
            Decision::Denied(denied) => tracing::info!(
                principal = %principal,
                requirement = ?requirement,
                "feature denied: {denied}"
            ),
        }

        decision
    }

    fn check_perms(
        &self,
        principal: &Principal,
        perms: &[CapabilityKey],
        policy: MatchPolicy,
    ) -> Decision {
        let decision = explain_perms(Some(principal), perms, policy, principal.has_all_access());

        match &decision {
            Decision::Allowed(reason) => tracing::debug!(
                principal = %principal,
                policy = %policy,
                reason = ?reason,
                "permissions allowed"
            ),
            Decision::Denied(denied) => tracing::info!(
                principal = %principal,
                policy = %policy,
                "permissions denied: {denied}"
            ),
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessDenied, AllowReason};

    fn key(code: &str) -> CapabilityKey {
        CapabilityKey::new(code).expect("test key must be non-blank")
    }

    #[test]
    fn default_policy_follows_engine() {
        let policy = DefaultPolicy;
        let principal = Principal::new().with_role("business").grant("crm_view");

        assert!(policy.can_use_feature(&principal, Some(&Requirement::features(["crm_view"]))));
        assert!(!policy.can_use_feature(&principal, Some(&Requirement::features(["crm_edit"]))));
        assert!(policy.can_use_feature(&principal, None));
    }

    #[test]
    fn default_policy_perms_use_principal_flag() {
        let policy = DefaultPolicy;
        let wildcard = Principal::new().with_all_access(true);
        assert_eq!(
            policy.check_perms(&wildcard, &[key("x")], MatchPolicy::All),
            Decision::Allowed(AllowReason::Bypass)
        );

        let plain = Principal::new().grant("a");
        assert!(policy.has_required_perms(&plain, &[key("a"), key("b")], MatchPolicy::Any));
        assert!(matches!(
            policy.check_perms(&plain, &[key("a"), key("b")], MatchPolicy::All),
            Decision::Denied(AccessDenied::MissingPermissions { .. })
        ));
    }

    #[test]
    fn policy_is_object_safe() {
        let policy: &dyn AccessPolicy = &DefaultPolicy;
        assert!(policy.can_use_feature(&Principal::new(), None));
    }
}

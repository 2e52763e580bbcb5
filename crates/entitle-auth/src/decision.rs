//! The decision engine.
//!
//! Pure functions over an immutable [`Principal`] snapshot. Nothing here
//! logs, caches or performs I/O; audit logging lives in
//! [`DefaultPolicy`](crate::DefaultPolicy).

use crate::{AccessDenied, CapabilityLookup, Principal, Requirement};
use entitle_types::CapabilityKey;
use serde::{Deserialize, Serialize};

/// How a list of permission codes is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// At least one code must be held.
    #[default]
    Any,
    /// Every code must be held.
    All,
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Why access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowReason {
    /// The principal is a wildcard (all-access or superadmin).
    Bypass,
    /// Nothing was required.
    Unrestricted,
    /// Every constraint was met.
    Satisfied,
}

/// The outcome of a single access check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Access is allowed.
    Allowed(AllowReason),
    /// Access is denied.
    Denied(AccessDenied),
}

impl Decision {
    /// Returns `true` for [`Decision::Allowed`].
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Returns the denial, if any.
    #[must_use]
    pub fn denial(&self) -> Option<&AccessDenied> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(reason) => Some(reason),
        }
    }

    /// Converts into a `Result`, for `?` at call sites.
    ///
    /// # Errors
    ///
    /// Returns the [`AccessDenied`] reason when denied.
    pub fn into_result(self) -> Result<AllowReason, AccessDenied> {
        match self {
            Self::Allowed(reason) => Ok(reason),
            Self::Denied(reason) => Err(reason),
        }
    }
}

/// Explains whether `principal` may use a feature guarded by
/// `requirement`.
///
/// Evaluation order:
///
/// 1. No requirement → allowed.
/// 2. Wildcard principal → allowed.
/// 3. Non-empty `roles` not containing the principal's role → denied.
/// 4. Any capability key not held → denied.
/// 5. Otherwise allowed.
///
/// # Example
///
/// ```
/// use entitle_auth::{explain, AccessDenied, Decision, Principal, Requirement};
///
/// let principal = Principal::new().with_role("business");
/// let admin_only = Requirement::roles_any_of(["admin"]);
///
/// assert!(matches!(
///     explain(&principal, Some(&admin_only)),
///     Decision::Denied(AccessDenied::RoleNotPermitted { .. })
/// ));
/// ```
#[must_use]
pub fn explain(principal: &Principal, requirement: Option<&Requirement>) -> Decision {
    let Some(requirement) = requirement else {
        return Decision::Allowed(AllowReason::Unrestricted);
    };

    if principal.is_wildcard() {
        return Decision::Allowed(AllowReason::Bypass);
    }

    // No role compares as "".
    let roles = requirement.roles();
    if !roles.is_empty() && !roles.iter().any(|role| role.as_str() == principal.role_tag()) {
        return Decision::Denied(AccessDenied::RoleNotPermitted {
            role: principal.role().cloned(),
            accepted: roles.to_vec(),
        });
    }

    let missing: Vec<CapabilityKey> = requirement
        .capability_keys()
        .iter()
        .filter(|key| !principal.holds(key))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Decision::Denied(AccessDenied::MissingCapabilities { missing });
    }

    if requirement.is_unrestricted() {
        Decision::Allowed(AllowReason::Unrestricted)
    } else {
        Decision::Allowed(AllowReason::Satisfied)
    }
}

/// Returns `true` if `principal` may use a feature guarded by
/// `requirement`. See [`explain`] for the rules.
#[must_use]
pub fn can_use_feature(principal: &Principal, requirement: Option<&Requirement>) -> bool {
    explain(principal, requirement).is_allowed()
}

/// Explains a permission-code check.
///
/// Evaluation order:
///
/// 1. No codes → allowed.
/// 2. `has_all_access` → allowed.
/// 3. No lookup → denied.
/// 4. Match each normalized code against the lookup under `policy`.
#[must_use]
pub fn explain_perms(
    lookup: Option<&dyn CapabilityLookup>,
    perms: &[CapabilityKey],
    policy: MatchPolicy,
    has_all_access: bool,
) -> Decision {
    if perms.is_empty() {
        return Decision::Allowed(AllowReason::Unrestricted);
    }
    if has_all_access {
        return Decision::Allowed(AllowReason::Bypass);
    }
    let Some(lookup) = lookup else {
        return Decision::Denied(AccessDenied::NoLookup);
    };

    let missing: Vec<CapabilityKey> = perms.iter().filter(|k| !lookup.can(k)).cloned().collect();
    let satisfied = match policy {
        MatchPolicy::Any => missing.len() < perms.len(),
        MatchPolicy::All => missing.is_empty(),
    };

    if satisfied {
        Decision::Allowed(AllowReason::Satisfied)
    } else {
        Decision::Denied(AccessDenied::MissingPermissions { missing, policy })
    }
}

/// Returns `true` if the permission codes `perms` are satisfied.
///
/// Codes are normalized before lookup; blank codes are ignored, so a
/// list of only blanks counts as empty.
///
/// # Example
///
/// ```
/// use entitle_auth::{has_required_perms, MatchPolicy, Principal};
///
/// let principal = Principal::new().grant("crm_view");
///
/// assert!(has_required_perms(Some(&principal), &["crm_view", "crm_edit"], MatchPolicy::Any, false));
/// assert!(!has_required_perms(Some(&principal), &["crm_view", "crm_edit"], MatchPolicy::All, false));
/// assert!(has_required_perms(None, &["crm_edit"], MatchPolicy::Any, true));
/// assert!(!has_required_perms(None, &["crm_edit"], MatchPolicy::Any, false));
/// ```
#[must_use]
pub fn has_required_perms<S: AsRef<str>>(
    lookup: Option<&dyn CapabilityLookup>,
    perms: &[S],
    policy: MatchPolicy,
    has_all_access: bool,
) -> bool {
    let keys = CapabilityKey::parse_list(perms);
    explain_perms(lookup, &keys, policy, has_all_access).is_allowed()
}

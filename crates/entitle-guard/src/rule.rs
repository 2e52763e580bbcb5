//! What a guard protects with, and what it does on denial.

use crate::GuardError;
use crate::GuardState;
use entitle_auth::{AccessDenied, AccessPolicy, CapabilityKey, Decision, MatchPolicy, Principal, Requirement};
use serde::{Deserialize, Serialize};

/// The declaration a call site attaches to a guard.
///
/// | Variant | Identifier | Missing identifier |
/// |---------|------------|--------------------|
/// | `Rule` | the requirement | `None` → allowed |
/// | `Feature` | feature keys (all required) | misconfigured |
/// | `Permissions` | permission codes + policy | empty → allowed |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardSpec {
    /// Route-style guard over a full [`Requirement`].
    Rule(Option<Requirement>),
    /// Feature-key guard. The keys are the guard's identifier.
    Feature(Vec<String>),
    /// Permission-code guard, matched under `policy`.
    Permissions {
        codes: Vec<String>,
        policy: MatchPolicy,
    },
}

impl GuardSpec {
    /// A guard with nothing to check.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::Rule(None)
    }

    /// A route-style guard.
    #[must_use]
    pub fn rule(requirement: Requirement) -> Self {
        Self::Rule(Some(requirement))
    }

    /// A feature-key guard.
    #[must_use]
    pub fn feature<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Feature(keys.into_iter().map(Into::into).collect())
    }

    /// A permission-code guard.
    #[must_use]
    pub fn permissions<I, S>(codes: I, policy: MatchPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Permissions {
            codes: codes.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    /// Runs the declaration through `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Misconfigured`] when a feature guard carries
    /// no usable key.
    pub fn decide(
        &self,
        guard: &str,
        policy: &dyn AccessPolicy,
        principal: &Principal,
    ) -> Result<Decision, GuardError> {
        match self {
            Self::Rule(requirement) => Ok(policy.check_feature(principal, requirement.as_ref())),
            Self::Feature(keys) => {
                let keys = CapabilityKey::parse_list(keys);
                if keys.is_empty() {
                    return Err(GuardError::misconfigured(guard, "no feature key given"));
                }
                let requirement = Requirement::new().with_features(keys);
                Ok(policy.check_feature(principal, Some(&requirement)))
            }
            Self::Permissions { codes, policy: m } => {
                let keys = CapabilityKey::parse_list(codes);
                Ok(policy.check_perms(principal, &keys, *m))
            }
        }
    }
}

impl std::fmt::Display for GuardSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rule(None) => f.write_str("rule(unrestricted)"),
            Self::Rule(Some(req)) => {
                let roles: Vec<&str> = req.roles().iter().map(|r| r.as_str()).collect();
                let keys: Vec<&str> = req.capability_keys().iter().map(CapabilityKey::as_str).collect();
                write!(f, "rule(roles=[{}] features=[{}])", roles.join(","), keys.join(","))
            }
            Self::Feature(keys) => write!(f, "feature({})", keys.join(",")),
            Self::Permissions { codes, policy } => write!(f, "perms[{policy}]({})", codes.join(",")),
        }
    }
}

/// What a guard renders when access is denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum OnDeny {
    /// Navigate away to `to`.
    Redirect { to: String },
    /// Render an inline upgrade prompt in place of the content.
    #[default]
    Fallback,
}

/// A navigation instruction produced by a redirecting guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target route.
    pub to: String,
    /// Why the guard denied.
    pub reason: AccessDenied,
    /// The route the user attempted.
    pub from: String,
}

impl Redirect {
    /// Renders the target with `reason` and `from` in the query string.
    ///
    /// # Example
    ///
    /// ```
    /// use entitle_auth::AccessDenied;
    /// use entitle_guard::Redirect;
    ///
    /// let redirect = Redirect {
    ///     to: "/no-access".into(),
    ///     reason: AccessDenied::NoLookup,
    ///     from: "/campaigns/42".into(),
    /// };
    /// assert_eq!(
    ///     redirect.location(),
    ///     "/no-access?reason=no_lookup&from=%2Fcampaigns%2F42"
    /// );
    /// ```
    #[must_use]
    pub fn location(&self) -> String {
        let sep = if self.to.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}reason={}&from={}",
            self.to,
            urlencoding::encode(self.reason.reason()),
            urlencoding::encode(&self.from)
        )
    }
}

/// What the guard renders after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Stable, non-interactive loading placeholder.
    Placeholder,
    /// The protected content.
    Content,
    /// Inline upgrade prompt.
    Fallback(AccessDenied),
    /// Navigate away.
    Redirect(Redirect),
    /// The declaration is unusable. Distinct from any denial.
    Misconfigured(GuardError),
}

impl GuardOutcome {
    /// The lifecycle state this outcome belongs to.
    #[must_use]
    pub fn state(&self) -> GuardState {
        match self {
            Self::Placeholder => GuardState::Loading,
            Self::Content => GuardState::Allowed,
            Self::Fallback(_) | Self::Redirect(_) => GuardState::Denied,
            Self::Misconfigured(_) => GuardState::Misconfigured,
        }
    }

    /// The denial behind a `Fallback` or `Redirect`.
    #[must_use]
    pub fn denial(&self) -> Option<&AccessDenied> {
        match self {
            Self::Fallback(reason) => Some(reason),
            Self::Redirect(redirect) => Some(&redirect.reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitle_auth::{AllowReason, DefaultPolicy};
    use entitle_types::ErrorCode;

    fn decide(spec: &GuardSpec, principal: &Principal) -> Result<Decision, GuardError> {
        spec.decide("test", &DefaultPolicy, principal)
    }

    #[test]
    fn unrestricted_rule_allows() {
        let decision = decide(&GuardSpec::unrestricted(), &Principal::new()).expect("well-formed");
        assert_eq!(decision, Decision::Allowed(AllowReason::Unrestricted));
    }

    #[test]
    fn feature_without_keys_is_misconfigured() {
        for spec in [GuardSpec::Feature(vec![]), GuardSpec::feature(["", "  "])] {
            let err = decide(&spec, &Principal::new()).expect_err("no key is a caller bug");
            assert_eq!(err.code(), "GUARD_MISCONFIGURED");
        }
    }

    #[test]
    fn feature_guard_requires_all_keys() {
        let principal = Principal::new().grant("a");
        let spec = GuardSpec::feature(["a", "b"]);
        let decision = decide(&spec, &principal).expect("well-formed");
        assert!(matches!(
            decision,
            Decision::Denied(AccessDenied::MissingCapabilities { .. })
        ));
    }

    #[test]
    fn empty_permissions_allow() {
        let spec = GuardSpec::permissions(Vec::<String>::new(), MatchPolicy::All);
        assert!(decide(&spec, &Principal::new()).expect("well-formed").is_allowed());
    }

    #[test]
    fn permissions_honour_policy() {
        let principal = Principal::new().grant("crm_view");
        let any = GuardSpec::permissions(["crm_view", "crm_edit"], MatchPolicy::Any);
        let all = GuardSpec::permissions(["crm_view", "crm_edit"], MatchPolicy::All);
        assert!(decide(&any, &principal).expect("well-formed").is_allowed());
        assert!(!decide(&all, &principal).expect("well-formed").is_allowed());
    }

    #[test]
    fn location_appends_to_existing_query() {
        let redirect = Redirect {
            to: "/no-access?tab=plans".into(),
            reason: AccessDenied::MissingCapabilities { missing: vec![] },
            from: "/crm?view=all&page=2".into(),
        };
        assert_eq!(
            redirect.location(),
            "/no-access?tab=plans&reason=feature&from=%2Fcrm%3Fview%3Dall%26page%3D2"
        );
    }

    #[test]
    fn outcome_states() {
        assert_eq!(GuardOutcome::Placeholder.state(), GuardState::Loading);
        assert_eq!(GuardOutcome::Content.state(), GuardState::Allowed);
        assert_eq!(
            GuardOutcome::Fallback(AccessDenied::NoLookup).state(),
            GuardState::Denied
        );
        assert_eq!(
            GuardOutcome::Misconfigured(GuardError::misconfigured("g", "x")).state(),
            GuardState::Misconfigured
        );
        assert!(GuardOutcome::Content.denial().is_none());
    }

    #[test]
    fn on_deny_deserializes() {
        let redirect: OnDeny =
            serde_json::from_str(r#"{"kind":"redirect","to":"/no-access"}"#).expect("parse");
        assert_eq!(redirect, OnDeny::Redirect { to: "/no-access".into() });
        assert_eq!(OnDeny::default(), OnDeny::Fallback);
    }

    #[test]
    fn display_summarizes() {
        assert_eq!(GuardSpec::unrestricted().to_string(), "rule(unrestricted)");
        assert_eq!(GuardSpec::feature(["A", "B"]).to_string(), "feature(A,B)");
        assert_eq!(
            GuardSpec::permissions(["x"], MatchPolicy::All).to_string(),
            "perms[all](x)"
        );
    }
}

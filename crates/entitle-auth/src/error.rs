//! Denial reasons.
//!
//! A denial is not a failure of the engine; it is an answer. It is still
//! modelled as an error type so callers can surface it with `?` and
//! report it through the shared [`ErrorCode`] contract.
//!
//! ```text
//! explain()        ──► RoleNotPermitted | MissingCapabilities
//! explain_perms()  ──► MissingPermissions | NoLookup
//! ```

use crate::MatchPolicy;
use entitle_types::{CapabilityKey, ErrorCode, Role};
use thiserror::Error;

/// Why access was denied.
///
/// # Example
///
/// ```
/// use entitle_auth::{AccessDenied, Role};
/// use entitle_types::ErrorCode;
///
/// let err = AccessDenied::RoleNotPermitted {
///     role: Some(Role::new("business")),
///     accepted: vec![Role::new("admin")],
/// };
///
/// assert_eq!(err.code(), "ACCESS_ROLE_NOT_PERMITTED");
/// assert_eq!(err.reason(), "role");
/// assert!(err.to_string().contains("business"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum AccessDenied {
    /// The principal's role is not in the accepted list.
    #[error("role '{}' not permitted, accepted: {}", display_role(.role), join(.accepted))]
    RoleNotPermitted {
        /// The principal's role, if any.
        role: Option<Role>,
        /// Roles the requirement accepts.
        accepted: Vec<Role>,
    },

    /// One or more required feature keys are not held.
    #[error("missing capabilities: {}", join(.missing))]
    MissingCapabilities {
        /// Required keys the principal lacks, in declaration order.
        missing: Vec<CapabilityKey>,
    },

    /// The permission check failed under the given match policy.
    #[error("missing permissions ({policy}): {}", join(.missing))]
    MissingPermissions {
        /// Requested codes not held.
        missing: Vec<CapabilityKey>,
        /// Policy the codes were evaluated under.
        policy: MatchPolicy,
    },

    /// Permission codes were requested but no lookup was available.
    #[error("no capability lookup available")]
    NoLookup,
}

impl AccessDenied {
    /// Short machine-readable reason, suitable for a query string.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RoleNotPermitted { .. } => "role",
            Self::MissingCapabilities { .. } => "feature",
            Self::MissingPermissions { .. } => "permission",
            Self::NoLookup => "no_lookup",
        }
    }
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self {
            Self::RoleNotPermitted { .. } => "ACCESS_ROLE_NOT_PERMITTED",
            Self::MissingCapabilities { .. } => "ACCESS_MISSING_CAPABILITIES",
            Self::MissingPermissions { .. } => "ACCESS_MISSING_PERMISSIONS",
            Self::NoLookup => "ACCESS_NO_LOOKUP",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Grants can change on the next provider refresh.
        true
    }
}

fn display_role(role: &Option<Role>) -> &str {
    role.as_ref().map_or("-", Role::as_str)
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

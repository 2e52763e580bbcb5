//! Role tags.

use serde::{Deserialize, Serialize};

/// A role tag from an open enumeration ("business", "admin",
/// "superadmin", ...).
///
/// Roles identify *who* the principal is within a tenant. They are
/// compared exactly as supplied by the session provider; only the
/// wildcard role [`Role::SUPERADMIN`] carries meaning inside the engine.
///
/// # Example
///
/// ```
/// use entitle_types::Role;
///
/// let admin = Role::new("admin");
/// assert_eq!(admin.as_str(), "admin");
/// assert!(!admin.is_superadmin());
/// assert!(Role::new(Role::SUPERADMIN).is_superadmin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// The wildcard role that bypasses every requirement.
    pub const SUPERADMIN: &'static str = "superadmin";
    /// Platform administrator.
    pub const ADMIN: &'static str = "admin";
    /// Tenant (business) user.
    pub const BUSINESS: &'static str = "business";

    /// Creates a role tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the wildcard role.
    #[must_use]
    pub fn is_superadmin(&self) -> bool {
        self.0 == Self::SUPERADMIN
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//! The acting user's authorization snapshot.

use crate::granted::{normalize_granted, GrantedEntry};
use entitle_types::{CapabilityKey, Role};
use std::collections::BTreeSet;

/// Who is asking: role, wildcard flag and granted capabilities.
///
/// A `Principal` is an immutable snapshot built by the session provider
/// whenever it loads or refreshes entitlements. The engine only ever
/// reads it; a refresh produces a new value.
///
/// Capabilities are stored normalized, so `" campaign_view "` granted by
/// the provider satisfies a requirement of `"CAMPAIGN_VIEW"`.
///
/// # Example
///
/// ```
/// use entitle_auth::{CapabilityKey, Principal};
///
/// let principal = Principal::new()
///     .with_role("admin")
///     .grant(" campaign_view ");
///
/// assert_eq!(principal.role_tag(), "admin");
/// assert!(principal.holds(&CapabilityKey::new("CAMPAIGN_VIEW").expect("non-blank")));
/// assert!(!principal.is_wildcard());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    role: Option<Role>,
    has_all_access: bool,
    capabilities: BTreeSet<CapabilityKey>,
}

impl Principal {
    /// Creates a principal with no role, no wildcard and nothing granted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a principal from an `availableFeatures`-style map.
    ///
    /// Only entries whose flag is `true` are granted.
    ///
    /// # Example
    ///
    /// ```
    /// use entitle_auth::{CapabilityKey, Principal};
    ///
    /// let principal = Principal::from_feature_map([("A", true), ("B", false)]);
    /// assert!(principal.holds(&CapabilityKey::new("a").expect("non-blank")));
    /// assert!(!principal.holds(&CapabilityKey::new("b").expect("non-blank")));
    /// ```
    #[must_use]
    pub fn from_feature_map<I, K>(features: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let capabilities = features
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .filter_map(|(code, _)| CapabilityKey::new(code.as_ref()))
            .collect();

        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Builds a principal from a `grantedPermissions`-style list.
    ///
    /// Unrecognized entries are dropped.
    #[must_use]
    pub fn from_granted(entries: &[GrantedEntry]) -> Self {
        Self {
            capabilities: normalize_granted(entries),
            ..Self::default()
        }
    }

    /// Sets the role tag. A blank tag means no role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        let role = role.into();
        self.role = if role.as_str().is_empty() {
            None
        } else {
            Some(role)
        };
        self
    }

    /// Sets the all-access wildcard flag.
    #[must_use]
    pub fn with_all_access(mut self, has_all_access: bool) -> Self {
        self.has_all_access = has_all_access;
        self
    }

    /// Grants one capability code. Blank codes are ignored.
    #[must_use]
    pub fn grant(mut self, code: &str) -> Self {
        if let Some(key) = CapabilityKey::new(code) {
            self.capabilities.insert(key);
        }
        self
    }

    /// Grants every code in `codes`. Blank codes are ignored.
    #[must_use]
    pub fn grant_all<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capabilities
            .extend(codes.into_iter().filter_map(|c| CapabilityKey::new(c.as_ref())));
        self
    }

    /// Merges already-normalized keys into the granted set.
    #[must_use]
    pub fn with_capabilities(mut self, keys: impl IntoIterator<Item = CapabilityKey>) -> Self {
        self.capabilities.extend(keys);
        self
    }

    /// Returns the role, if one is assigned.
    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Returns the role tag, or `""` when no role is assigned.
    #[must_use]
    pub fn role_tag(&self) -> &str {
        self.role.as_ref().map_or("", Role::as_str)
    }

    /// Returns the all-access flag.
    #[must_use]
    pub fn has_all_access(&self) -> bool {
        self.has_all_access
    }

    /// Returns `true` when the principal bypasses every requirement:
    /// the all-access flag is set or the role is `superadmin`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.has_all_access || self.role.as_ref().is_some_and(Role::is_superadmin)
    }

    /// Returns the granted capability set.
    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<CapabilityKey> {
        &self.capabilities
    }

    /// Returns `true` if `key` is granted.
    #[must_use]
    pub fn holds(&self, key: &CapabilityKey) -> bool {
        self.capabilities.contains(key)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = self.role.as_ref().map_or("-", Role::as_str);
        if self.has_all_access {
            write!(f, "{role}[all-access]")
        } else {
            write!(f, "{role}[{} granted]", self.capabilities.len())
        }
    }
}

//! Declarative access requirements.

use entitle_types::{CapabilityKey, Role};
use serde::{Deserialize, Deserializer, Serialize};

/// What a feature or route demands of the principal.
///
/// - `roles`: if non-empty, the principal's role must be one of them.
/// - `capability_keys`: every listed key must be held.
///
/// An empty requirement demands nothing. Keys are normalized on the
/// way in, so declarations may use any case or padding.
///
/// # Serialized Form
///
/// ```toml
/// roles = ["business", "admin"]
/// features = ["messaging_send"]
/// ```
///
/// # Example
///
/// ```
/// use entitle_auth::Requirement;
///
/// let req = Requirement::features([" messaging_send "]).with_roles(["business"]);
/// assert_eq!(req.capability_keys()[0].as_str(), "MESSAGING_SEND");
/// assert_eq!(req.roles().len(), 1);
/// assert!(!req.is_unrestricted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirement {
    roles: Vec<Role>,
    #[serde(
        rename = "features",
        alias = "capability_keys",
        deserialize_with = "deserialize_keys"
    )]
    capability_keys: Vec<CapabilityKey>,
}

impl Requirement {
    /// Creates an empty requirement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a requirement on capability keys only.
    #[must_use]
    pub fn features<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new().with_features(codes)
    }

    /// Creates a requirement on roles only.
    #[must_use]
    pub fn roles_any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::new().with_roles(roles)
    }

    /// Replaces the accepted role list.
    #[must_use]
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the capability key list. Blank codes and duplicates are
    /// dropped.
    #[must_use]
    pub fn with_features<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capability_keys = CapabilityKey::parse_list(codes);
        self
    }

    /// Accepted roles. Empty means any role.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Keys that must all be held.
    #[must_use]
    pub fn capability_keys(&self) -> &[CapabilityKey] {
        &self.capability_keys
    }

    /// Returns `true` when neither roles nor keys are constrained.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty() && self.capability_keys.is_empty()
    }
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<CapabilityKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let codes = Vec::<String>::deserialize(deserializer)?;
    Ok(CapabilityKey::parse_list(codes))
}

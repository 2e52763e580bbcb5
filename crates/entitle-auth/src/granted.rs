//! Provider payload parsing.
//!
//! The session provider hands over a JSON object shaped like:
//!
//! ```json
//! {
//!   "role": "business",
//!   "hasAllAccess": false,
//!   "availableFeatures": { "MESSAGING_SEND": true, "CRM_EDIT": false },
//!   "entitlements": {
//!     "grantedPermissions": ["campaign_view", { "code": "crm_edit" }]
//!   }
//! }
//! ```
//!
//! Every field is optional. Granted permission entries are either plain
//! strings or objects carrying the code under one of several alias
//! fields; anything else is dropped.

use crate::Principal;
use entitle_types::CapabilityKey;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One entry of `entitlements.grantedPermissions`.
///
/// # Example
///
/// ```
/// use entitle_auth::GrantedEntry;
///
/// let entries: Vec<GrantedEntry> = serde_json::from_str(
///     r#"["crm_view", {"permission": " crm_edit "}, 42, {"label": "x"}]"#,
/// ).expect("valid json");
///
/// let codes: Vec<String> = entries
///     .iter()
///     .filter_map(GrantedEntry::key)
///     .map(|k| k.to_string())
///     .collect();
/// assert_eq!(codes, vec!["CRM_VIEW", "CRM_EDIT"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GrantedEntry {
    /// A bare code string.
    Code(String),
    /// An object naming the code under an alias field.
    Object(CodedObject),
    /// Any other JSON value. Never grants anything.
    Unrecognized(Value),
}

/// Object form of a granted entry.
///
/// The first present alias wins, checked in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodedObject {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    permission: Option<String>,
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl CodedObject {
    fn alias(&self) -> Option<&str> {
        [
            &self.code,
            &self.key,
            &self.permission,
            &self.feature,
            &self.name,
        ]
        .into_iter()
        .find_map(|field| field.as_deref())
    }
}

impl GrantedEntry {
    /// Returns the normalized key this entry grants, if any.
    #[must_use]
    pub fn key(&self) -> Option<CapabilityKey> {
        match self {
            Self::Code(code) => CapabilityKey::new(code),
            Self::Object(obj) => obj.alias().and_then(CapabilityKey::new),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Normalizes a granted-permission list into a key set.
///
/// Unrecognized and blank entries are dropped.
#[must_use]
pub fn normalize_granted(entries: &[GrantedEntry]) -> BTreeSet<CapabilityKey> {
    entries.iter().filter_map(GrantedEntry::key).collect()
}

/// The raw principal payload published by the session provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderPayload {
    /// Role tag. `null` or missing means no role.
    pub role: Option<String>,
    /// Wildcard flag. `null` or missing means `false`.
    pub has_all_access: Option<bool>,
    /// Feature flags keyed by code.
    pub available_features: Option<BTreeMap<String, Value>>,
    /// Permission grants.
    pub entitlements: Option<Entitlements>,
}

/// The `entitlements` block of a provider payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entitlements {
    /// Granted permission entries.
    pub granted_permissions: Vec<GrantedEntry>,
}

impl ProviderPayload {
    /// Parses a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error if `json` is not an object of
    /// the expected shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Converts the payload into an immutable [`Principal`].
    #[must_use]
    pub fn into_principal(self) -> Principal {
        let features = self
            .available_features
            .unwrap_or_default()
            .into_iter()
            .map(|(code, flag)| (code, is_truthy(&flag)));

        let granted = self
            .entitlements
            .map(|e| normalize_granted(&e.granted_permissions))
            .unwrap_or_default();

        let mut principal = Principal::from_feature_map(features)
            .with_all_access(self.has_all_access.unwrap_or(false))
            .with_capabilities(granted);
        if let Some(role) = self.role {
            principal = principal.with_role(role);
        }
        principal
    }
}

impl From<ProviderPayload> for Principal {
    fn from(payload: ProviderPayload) -> Self {
        payload.into_principal()
    }
}

/// Feature flags may arrive as booleans, numbers or strings.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Capability keys (feature keys and permission codes).
//!
//! Keys arrive from several places: route declarations, provider
//! payloads, hand-typed CLI flags. They are compared only after
//! normalization:
//!
//! ```text
//! normalize(code) = trim(code).to_uppercase()
//! ```
//!
//! [`CapabilityKey`] can only hold normalized, non-blank text, so two keys
//! are equal exactly when their normalized forms are.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Normalizes a capability code: trims surrounding whitespace and
/// upper-cases the rest.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use entitle_types::normalize;
///
/// assert_eq!(normalize(" campaign_view "), "CAMPAIGN_VIEW");
/// assert_eq!(normalize("CAMPAIGN_VIEW"), "CAMPAIGN_VIEW");
/// assert_eq!(normalize("   "), "");
/// ```
#[must_use]
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A normalized, non-blank capability code.
///
/// # Example
///
/// ```
/// use entitle_types::CapabilityKey;
///
/// let a = CapabilityKey::new("messaging_send").expect("non-blank");
/// let b = CapabilityKey::new("  MESSAGING_SEND\t").expect("non-blank");
/// assert_eq!(a, b);
///
/// assert!(CapabilityKey::new("  ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityKey(String);

impl CapabilityKey {
    /// Normalizes `code` into a key. Returns `None` when nothing is left
    /// after trimming.
    #[must_use]
    pub fn new(code: &str) -> Option<Self> {
        let normalized = normalize(code);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Normalizes every code, dropping blanks and duplicates while keeping
    /// first-seen order.
    ///
    /// # Example
    ///
    /// ```
    /// use entitle_types::CapabilityKey;
    ///
    /// let keys = CapabilityKey::parse_list(["a", " ", "A ", "b"]);
    /// let names: Vec<&str> = keys.iter().map(CapabilityKey::as_str).collect();
    /// assert_eq!(names, vec!["A", "B"]);
    /// ```
    #[must_use]
    pub fn parse_list<I, S>(codes: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<Self> = Vec::new();
        for code in codes {
            if let Some(key) = Self::new(code.as_ref()) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Returns the normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CapabilityKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("blank capability key: {value:?}"))
    }
}

impl From<CapabilityKey> for String {
    fn from(key: CapabilityKey) -> Self {
        key.0
    }
}

impl Borrow<str> for CapabilityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CapabilityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

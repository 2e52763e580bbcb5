//! Capability lookup seam.
//!
//! [`has_required_perms`](crate::has_required_perms) does not care where
//! grants live. The session provider passes whatever it has: the
//! [`Principal`] itself, a plain key set, or a closure over some other
//! store.

use crate::Principal;
use entitle_types::CapabilityKey;
use std::collections::{BTreeSet, HashSet};

/// Answers "does the principal hold this key?".
///
/// Callers always pass a normalized key.
pub trait CapabilityLookup {
    /// Returns `true` if `key` is held.
    fn can(&self, key: &CapabilityKey) -> bool;
}

impl CapabilityLookup for Principal {
    fn can(&self, key: &CapabilityKey) -> bool {
        self.holds(key)
    }
}

impl CapabilityLookup for BTreeSet<CapabilityKey> {
    fn can(&self, key: &CapabilityKey) -> bool {
        self.contains(key)
    }
}

impl CapabilityLookup for HashSet<CapabilityKey> {
    fn can(&self, key: &CapabilityKey) -> bool {
        self.contains(key)
    }
}

/// Adapts a closure into a [`CapabilityLookup`].
///
/// # Example
///
/// ```
/// use entitle_auth::{has_required_perms, FnLookup, MatchPolicy};
///
/// let lookup = FnLookup(|key: &entitle_auth::CapabilityKey| key.as_str().starts_with("CRM_"));
/// assert!(has_required_perms(Some(&lookup), &["crm_view"], MatchPolicy::Any, false));
/// assert!(!has_required_perms(Some(&lookup), &["billing_view"], MatchPolicy::Any, false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnLookup<F>(pub F);

impl<F> CapabilityLookup for FnLookup<F>
where
    F: Fn(&CapabilityKey) -> bool,
{
    fn can(&self, key: &CapabilityKey) -> bool {
        (self.0)(key)
    }
}

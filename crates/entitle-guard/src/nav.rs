//! Navigation menu filtering.
//!
//! The same decision functions that gate routes also decide which menu
//! entries a principal sees, so a link is never shown for a page that
//! would deny.

use entitle_auth::{AccessPolicy, Principal, Requirement};
use serde::{Deserialize, Serialize};

/// One menu entry: a link, a workspace with children, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    /// Display label.
    pub label: String,
    /// Own link, if the entry is navigable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Gate for this entry. `None` means always visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Requirement>,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    /// A leaf link.
    #[must_use]
    pub fn link(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// A workspace grouping `children`.
    #[must_use]
    pub fn workspace(label: impl Into<String>, children: Vec<NavEntry>) -> Self {
        Self {
            label: label.into(),
            children,
            ..Self::default()
        }
    }

    /// Attaches a requirement.
    #[must_use]
    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }
}

/// Returns the entries `principal` may see.
///
/// - An entry whose requirement is not met is dropped with its subtree.
/// - Children are filtered recursively.
/// - A workspace that had children, lost all of them, and has no own
///   `path` is dropped.
///
/// # Example
///
/// ```
/// use entitle_auth::{DefaultPolicy, Principal, Requirement};
/// use entitle_guard::nav::{filter_menu, NavEntry};
///
/// let menu = vec![NavEntry::workspace(
///     "Messaging",
///     vec![
///         NavEntry::link("Send", "/messaging/send")
///             .requires(Requirement::features(["MESSAGING_SEND"])),
///         NavEntry::link("Reports", "/messaging/reports")
///             .requires(Requirement::features(["MESSAGING_REPORT_VIEW"])),
///     ],
/// )];
///
/// let principal = Principal::new().grant("MESSAGING_SEND");
/// let visible = filter_menu(&menu, &principal, &DefaultPolicy);
/// assert_eq!(visible[0].children.len(), 1);
/// assert_eq!(visible[0].children[0].label, "Send");
/// ```
#[must_use]
pub fn filter_menu(
    entries: &[NavEntry],
    principal: &Principal,
    policy: &dyn AccessPolicy,
) -> Vec<NavEntry> {
    entries
        .iter()
        .filter_map(|entry| filter_entry(entry, principal, policy))
        .collect()
}

fn filter_entry(
    entry: &NavEntry,
    principal: &Principal,
    policy: &dyn AccessPolicy,
) -> Option<NavEntry> {
    if !policy.can_use_feature(principal, entry.requirement.as_ref()) {
        return None;
    }

    let children = filter_menu(&entry.children, principal, policy);
    if !entry.children.is_empty() && children.is_empty() && entry.path.is_none() {
        return None;
    }

    Some(NavEntry {
        label: entry.label.clone(),
        path: entry.path.clone(),
        requirement: entry.requirement.clone(),
        children,
    })
}

/// Flattens a menu into its navigable paths, depth first.
#[must_use]
pub fn paths(entries: &[NavEntry]) -> Vec<&str> {
    let mut out = Vec::new();
    for entry in entries {
        if let Some(ref path) = entry.path {
            out.push(path.as_str());
        }
        out.extend(paths(&entry.children));
    }
    out
}

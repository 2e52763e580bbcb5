//! Guard lifecycle state.

use std::fmt;

/// Where a guard is in its lifecycle.
///
/// ```text
///            provider resolves
///  Loading ─────────────────────┬──► Allowed
///     ▲                         ├──► Denied
///     │                         └──► Misconfigured
///     │   provider invalidates        │
///     └───────────────────────────────┘
/// ```
///
/// Terminal states are left only by a fresh evaluation: a new principal,
/// a new requirement, or the provider going back to loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// Entitlements not resolved yet. The engine is not consulted.
    #[default]
    Loading,
    /// The guard declaration is unusable.
    Misconfigured,
    /// Protected content renders.
    Allowed,
    /// Fallback or redirect applies.
    Denied,
}

impl GuardState {
    /// Returns `true` once the guard has left [`GuardState::Loading`].
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Upper-case name, as shown in logs and CLI output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "LOADING",
            Self::Misconfigured => "MISCONFIGURED",
            Self::Allowed => "ALLOWED",
            Self::Denied => "DENIED",
        }
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loading() {
        assert_eq!(GuardState::default(), GuardState::Loading);
        assert!(!GuardState::Loading.is_settled());
    }

    #[test]
    fn terminal_states_are_settled() {
        for state in [
            GuardState::Misconfigured,
            GuardState::Allowed,
            GuardState::Denied,
        ] {
            assert!(state.is_settled(), "{state}");
        }
    }

    #[test]
    fn display_is_upper_case() {
        assert_eq!(GuardState::Misconfigured.to_string(), "MISCONFIGURED");
        assert_eq!(GuardState::Allowed.to_string(), "ALLOWED");
    }
}

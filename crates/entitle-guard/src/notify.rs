//! Denial notifications.
//!
//! A guard tells its [`Notifier`] when it denies, at most once per
//! distinct reason for the guard's lifetime. What happens next (a toast,
//! a log line, nothing) is up to the notifier.

use entitle_auth::AccessDenied;

/// A single denial, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialNotice {
    /// Guard that denied.
    pub guard: String,
    /// Route the user was on.
    pub path: String,
    /// Why.
    pub reason: AccessDenied,
}

impl DenialNotice {
    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.reason {
            AccessDenied::RoleNotPermitted { .. } => {
                format!("Your role does not have access to {}.", self.path)
            }
            AccessDenied::MissingCapabilities { .. } | AccessDenied::MissingPermissions { .. } => {
                format!("Your plan does not include {}. Upgrade to unlock it.", self.path)
            }
            AccessDenied::NoLookup => format!("Access to {} could not be verified.", self.path),
        }
    }
}

/// Receives denial notices.
pub trait Notifier: Send + Sync {
    /// Called once per guard per distinct denial.
    fn notify(&self, notice: &DenialNotice);
}

/// Logs each notice at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &DenialNotice) {
        tracing::info!(
            guard = %notice.guard,
            path = %notice.path,
            reason = notice.reason.reason(),
            "{}",
            notice.message()
        );
    }
}

/// Drops every notice. Installed when `guard.notify_on_deny = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: &DenialNotice) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitle_auth::Role;

    fn notice(reason: AccessDenied) -> DenialNotice {
        DenialNotice {
            guard: "route".into(),
            path: "/campaigns".into(),
            reason,
        }
    }

    #[test]
    fn message_by_reason() {
        let role = notice(AccessDenied::RoleNotPermitted {
            role: Some(Role::new("business")),
            accepted: vec![Role::new("admin")],
        });
        assert!(role.message().contains("role"));

        let plan = notice(AccessDenied::MissingCapabilities { missing: vec![] });
        assert!(plan.message().contains("Upgrade"));
        assert!(plan.message().contains("/campaigns"));

        let unknown = notice(AccessDenied::NoLookup);
        assert!(unknown.message().contains("could not be verified"));
    }

    #[test]
    fn notifiers_are_object_safe() {
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(TracingNotifier), Box::new(SilentNotifier)];
        for n in &notifiers {
            n.notify(&notice(AccessDenied::NoLookup));
        }
    }
}

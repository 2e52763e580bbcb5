//! Console manifest: route gates and the navigation menu.
//!
//! ```toml
//! [[routes]]
//! path = "/campaigns"
//! features = ["CAMPAIGN_VIEW"]
//!
//! [[routes]]
//! path = "/crm"
//! perms = ["CRM_VIEW", "CRM_EDIT"]
//! match = "any"
//! on_deny = "fallback"
//!
//! [[routes]]
//! path = "/admin/plans"
//! roles = ["admin", "superadmin"]
//!
//! [[menu]]
//! label = "Messaging"
//!
//!   [[menu.children]]
//!   label = "Send"
//!   path = "/messaging/send"
//!   requirement = { features = ["MESSAGING_SEND"] }
//! ```

use crate::config::GuardConfig;
use crate::nav::{filter_menu, NavEntry};
use crate::notify::SilentNotifier;
use crate::{Guard, GuardSpec, ManifestError, OnDeny};
use entitle_auth::{AccessPolicy, MatchPolicy, Principal, Requirement, Role};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// What a route does when its guard denies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenyAction {
    /// Redirect to the no-access route.
    #[default]
    Redirect,
    /// Render an inline upgrade prompt.
    Fallback,
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGate {
    /// Route prefix, starting with `/`.
    pub path: String,
    /// Feature keys, all required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    /// Permission codes, matched under `match`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perms: Option<Vec<String>>,
    /// Accepted roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    /// Match policy for `perms`.
    #[serde(default, rename = "match")]
    pub match_policy: MatchPolicy,
    /// Denial strategy.
    #[serde(default)]
    pub on_deny: DenyAction,
    /// Overrides `guard.no_access_route` for this route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl RouteGate {
    /// The guard declaration this route compiles to.
    ///
    /// | Declared | Spec |
    /// |----------|------|
    /// | `features` only | `Feature` |
    /// | `features` + `roles` | `Rule` with both (or `Feature` when no key is usable) |
    /// | `perms` | `Permissions` |
    /// | `roles` only | `Rule` on roles |
    /// | nothing | unrestricted `Rule` |
    ///
    /// `perms` combined with `features` or `roles` is rejected by
    /// [`ConsoleManifest::validate`]; call this on validated routes only.
    #[must_use]
    pub fn spec(&self) -> GuardSpec {
        if let Some(ref features) = self.features {
            let usable = features.iter().any(|f| !f.trim().is_empty());
            if self.roles.is_empty() || !usable {
                return GuardSpec::Feature(features.clone());
            }
            return GuardSpec::rule(
                Requirement::features(features).with_roles(self.roles.iter().cloned()),
            );
        }

        if let Some(ref perms) = self.perms {
            return GuardSpec::Permissions {
                codes: perms.clone(),
                policy: self.match_policy,
            };
        }

        if self.roles.is_empty() {
            GuardSpec::unrestricted()
        } else {
            GuardSpec::rule(Requirement::roles_any_of(self.roles.iter().cloned()))
        }
    }

    /// Returns `true` if `path` is this route or below it.
    fn covers(&self, path: &str) -> bool {
        let prefix = self.path.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if !self.path.starts_with('/') {
            return Err(ManifestError::Invalid {
                route: self.path.clone(),
                detail: "route path must start with '/'".into(),
            });
        }
        if self.features.is_some() && self.perms.is_some() {
            return Err(ManifestError::Invalid {
                route: self.path.clone(),
                detail: "declare either features or perms, not both".into(),
            });
        }
        if self.perms.is_some() && !self.roles.is_empty() {
            return Err(ManifestError::Invalid {
                route: self.path.clone(),
                detail: "perms cannot be combined with roles; gate roles on a parent route".into(),
            });
        }
        Ok(())
    }
}

/// A parsed console manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleManifest {
    /// Route gates.
    pub routes: Vec<RouteGate>,
    /// Navigation menu.
    pub menu: Vec<NavEntry>,
}

impl ConsoleManifest {
    /// Reads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the file cannot be read, is not
    /// valid TOML, or declares an invalid route.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse_at(&text, path)?;

        debug!(
            path = %path.display(),
            routes = manifest.routes.len(),
            menu = manifest.menu.len(),
            "Loaded console manifest"
        );
        Ok(manifest)
    }

    fn parse_at(text: &str, path: &Path) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks every route declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] for the first bad route.
    pub fn validate(&self) -> Result<(), ManifestError> {
        self.routes.iter().try_for_each(RouteGate::validate)
    }

    /// Finds the most specific route covering `path`.
    ///
    /// Matching is segment aware: `/campaigns` covers `/campaigns` and
    /// `/campaigns/42` but not `/campaignsx`. Query strings and fragments
    /// are ignored.
    #[must_use]
    pub fn route_for(&self, path: &str) -> Option<&RouteGate> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.routes
            .iter()
            .filter(|route| route.covers(path))
            .max_by_key(|route| route.path.trim_end_matches('/').len())
    }

    /// Builds the guard for `path` under the shared guard settings.
    ///
    /// Paths no route covers get an unrestricted guard.
    #[must_use]
    pub fn guard_for(&self, path: &str, config: &GuardConfig) -> Guard {
        let route = self.route_for(path);
        let (name, spec) = match route {
            Some(route) => (route.path.clone(), route.spec()),
            None => ("unguarded".to_string(), GuardSpec::unrestricted()),
        };

        let on_deny = match route {
            Some(RouteGate {
                on_deny: DenyAction::Fallback,
                ..
            }) => OnDeny::Fallback,
            Some(RouteGate { redirect_to, .. }) => OnDeny::Redirect {
                to: redirect_to
                    .clone()
                    .unwrap_or_else(|| config.no_access_route.clone()),
            },
            None => OnDeny::Redirect {
                to: config.no_access_route.clone(),
            },
        };

        let guard = Guard::new(name, spec).at(path).on_deny(on_deny);
        if config.notify_on_deny {
            guard
        } else {
            guard.with_notifier(Arc::new(SilentNotifier))
        }
    }

    /// The menu as `principal` sees it.
    #[must_use]
    pub fn menu_for(&self, principal: &Principal, policy: &dyn AccessPolicy) -> Vec<NavEntry> {
        filter_menu(&self.menu, principal, policy)
    }
}

/// Parses and validates an inline manifest.
///
/// Errors report the path as `<inline>`.
impl std::str::FromStr for ConsoleManifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_at(s, Path::new("<inline>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GuardOutcome, ProviderSnapshot};
    use entitle_auth::DefaultPolicy;
    use entitle_types::ErrorCode;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[[routes]]
path = "/"

[[routes]]
path = "/campaigns"
features = ["CAMPAIGN_VIEW"]

[[routes]]
path = "/campaigns/new"
features = ["campaign_create"]
roles = ["business"]

[[routes]]
path = "/crm"
perms = ["CRM_VIEW", "CRM_EDIT"]
match = "all"
on_deny = "fallback"

[[routes]]
path = "/admin/plans/"
roles = ["admin", "superadmin"]
redirect_to = "/admin/denied"

[[routes]]
path = "/broken"
features = [" "]

[[menu]]
label = "Messaging"

  [[menu.children]]
  label = "Send"
  path = "/messaging/send"
  requirement = { features = ["MESSAGING_SEND"] }
"#;

    fn manifest() -> ConsoleManifest {
        MANIFEST.parse().expect("manifest parses")
    }

    fn principal() -> Principal {
        Principal::new().with_role("business").grant("campaign_view")
    }

    #[test]
    fn route_matching_is_segment_aware() {
        let m = manifest();
        assert_eq!(m.route_for("/campaigns").map(|r| r.path.as_str()), Some("/campaigns"));
        assert_eq!(m.route_for("/campaigns/42").map(|r| r.path.as_str()), Some("/campaigns"));
        assert_eq!(
            m.route_for("/campaigns/new?draft=1").map(|r| r.path.as_str()),
            Some("/campaigns/new")
        );
        assert_eq!(m.route_for("/campaignsx").map(|r| r.path.as_str()), Some("/"));
        assert_eq!(m.route_for("/admin/plans").map(|r| r.path.as_str()), Some("/admin/plans/"));
    }

    #[test]
    fn route_specs() {
        let m = manifest();
        let spec = |path: &str| m.route_for(path).expect("covered").spec();

        assert_eq!(spec("/"), GuardSpec::unrestricted());
        assert_eq!(spec("/campaigns"), GuardSpec::feature(["CAMPAIGN_VIEW"]));
        assert_eq!(
            spec("/campaigns/new"),
            GuardSpec::rule(Requirement::features(["CAMPAIGN_CREATE"]).with_roles(["business"]))
        );
        assert_eq!(
            spec("/crm/contacts"),
            GuardSpec::permissions(["CRM_VIEW", "CRM_EDIT"], MatchPolicy::All)
        );
        assert_eq!(
            spec("/admin/plans"),
            GuardSpec::rule(Requirement::roles_any_of(["admin", "superadmin"]))
        );
    }

    #[test]
    fn guard_for_redirects_with_configured_route() {
        let m = manifest();
        let mut guard = m.guard_for("/campaigns/42", &GuardConfig::default());
        let outcome = guard.evaluate(&ProviderSnapshot::ready(Principal::new()));

        let GuardOutcome::Redirect(redirect) = outcome else {
            panic!("expected redirect, got {outcome:?}");
        };
        assert_eq!(redirect.to, "/no-access");
        assert_eq!(redirect.from, "/campaigns/42");
    }

    #[test]
    fn guard_for_honours_route_overrides() {
        let m = manifest();
        let snapshot = ProviderSnapshot::ready(principal());

        let mut crm = m.guard_for("/crm", &GuardConfig::default());
        assert!(matches!(crm.evaluate(&snapshot), GuardOutcome::Fallback(_)));

        let mut admin = m.guard_for("/admin/plans", &GuardConfig::default());
        let GuardOutcome::Redirect(redirect) = admin.evaluate(&snapshot) else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.to, "/admin/denied");
    }

    #[test]
    fn blank_feature_route_is_misconfigured() {
        let mut guard = manifest().guard_for("/broken", &GuardConfig::default());
        assert!(matches!(
            guard.evaluate(&ProviderSnapshot::ready(principal())),
            GuardOutcome::Misconfigured(_)
        ));
    }

    #[test]
    fn allowed_route() {
        let mut guard = manifest().guard_for("/campaigns", &GuardConfig::default());
        assert_eq!(
            guard.evaluate(&ProviderSnapshot::ready(principal())),
            GuardOutcome::Content
        );
    }

    #[test]
    fn unknown_path_is_unrestricted() {
        let empty = ConsoleManifest::default();
        let mut guard = empty.guard_for("/anything", &GuardConfig::default());
        assert_eq!(guard.name(), "unguarded");
        assert_eq!(
            guard.evaluate(&ProviderSnapshot::ready(Principal::new())),
            GuardOutcome::Content
        );
    }

    #[test]
    fn menu_is_filtered() {
        let m = manifest();
        assert!(m.menu_for(&principal(), &DefaultPolicy).is_empty());

        let sender = Principal::new().grant("messaging_send");
        let menu = m.menu_for(&sender, &DefaultPolicy);
        assert_eq!(menu[0].children[0].path.as_deref(), Some("/messaging/send"));
    }

    #[test]
    fn load_validates_routes() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("console.toml");
        std::fs::write(
            &path,
            "[[routes]]\npath = \"/x\"\nfeatures = [\"A\"]\nperms = [\"B\"]\n",
        )
        .expect("write manifest");

        let err = ConsoleManifest::load(&path).expect_err("contradictory route");
        assert_eq!(err.code(), "MANIFEST_INVALID");
    }

    #[test]
    fn load_reports_missing_file_and_bad_toml() {
        let dir = TempDir::new().expect("tempdir");
        let missing = ConsoleManifest::load(&dir.path().join("nope.toml")).expect_err("missing");
        assert_eq!(missing.code(), "MANIFEST_READ");

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[[routes]\n").expect("write manifest");
        let bad = ConsoleManifest::load(&path).expect_err("bad toml");
        assert_eq!(bad.code(), "MANIFEST_PARSE");
    }

    #[test]
    fn relative_route_path_rejected() {
        let err = "[[routes]]\npath = \"campaigns\"\n"
            .parse::<ConsoleManifest>()
            .expect_err("relative path");
        assert_eq!(err.code(), "MANIFEST_INVALID");
    }

    #[test]
    fn inline_parse_reports_bad_toml() {
        let err = "[[routes]\n".parse::<ConsoleManifest>().expect_err("bad toml");
        assert_eq!(err.code(), "MANIFEST_PARSE");
        assert!(err.to_string().contains("<inline>"));
    }

    #[test]
    fn roles_with_perms_rejected() {
        let text = r#"
[[routes]]
path = "/admin/billing"
roles = ["admin"]
perms = ["BILLING_VIEW"]
"#;
        let err = text.parse::<ConsoleManifest>().expect_err("roles + perms");
        assert_eq!(err.code(), "MANIFEST_INVALID");
        assert!(err.to_string().contains("/admin/billing"));

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("console.toml");
        std::fs::write(&path, text).expect("write manifest");
        assert_eq!(
            ConsoleManifest::load(&path).expect_err("roles + perms").code(),
            "MANIFEST_INVALID"
        );
    }

    #[test]
    fn role_gate_on_parent_still_denies_perm_holder() {
        let m: ConsoleManifest = r#"
[[routes]]
path = "/admin"
roles = ["admin"]

[[routes]]
path = "/admin/billing"
perms = ["BILLING_VIEW"]
"#
        .parse()
        .expect("valid manifest");

        let business = Principal::new().with_role("business").grant("billing_view");
        let mut admin_area = m.guard_for("/admin", &GuardConfig::default());
        assert!(matches!(
            admin_area.evaluate(&ProviderSnapshot::ready(business)),
            GuardOutcome::Redirect(_)
        ));
    }
}

//! Subcommand implementations.
//!
//! Each command returns a [`Report`]: the text to print and a [`Verdict`]
//! that becomes the process exit code.

use anyhow::{bail, Context, Result};
use entitle_auth::{
    AccessPolicy, AllowReason, CapabilityKey, Decision, MatchPolicy, Principal, ProviderPayload,
    Requirement,
};
use entitle_guard::config::{save_project_config, EntitleConfig, GuardConfig, PROJECT_CONFIG_DIR};
use entitle_guard::{ConsoleManifest, EntitlementProvider, GuardOutcome, GuardSpec, NavEntry};
use entitle_types::ErrorCode;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Manifest file name used when the config does not name one.
pub const DEFAULT_MANIFEST_FILE: &str = "console.toml";

/// Manifest written by `entitle init`.
pub const STARTER_MANIFEST: &str = r#"# Route gates: the longest matching prefix wins.

[[routes]]
path = "/messaging/send"
features = ["MESSAGING_SEND"]

[[routes]]
path = "/crm"
perms = ["CRM_VIEW", "CRM_EDIT"]
match = "any"
on_deny = "fallback"

[[routes]]
path = "/admin"
roles = ["admin", "superadmin"]

[[menu]]
label = "Messaging"

  [[menu.children]]
  label = "Send"
  path = "/messaging/send"
  requirement = { features = ["MESSAGING_SEND"] }

[[menu]]
label = "CRM"
path = "/crm"
requirement = { features = ["CRM_VIEW"] }

[[menu]]
label = "Admin"
path = "/admin"
requirement = { roles = ["admin"] }
"#;

/// Overall answer of a command, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Allowed,
    Denied,
    Misconfigured,
}

impl Verdict {
    /// `0` allowed, `2` denied, `3` misconfigured.
    ///
    /// `1` is left to [`anyhow`] errors returned from `main`.
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Allowed => ExitCode::SUCCESS,
            Self::Denied => ExitCode::from(2),
            Self::Misconfigured => ExitCode::from(3),
        }
    }
}

/// Command output.
#[derive(Debug)]
pub struct Report {
    pub verdict: Verdict,
    pub text: String,
}

/// Parsed `check` arguments.
#[derive(Debug, Default)]
pub struct CheckRequest {
    pub features: Vec<String>,
    pub roles: Vec<String>,
    pub perms: Vec<String>,
    pub match_policy: MatchPolicy,
}

impl CheckRequest {
    /// Guard declarations to evaluate. Every one must allow.
    fn specs(&self) -> Vec<GuardSpec> {
        let mut specs = Vec::new();

        if !self.roles.is_empty() {
            let has_keys = !CapabilityKey::parse_list(&self.features).is_empty();
            if self.features.is_empty() || has_keys {
                let requirement = Requirement::features(&self.features)
                    .with_roles(self.roles.iter().map(String::as_str));
                specs.push(GuardSpec::rule(requirement));
            } else {
                specs.push(GuardSpec::feature(&self.features));
            }
        } else if !self.features.is_empty() {
            specs.push(GuardSpec::feature(&self.features));
        }

        if !self.perms.is_empty() {
            specs.push(GuardSpec::permissions(&self.perms, self.match_policy));
        }

        if specs.is_empty() {
            specs.push(GuardSpec::unrestricted());
        }
        specs
    }
}

/// Reads a principal from inline JSON or `@path`.
pub fn load_principal(arg: &str) -> Result<Principal> {
    let json = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read principal file {path}"))?,
        None => arg.to_string(),
    };

    let payload = ProviderPayload::from_json(&json).context("invalid principal payload")?;
    Ok(payload.into_principal())
}

/// Locates the console manifest.
///
/// The configured path wins; otherwise `.entitle/console.toml` under the
/// project root is used if it exists.
pub fn manifest_path(project_root: &Path, config: &EntitleConfig) -> Option<PathBuf> {
    config.manifest_path(project_root).or_else(|| {
        let fallback = project_root
            .join(PROJECT_CONFIG_DIR)
            .join(DEFAULT_MANIFEST_FILE);
        fallback.exists().then_some(fallback)
    })
}

/// Loads and validates the console manifest.
pub fn load_manifest(project_root: &Path, config: &EntitleConfig) -> Result<ConsoleManifest> {
    let Some(path) = manifest_path(project_root, config) else {
        bail!(
            "no console manifest configured (set `manifest` in {PROJECT_CONFIG_DIR}/config.toml, \
             ENTITLE_MANIFEST, or --manifest)"
        );
    };
    Ok(ConsoleManifest::load(&path)?)
}

/// `entitle check`: decides an ad-hoc requirement.
pub fn check(principal: &Principal, request: &CheckRequest, policy: &dyn AccessPolicy) -> Report {
    let mut verdict = Verdict::Allowed;
    let mut text = String::new();

    for spec in request.specs() {
        let line = match spec.decide("check", policy, principal) {
            Ok(Decision::Allowed(reason)) => {
                format!("ALLOWED {spec} ({})", allow_label(reason))
            }
            Ok(Decision::Denied(denied)) => {
                verdict = verdict.max(Verdict::Denied);
                format!("DENIED {spec} [{}] {denied}", denied.code())
            }
            Err(err) => {
                verdict = verdict.max(Verdict::Misconfigured);
                format!("MISCONFIGURED {spec} [{}] {err}", err.code())
            }
        };
        let _ = writeln!(text, "{line}");
    }

    Report { verdict, text }
}

/// `entitle route`: runs a path through its manifest guard.
pub async fn route(
    principal: Principal,
    manifest: &ConsoleManifest,
    path: &str,
    config: &GuardConfig,
) -> Result<Report> {
    let provider = EntitlementProvider::new();
    let mut rx = provider.subscribe();
    let mut guard = manifest.guard_for(path, config);
    provider.resolve(principal);

    let Some(outcome) = guard.settle(&mut rx).await else {
        bail!("entitlements never resolved for {path}");
    };

    let mut text = String::new();
    let _ = writeln!(text, "{} {path}", outcome.state());
    let _ = writeln!(text, "  guard: {} {}", guard.name(), guard.spec());

    let verdict = match &outcome {
        GuardOutcome::Content => Verdict::Allowed,
        GuardOutcome::Fallback(denied) => {
            let _ = writeln!(text, "  reason: [{}] {denied}", denied.code());
            let _ = writeln!(text, "  render: upgrade prompt");
            Verdict::Denied
        }
        GuardOutcome::Redirect(redirect) => {
            let _ = writeln!(
                text,
                "  reason: [{}] {}",
                redirect.reason.code(),
                redirect.reason
            );
            let _ = writeln!(text, "  redirect: {}", redirect.location());
            Verdict::Denied
        }
        GuardOutcome::Misconfigured(err) => {
            let _ = writeln!(text, "  error: [{}] {err}", err.code());
            Verdict::Misconfigured
        }
        GuardOutcome::Placeholder => bail!("guard for {path} is still loading"),
    };

    Ok(Report { verdict, text })
}

/// `entitle menu`: the navigation menu as `principal` sees it.
pub fn menu(
    principal: &Principal,
    manifest: &ConsoleManifest,
    policy: &dyn AccessPolicy,
    json: bool,
) -> Result<Report> {
    let entries = manifest.menu_for(principal, policy);

    let text = if json {
        let mut out = serde_json::to_string_pretty(&entries)?;
        out.push('\n');
        out
    } else {
        let mut out = String::new();
        render_tree(&entries, 0, &mut out);
        out
    };

    Ok(Report {
        verdict: Verdict::Allowed,
        text,
    })
}

fn render_tree(entries: &[NavEntry], depth: usize, out: &mut String) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        match &entry.path {
            Some(path) => {
                let _ = writeln!(out, "{indent}{} ({path})", entry.label);
            }
            None => {
                let _ = writeln!(out, "{indent}{}", entry.label);
            }
        }
        render_tree(&entry.children, depth + 1, out);
    }
}

/// `entitle init`: writes a project config and starter manifest.
///
/// Returns the written paths.
pub fn init(project_root: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let dir = project_root.join(PROJECT_CONFIG_DIR);
    let config_path = dir.join(entitle_guard::config::PROJECT_CONFIG_FILE);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = EntitleConfig {
        manifest: Some(PathBuf::from(PROJECT_CONFIG_DIR).join(DEFAULT_MANIFEST_FILE)),
        ..EntitleConfig::default()
    };
    let mut written = vec![save_project_config(project_root, &config)?];

    let manifest_path = dir.join(DEFAULT_MANIFEST_FILE);
    if force || !manifest_path.exists() {
        std::fs::write(&manifest_path, STARTER_MANIFEST)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;
        written.push(manifest_path);
    }

    Ok(written)
}

fn allow_label(reason: AllowReason) -> &'static str {
    match reason {
        AllowReason::Bypass => "bypass",
        AllowReason::Unrestricted => "unrestricted",
        AllowReason::Satisfied => "satisfied",
    }
}

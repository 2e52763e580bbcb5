//! Shared E2E test helpers for `entitle` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables read by the config loader. Removed so the developer's own
/// environment never leaks into a test.
const ENTITLE_VARS: &[&str] = &[
    "ENTITLE_DEBUG",
    "ENTITLE_NOTIFY_ON_DENY",
    "ENTITLE_NO_ACCESS_ROUTE",
    "ENTITLE_MANIFEST",
    "ENTITLE_LOG_LEVEL",
    "RUST_LOG",
];

/// Manifest shared by the route and menu tests.
pub const MANIFEST: &str = r#"
[[routes]]
path = "/messaging/send"
features = ["MESSAGING_SEND"]

[[routes]]
path = "/crm"
perms = ["CRM_VIEW", "CRM_EDIT"]
on_deny = "fallback"

[[routes]]
path = "/admin"
roles = ["admin"]
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

  [[menu.children]]
  label = "Templates"
  path = "/messaging/templates"
  requirement = { features = ["TEMPLATES"] }

[[menu]]
label = "Admin"
path = "/admin"
requirement = { roles = ["admin"] }
"#;

/// Build a Command for the `entitle` binary rooted in a fresh project
/// directory with an isolated HOME.
///
/// Returns (command, _guard); keep the guard alive for the test's duration.
pub fn entitle_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp project dir");
    let cmd = entitle_cmd_at(tmp.path());
    (cmd, tmp)
}

/// Build a Command for an existing project root, which also serves as HOME.
pub fn entitle_cmd_at(root: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("entitle");
    cmd.timeout(TIMEOUT_BASIC);
    for var in ENTITLE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", root);
    cmd.args(["-C", arg(root)]);
    cmd
}

/// Writes [`MANIFEST`] into `dir` and returns its path.
pub fn write_manifest(dir: &Path) -> PathBuf {
    let path = dir.join("console.toml");
    std::fs::write(&path, MANIFEST).expect("write manifest");
    path
}

/// Path argument as UTF-8.
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("valid utf8")
}

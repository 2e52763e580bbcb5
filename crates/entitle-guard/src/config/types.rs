//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers. Fields
/// with `#[serde(default)]` are optional in the config file.
///
/// # Example
///
/// ```
/// use entitle_guard::config::EntitleConfig;
///
/// let config = EntitleConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.guard.no_access_route, "/no-access");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntitleConfig {
    /// Enable debug mode (debug-level terminal logging).
    pub debug: bool,

    /// Console manifest declaring route gates and the menu.
    ///
    /// Relative paths are resolved against the project root.
    pub manifest: Option<PathBuf>,

    /// Guard behaviour.
    pub guard: GuardConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl EntitleConfig {
    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` win only where they differ from the defaults,
    /// so a layer that leaves a field out never resets it.
    pub fn merge(&mut self, other: &Self) {
        if other.debug {
            self.debug = true;
        }
        if other.manifest.is_some() {
            self.manifest.clone_from(&other.manifest);
        }
        self.guard.merge(&other.guard);
        self.logging.merge(&other.logging);
    }

    /// Resolves the manifest path against `project_root`.
    #[must_use]
    pub fn manifest_path(&self, project_root: &std::path::Path) -> Option<PathBuf> {
        self.manifest.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                project_root.join(p)
            }
        })
    }
}

/// Guard behaviour shared by every guard the console builds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Redirect target for route guards that deny.
    pub no_access_route: String,

    /// Fire denial notifications. `false` installs a silent notifier.
    pub notify_on_deny: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            no_access_route: "/no-access".into(),
            notify_on_deny: true,
        }
    }
}

impl GuardConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.no_access_route != default.no_access_route {
            self.no_access_route.clone_from(&other.no_access_route);
        }
        if other.notify_on_deny != default.notify_on_deny {
            self.notify_on_deny = other.notify_on_deny;
        }
    }
}

/// Logging configuration.
///
/// The terminal layer is filtered by `level`; the optional file layer
/// has its own `file_level` so it can stay verbose while the terminal
/// stays quiet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Terminal log level when neither `--debug`, `--verbose` nor
    /// `RUST_LOG` is set.
    pub level: String,

    /// Enable the file layer.
    pub file: bool,

    /// File layer level.
    pub file_level: String,

    /// Log directory. Defaults to `~/.entitle/logs`.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            file: false,
            file_level: "debug".into(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.level != default.level {
            self.level.clone_from(&other.level);
        }
        if other.file != default.file {
            self.file = other.file;
        }
        if other.file_level != default.file_level {
            self.file_level.clone_from(&other.file_level);
        }
        if other.file_path.is_some() {
            self.file_path.clone_from(&other.file_path);
        }
    }

    /// Log directory, falling back to `~/.entitle/logs`.
    #[must_use]
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| super::default_config_dir().join("logs"))
    }

    /// `EnvFilter` directive for the file layer.
    #[must_use]
    pub fn file_filter_directive(&self) -> String {
        format!("{},tokio=warn", self.file_level)
    }
}

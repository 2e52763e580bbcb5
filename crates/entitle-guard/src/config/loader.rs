//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.entitle/config.toml`)
//! 3. Project config (`<root>/.entitle/config.toml`)
//! 4. Environment variables (`ENTITLE_*`)
//!
//! Each layer overrides the previous.

use super::{
    default_config_path, ConfigError, EntitleConfig, FileOp, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use entitle_guard::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/srv/console")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), entitle_guard::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.entitle/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.entitle/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, or an `ENTITLE_*` variable holds an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<EntitleConfig, ConfigError> {
        let mut config = EntitleConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global);
            }
        }

        if !self.skip_project {
            if let Some(ref root) = self.project_root {
                let path = root.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILE);

                if let Some(project) = load_file(&path)? {
                    debug!(
                        path = %path.display(),
                        project = %root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project);
                }
            }
        }

        if !self.skip_env {
            apply_env(&mut config, |name| std::env::var(name).ok())?;
        }

        Ok(config)
    }
}

/// Loads a config file, returning `None` if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<EntitleConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::io(FileOp::Read, path, e))?;
    let config =
        EntitleConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(config))
}

/// Applies `ENTITLE_*` overrides read through `var`.
///
/// Taking the lookup as a closure keeps tests off the process
/// environment.
fn apply_env<F>(config: &mut EntitleConfig, var: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read_bool = |name: &str| -> Result<Option<bool>, ConfigError> {
        var(name)
            .map(|val| {
                parse_bool(&val).ok_or_else(|| ConfigError::invalid_env_var(name, "expected bool"))
            })
            .transpose()
    };

    if let Some(debug) = read_bool("ENTITLE_DEBUG")? {
        config.debug = debug;
    }
    if let Some(notify) = read_bool("ENTITLE_NOTIFY_ON_DENY")? {
        config.guard.notify_on_deny = notify;
    }

    if let Some(route) = var("ENTITLE_NO_ACCESS_ROUTE") {
        if !route.starts_with('/') {
            return Err(ConfigError::invalid_env_var(
                "ENTITLE_NO_ACCESS_ROUTE",
                "expected an absolute path starting with '/'",
            ));
        }
        config.guard.no_access_route = route;
    }
    if let Some(path) = var("ENTITLE_MANIFEST") {
        config.manifest = Some(PathBuf::from(path));
    }
    if let Some(level) = var("ENTITLE_LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Writes `config` to `<project_root>/.entitle/config.toml`.
///
/// Creates the directory if needed. Returns the written path.
///
/// # Errors
///
/// Returns [`ConfigError`] if the directory or file cannot be written.
pub fn save_project_config(
    project_root: &Path,
    config: &EntitleConfig,
) -> Result<PathBuf, ConfigError> {
    let dir = project_root.join(PROJECT_CONFIG_DIR);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::io(FileOp::CreateDir, &dir, e))?;
    }

    let path = dir.join(PROJECT_CONFIG_FILE);
    let toml = config.to_toml()?;
    std::fs::write(&path, toml).map_err(|e| ConfigError::io(FileOp::Write, &path, e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitle_types::ErrorCode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("create dir");
        let path = dir.join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, EntitleConfig::default());
    }

    #[test]
    fn load_project_overrides_global() {
        let global = TempDir::new().expect("tempdir");
        let project = TempDir::new().expect("tempdir");

        let global_path = create_config_file(
            global.path(),
            r#"
debug = true

[guard]
no_access_route = "/global-denied"
"#,
        );
        create_config_file(
            &project.path().join(".entitle"),
            r#"
[guard]
no_access_route = "/project-denied"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project.path())
            .skip_env_vars()
            .load()
            .expect("load");

        // debug from global (not overridden in project)
        assert!(config.debug);
        assert_eq!(config.guard.no_access_route, "/project-denied");
    }

    #[test]
    fn project_cannot_reset_global_to_default() {
        let global = TempDir::new().expect("tempdir");
        let project = TempDir::new().expect("tempdir");

        let global_path = create_config_file(
            global.path(),
            "debug = true\n\n[guard]\nnotify_on_deny = false\n",
        );
        create_config_file(
            &project.path().join(".entitle"),
            "debug = false\n\n[guard]\nnotify_on_deny = true\n",
        );

        let loader = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project.path());

        let config = loader.clone().skip_env_vars().load().expect("load");
        assert!(config.debug);
        assert!(!config.guard.notify_on_deny);

        let mut config = loader.skip_env_vars().load().expect("load");
        apply_env(
            &mut config,
            env(&[("ENTITLE_DEBUG", "false"), ("ENTITLE_NOTIFY_ON_DENY", "true")]),
        )
        .expect("valid env");
        assert!(!config.debug);
        assert!(config.guard.notify_on_deny);
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, EntitleConfig::default());
    }

    #[test]
    fn broken_toml_is_reported_with_path() {
        let project = TempDir::new().expect("tempdir");
        let path = create_config_file(&project.path().join(".entitle"), "debug = [");

        let err = ConfigLoader::new()
            .skip_global_config()
            .with_project_root(project.path())
            .skip_env_vars()
            .load()
            .expect_err("broken toml must fail");

        assert_eq!(err.code(), "CONFIG_PARSE_TOML");
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EntitleConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("ENTITLE_DEBUG", "yes"),
                ("ENTITLE_NOTIFY_ON_DENY", "off"),
                ("ENTITLE_NO_ACCESS_ROUTE", "/upgrade"),
                ("ENTITLE_MANIFEST", "console.toml"),
                ("ENTITLE_LOG_LEVEL", "info"),
            ]),
        )
        .expect("valid env");

        assert!(config.debug);
        assert!(!config.guard.notify_on_deny);
        assert_eq!(config.guard.no_access_route, "/upgrade");
        assert_eq!(config.manifest, Some(PathBuf::from("console.toml")));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_rejects_bad_bool() {
        let mut config = EntitleConfig::default();
        let err = apply_env(&mut config, env(&[("ENTITLE_DEBUG", "maybe")]))
            .expect_err("bad bool must fail");
        assert_eq!(err.code(), "CONFIG_INVALID_ENV_VAR");
        assert!(err.to_string().contains("ENTITLE_DEBUG"));
    }

    #[test]
    fn env_rejects_relative_route() {
        let mut config = EntitleConfig::default();
        let err = apply_env(&mut config, env(&[("ENTITLE_NO_ACCESS_ROUTE", "no-access")]))
            .expect_err("relative route must fail");
        assert_eq!(err.code(), "CONFIG_INVALID_ENV_VAR");
    }

    #[test]
    fn parse_bool_values() {
        for yes in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert_eq!(parse_bool(yes), Some(true), "{yes}");
        }
        for no in ["false", "FALSE", "0", "no", "off"] {
            assert_eq!(parse_bool(no), Some(false), "{no}");
        }
        assert_eq!(parse_bool("invalid"), None);
    }

    #[test]
    fn save_then_load_project_config() {
        let project = TempDir::new().expect("tempdir");
        let mut config = EntitleConfig::default();
        config.guard.no_access_route = "/plans".into();

        let path = save_project_config(project.path(), &config).expect("save");
        assert!(path.ends_with(".entitle/config.toml"));

        let loaded = ConfigLoader::new()
            .skip_global_config()
            .with_project_root(project.path())
            .skip_env_vars()
            .load()
            .expect("load");
        assert_eq!(loaded.guard.no_access_route, "/plans");
    }
}

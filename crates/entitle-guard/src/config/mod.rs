//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌────────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)             │  Per-invocation
//! ├────────────────────────────────────────────┤
//! │  2. Environment Variables (ENTITLE_*)      │  Runtime override
//! ├────────────────────────────────────────────┤
//! │  3. Project Config (.entitle/config.toml)  │  Console-specific
//! ├────────────────────────────────────────────┤
//! │  4. Global Config (~/.entitle/config.toml) │  User defaults
//! ├────────────────────────────────────────────┤
//! │  5. Default Values (compile-time)          │  Fallback
//! └────────────────────────────────────────────┘
//! ```
//!
//! # Merging
//!
//! File layers merge "non-default wins": a field set to its default value
//! in a higher layer is indistinguishable from an absent one, so it never
//! overrides a lower layer. A project config therefore cannot turn
//! `debug` back off, or restore `guard.notify_on_deny = true`, over a
//! global config that changed them. Environment variables and CLI flags
//! assign unconditionally; use `ENTITLE_DEBUG=false` or
//! `ENTITLE_NOTIFY_ON_DENY=true` to reset such a field.
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `ENTITLE_DEBUG` | `debug` | bool |
//! | `ENTITLE_MANIFEST` | `manifest` | PathBuf |
//! | `ENTITLE_NO_ACCESS_ROUTE` | `guard.no_access_route` | String (absolute path) |
//! | `ENTITLE_NOTIFY_ON_DENY` | `guard.notify_on_deny` | bool |
//! | `ENTITLE_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! # <project>/.entitle/config.toml
//! debug = false
//! manifest = ".entitle/console.toml"
//!
//! [guard]
//! no_access_route = "/no-access"
//! notify_on_deny = true
//!
//! [logging]
//! level = "warn"
//! file = false
//! file_level = "debug"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::{ConfigError, FileOp};
pub use loader::{save_project_config, ConfigLoader};
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{EntitleConfig, GuardConfig, LoggingConfig};

/// Default global config directory (`~/.entitle`).
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join(PROJECT_CONFIG_FILE)
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".entitle";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

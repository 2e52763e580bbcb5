//! Configuration resolver trait for layered overrides.
//!
//! ```text
//! ConfigLoader.load()  →  EntitleConfig (base)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()   (CLI flags, tests)
//!                              │
//!                              ▼
//!                     EntitleConfig (final)
//! ```

use super::EntitleConfig;

/// Applies overrides on top of a loaded configuration.
///
/// Implementors should only touch the values they actually carry, so
/// unspecified options keep what the file and env layers produced.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    fn apply(&self, config: &mut EntitleConfig);
}

/// Resolver that makes no changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut EntitleConfig) {}
}

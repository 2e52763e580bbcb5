//! Guard lifecycle for console surfaces.
//!
//! This crate turns the pure decisions of [`entitle_auth`] into what a
//! console actually renders: a placeholder while entitlements load, the
//! protected content, an inline upgrade prompt, a redirect, or a loud
//! misconfiguration.
//!
//! # Flow
//!
//! ```text
//! EntitlementProvider ──watch──► ProviderSnapshot
//!                                       │
//!                                       ▼
//!      GuardSpec ──────────────────► Guard::evaluate
//!                                       │  (AccessPolicy)
//!                                       ▼
//!   Placeholder │ Content │ Fallback │ Redirect │ Misconfigured
//!                                       │
//!                                       └──► Notifier (once per reason)
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`guard`] | [`Guard`] state machine, [`MountHandle`] |
//! | [`provider`] | [`EntitlementProvider`], [`ProviderSnapshot`] |
//! | [`nav`] | Menu filtering |
//! | [`manifest`] | TOML route gates and menu |
//! | [`config`] | Layered configuration |
//! | [`testing`] | [`RecordingNotifier`](testing::RecordingNotifier) |

pub mod config;
mod error;
pub mod guard;
pub mod manifest;
pub mod nav;
mod notify;
pub mod provider;
mod rule;
mod state;
pub mod testing;

pub use error::{GuardError, ManifestError};
pub use guard::{Guard, MountHandle};
pub use manifest::{ConsoleManifest, DenyAction, RouteGate};
pub use nav::{filter_menu, NavEntry};
pub use notify::{DenialNotice, Notifier, SilentNotifier, TracingNotifier};
pub use provider::{EntitlementProvider, ProviderSnapshot};
pub use rule::{GuardOutcome, GuardSpec, OnDeny, Redirect};
pub use state::GuardState;

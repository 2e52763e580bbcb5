//! Access decision primitives for the business console.
//!
//! This crate answers one question: given who is asking (a
//! [`Principal`]) and what a surface demands (a [`Requirement`] or a list
//! of permission codes), is access allowed?
//!
//! # Decision Model
//!
//! ```text
//!            ┌──────────────────────────┐
//! Principal ─┤  wildcard?  (all-access  ├─► Allowed(Bypass)
//!            │              or superadmin)
//!            ├──────────────────────────┤
//!            │  role in requirement.roles? ─► Denied(RoleNotPermitted)
//!            ├──────────────────────────┤
//!            │  every capability key held? ─► Denied(MissingCapabilities)
//!            └──────────────────────────┘
//!                          │
//!                          ▼
//!                  Allowed(Satisfied)
//! ```
//!
//! Two entry points exist and keep their own match policy:
//!
//! | Function | Keys | Policy |
//! |----------|------|--------|
//! | [`can_use_feature`] | feature keys in a [`Requirement`] | all listed keys |
//! | [`has_required_perms`] | permission codes | [`MatchPolicy`], default any |
//!
//! Both are pure: no I/O, no caching, same input → same answer.
//!
//! # Crate Architecture
//!
//! ```text
//! entitle-types (Role, CapabilityKey, ErrorCode)
//!        ↑
//! entitle-auth  ◄── THIS CRATE
//! (Principal, Requirement, decision engine, AccessPolicy)
//!        ↑
//! entitle-guard (Guard state machine, provider, nav, config)
//! ```
//!
//! # Example
//!
//! ```
//! use entitle_auth::{can_use_feature, Principal, Requirement};
//!
//! let principal = Principal::new()
//!     .with_role("business")
//!     .grant("messaging_send");
//!
//! let send = Requirement::features(["MESSAGING_SEND"]);
//! let report = Requirement::features(["MESSAGING_SEND", "MESSAGING_REPORT_VIEW"]);
//!
//! assert!(can_use_feature(&principal, Some(&send)));
//! assert!(!can_use_feature(&principal, Some(&report)));
//! assert!(can_use_feature(&principal, None));
//! ```

pub mod decision;
pub mod error;
pub mod granted;
pub mod lookup;
pub mod policy;
pub mod principal;
pub mod requirement;

pub use decision::{
    can_use_feature, explain, explain_perms, has_required_perms, AllowReason, Decision,
    MatchPolicy,
};
pub use error::AccessDenied;
pub use granted::{normalize_granted, GrantedEntry, ProviderPayload};
pub use lookup::{CapabilityLookup, FnLookup};
pub use policy::{AccessPolicy, DefaultPolicy};
pub use principal::Principal;
pub use requirement::Requirement;

pub use entitle_types::{normalize, CapabilityKey, Role};

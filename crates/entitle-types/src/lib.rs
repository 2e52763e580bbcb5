//! Core types for the entitle access-control crates.
//!
//! This crate holds the vocabulary every other layer speaks: role tags,
//! normalized capability keys and the [`ErrorCode`] contract.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  entitle-types : Role, CapabilityKey, ErrorCode   ◄── HERE   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  entitle-auth  : Principal, Requirement, decision engine    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  entitle-guard : Guard state machine, provider, nav, config │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  entitle-cli   : `entitle` binary                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use entitle_types::{normalize, CapabilityKey, Role};
//!
//! assert_eq!(normalize("  campaign_view "), "CAMPAIGN_VIEW");
//!
//! let key = CapabilityKey::new(" campaign_view ").expect("non-blank key");
//! assert_eq!(key.as_str(), "CAMPAIGN_VIEW");
//!
//! assert!(Role::new("superadmin").is_superadmin());
//! ```

mod error;
mod key;
mod role;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use key::{normalize, CapabilityKey};
pub use role::Role;

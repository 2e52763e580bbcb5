//! Guard and manifest errors.
//!
//! A misconfigured guard is a caller bug and is kept apart from
//! [`AccessDenied`](entitle_auth::AccessDenied), which is a normal answer.

use entitle_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a [`Guard`](crate::Guard).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// The guard was declared without a usable identifier.
    #[error("guard '{guard}' is misconfigured: {detail}")]
    Misconfigured {
        /// Name of the guard, for locating the call site.
        guard: String,
        /// What is wrong with the declaration.
        detail: String,
    },
}

impl GuardError {
    pub(crate) fn misconfigured(guard: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Misconfigured {
            guard: guard.into(),
            detail: detail.into(),
        }
    }
}

impl ErrorCode for GuardError {
    fn code(&self) -> &'static str {
        match self {
            Self::Misconfigured { .. } => "GUARD_MISCONFIGURED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Errors loading a console manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has the wrong shape.
    #[error("failed to parse manifest '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A route declaration is contradictory or malformed.
    #[error("invalid route '{route}' in manifest: {detail}")]
    Invalid { route: String, detail: String },
}

impl ErrorCode for ManifestError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "MANIFEST_READ",
            Self::Parse { .. } => "MANIFEST_PARSE",
            Self::Invalid { .. } => "MANIFEST_INVALID",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

//! Unified error interface for entitle.
//!
//! Every error type in the workspace implements [`ErrorCode`] so callers
//! can branch on a stable machine-readable code instead of message text.
//!
//! # Example
//!
//! ```
//! use entitle_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Timeout,
//!     Forbidden,
//! }
//!
//! impl ErrorCode for FetchError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Timeout => "FETCH_TIMEOUT",
//!             Self::Forbidden => "FETCH_FORBIDDEN",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//! }
//!
//! assert_eq!(FetchError::Timeout.code(), "FETCH_TIMEOUT");
//! assert!(!FetchError::Forbidden.is_recoverable());
//! ```

/// Machine-readable error code contract.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**: e.g. `"ACCESS_NO_LOOKUP"`
/// - **Crate-prefixed**: `ACCESS_`, `GUARD_`, `CONFIG_`, `MANIFEST_`
/// - **Stable**: codes are part of the public contract
///
/// # Recoverability
///
/// An error is recoverable when the user can do something about it
/// (request an upgrade, fix a config file, retry a fetch). Caller bugs
/// such as a guard declared without any identifier are not.
pub trait ErrorCode {
    /// Returns the machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or user action may resolve the error.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the workspace conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks `expected_prefix`, or is not
/// UPPER_SNAKE_CASE.
///
/// # Example
///
/// ```
/// use entitle_types::{assert_error_code, ErrorCode};
///
/// struct Denied;
///
/// impl ErrorCode for Denied {
///     fn code(&self) -> &'static str { "ACCESS_DENIED" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Denied, "ACCESS_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts [`assert_error_code`] for every error in `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

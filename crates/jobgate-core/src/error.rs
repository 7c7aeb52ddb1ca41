//! Common error types for jobgate.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing core domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The role string is not one of the four known roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// An identifier was empty.
    #[error("empty {0} identifier")]
    EmptyIdentifier(&'static str),
}

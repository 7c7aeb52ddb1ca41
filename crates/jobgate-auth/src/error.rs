//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while verifying a bearer credential.
///
/// Every request-time variant maps to 401 for the caller; the variants stay
/// distinct so server-side logs can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header was supplied.
    #[error("no credential supplied")]
    MissingToken,

    /// The `Authorization` header is not a usable bearer credential.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The JWT has expired.
    #[error("token expired")]
    TokenExpired,

    /// The JWT signature is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// The JWT issuer does not match the expected value.
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The token could not be decoded.
    #[error("invalid token format: {0}")]
    InvalidToken(String),

    /// The token decoded but its claims are unusable.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// The signing secret supplied at construction is unusable.
    #[error("invalid signing secret")]
    InvalidSecret,
}

impl AuthError {
    /// Returns `true` if no credential was presented at all.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::MissingToken)
    }

    /// A stable short name for this error, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::MalformedHeader => "malformed_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidToken(_) => "invalid_token",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::InvalidSecret => "invalid_secret",
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingToken
            | Self::MalformedHeader
            | Self::TokenExpired
            | Self::InvalidSignature
            | Self::InvalidIssuer
            | Self::InvalidToken(_)
            | Self::InvalidClaims(_) => 401,
            Self::InvalidSecret => 500,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                Self::InvalidClaims(err.to_string())
            }
            _ => Self::InvalidToken(err.to_string()),
        }
    }
}

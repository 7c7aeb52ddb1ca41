//! Bearer credential verification for jobgate.
//!
//! This crate provides everything needed to turn an `Authorization` header
//! into typed, verified claims:
//!
//! - Bearer header parsing
//! - HS256 (`HMAC-SHA256`) signature verification against an injected secret
//! - Expiry enforcement and claims typing
//!
//! Verification never performs I/O. The secret is handed to the verifier
//! once at construction and is read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use jobgate_auth::{parse_bearer, AuthConfig, CredentialVerifier, HmacVerifier, SigningSecret};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = SigningSecret::new(std::env::var("JWT_SECRET")?)?;
//! let verifier = HmacVerifier::new(&secret, &AuthConfig::default());
//!
//! // In a request handler:
//! let token = parse_bearer(Some("Bearer eyJhbGciOiJIUzI1NiJ9..."))?;
//! let claims = verifier.verify(token)?;
//!
//! println!("Subject: {}", claims.subject_id);
//! println!("Role: {}", claims.role);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bearer;
pub mod error;
pub mod jwt;
pub mod secret;

pub use bearer::parse_bearer;
pub use error::{AuthError, Result};
pub use jwt::{CredentialVerifier, HmacVerifier, VerifiedClaims};
pub use secret::SigningSecret;

#[cfg(any(test, feature = "test-utils"))]
pub use jwt::MockVerifier;

/// Verification settings applied on top of the signing secret.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Expected `iss` claim. Not checked when `None`.
    pub issuer: Option<String>,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_seconds: u64,
}

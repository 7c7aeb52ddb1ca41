//! The service signing secret.

use std::fmt;

use crate::error::{AuthError, Result};

/// HMAC secret used to verify credentials.
///
/// Constructed once at process start and handed to the verifier by value.
/// The bytes are never printed.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSecret`] if the secret is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        Ok(Self(bytes))
    }

    /// Borrow the raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(<{} bytes redacted>)", self.0.len())
    }
}

//! `Authorization: Bearer <token>` parsing.

use crate::error::{AuthError, Result};

/// Extract the token from an `Authorization` header value.
///
/// `None` means the header was absent. The scheme name is matched
/// case-insensitively; surrounding whitespace around the token is ignored.
///
/// # Errors
///
/// - [`AuthError::MissingToken`] if the header is absent.
/// - [`AuthError::MalformedHeader`] if the scheme is not `Bearer` or the
///   token is empty.
pub fn parse_bearer(header: Option<&str>) -> Result<&str> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let (scheme, token) = header
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

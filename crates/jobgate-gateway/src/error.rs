//! Rejection types and responses.
//!
//! Every rejection the gateway produces is rendered as
//! `{"error": "<message>"}` with a 401 or 403 status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use jobgate_auth::AuthError;

/// Gateway rejection that implements `IntoResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No bearer credential on a protected path.
    #[error("Unauthorized - No token provided")]
    MissingCredential,

    /// Credential malformed, badly signed, or expired.
    #[error("Unauthorized - Invalid token")]
    InvalidCredential,

    /// An admin-protected path was reached without the `admin` role.
    #[error("Unauthorized - Admin access required")]
    AdminRequired,

    /// A referrer-protected path was reached without the `job_referrer` role.
    #[error("Unauthorized - Referrer access required")]
    ReferrerRequired,

    /// A referrer-protected path was requested through the main surface.
    #[error("Referrer portal is only accessible via the {label}.* hostname")]
    ReferrerPortalOnly {
        /// The hostname label identifying the referrer portal.
        label: String,
    },

    /// A non-referrer credential was presented on the referrer portal.
    #[error("Forbidden - Referrer portal requires a referrer account")]
    ReferrerAccountRequired,

    /// A referrer credential was presented on the main surface.
    #[error("Forbidden - Referrer accounts must use the referrer portal")]
    ReferrerSurfaceRequired,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::AdminRequired
            | Self::ReferrerRequired
            | Self::ReferrerPortalOnly { .. }
            | Self::ReferrerAccountRequired
            | Self::ReferrerSurfaceRequired => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error, used as a log field.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::AdminRequired => "admin_required",
            Self::ReferrerRequired => "referrer_required",
            Self::ReferrerPortalOnly { .. } => "referrer_portal_only",
            Self::ReferrerAccountRequired => "referrer_account_required",
            Self::ReferrerSurfaceRequired => "referrer_surface_required",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::MissingCredential,
            AuthError::MalformedHeader
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::InvalidIssuer
            | AuthError::InvalidToken(_)
            | AuthError::InvalidClaims(_) => Self::InvalidCredential,
            AuthError::InvalidSecret => {
                tracing::error!(error = %err, "Verifier misconfigured");
                Self::Internal("authentication service error".to_string())
            }
        }
    }
}

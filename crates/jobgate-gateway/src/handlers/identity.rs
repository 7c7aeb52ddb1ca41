//! Identity echo endpoint.

use axum::Json;

use crate::identity::Identity;

/// Return the identity the gateway attached to this request.
///
/// ```text
/// GET /api/auth/me
/// Authorization: Bearer <token>
///
/// Response: 200 OK
/// {
///   "subjectId": "65f1c0ffee",
///   "role": "job_referrer",
///   "isReferrer": true,
///   "referralCodeId": "rc_9f2"
/// }
/// ```
pub async fn current_identity(identity: Identity) -> Json<Identity> {
    Json(identity)
}

//! Verified identity propagated to downstream handlers.
//!
//! On a successful check the gateway attaches an [`Identity`] to the request
//! twice: as a typed request extension (read with the [`Identity`] extractor)
//! and as `x-user-*` headers for handlers that only see raw headers. Client
//! supplied copies of those headers are always removed first.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use jobgate_auth::VerifiedClaims;
use jobgate_core::{ReferralCodeId, Role, SubjectId};

use crate::error::ApiError;

/// Subject identifier header.
pub const HEADER_USER_ID: &str = "x-user-id";
/// Role header.
pub const HEADER_USER_ROLE: &str = "x-user-role";
/// Referrer flag header, referrers only.
pub const HEADER_IS_REFERRER: &str = "x-is-referrer";
/// Referral code header, referrers only.
pub const HEADER_REFERRAL_CODE_ID: &str = "x-referral-code-id";

/// Every header the gateway owns.
pub const IDENTITY_HEADERS: [&str; 4] = [
    HEADER_USER_ID,
    HEADER_USER_ROLE,
    HEADER_IS_REFERRER,
    HEADER_REFERRAL_CODE_ID,
];

/// Referrer-only identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferrerContext {
    /// The referrer flag from the credential.
    pub is_referrer: bool,
    /// The referral code the credential was issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code_id: Option<ReferralCodeId>,
}

/// The verified caller, as seen by downstream handlers.
///
/// Written once by the gateway; handlers treat it as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The credential subject.
    pub subject_id: SubjectId,
    /// The verified role.
    pub role: Role,
    /// Present only when `role` is `job_referrer`.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<ReferrerContext>,
}

impl Identity {
    /// Build an `Identity` from verified claims.
    #[must_use]
    pub fn from_claims(claims: VerifiedClaims) -> Self {
        let referrer = claims.role.is_referrer().then(|| ReferrerContext {
            is_referrer: claims.is_referrer,
            referral_code_id: claims.referral_code_id,
        });

        Self {
            subject_id: claims.subject_id,
            role: claims.role,
            referrer,
        }
    }

    /// The header representation of this identity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredential`] if a claim cannot be carried
    /// in a header value.
    pub fn header_values(&self) -> Result<Vec<(HeaderName, HeaderValue)>, ApiError> {
        let mut headers = vec![
            (
                HeaderName::from_static(HEADER_USER_ID),
                header_value(self.subject_id.as_str())?,
            ),
            (
                HeaderName::from_static(HEADER_USER_ROLE),
                HeaderValue::from_static(self.role.as_str()),
            ),
        ];

        if let Some(referrer) = &self.referrer {
            headers.push((
                HeaderName::from_static(HEADER_IS_REFERRER),
                HeaderValue::from_static(if referrer.is_referrer { "true" } else { "false" }),
            ));
            if let Some(code) = &referrer.referral_code_id {
                headers.push((
                    HeaderName::from_static(HEADER_REFERRAL_CODE_ID),
                    header_value(code.as_str())?,
                ));
            }
        }

        Ok(headers)
    }

    /// Attach this identity to a request about to be forwarded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredential`] if a claim cannot be carried
    /// in a header value; the request is left untouched in that case.
    pub fn attach(self, request: &mut Request) -> Result<(), ApiError> {
        let headers = self.header_values()?;
        for (name, value) in headers {
            request.headers_mut().insert(name, value);
        }
        request.extensions_mut().insert(self);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| {
        tracing::warn!("Credential claim is not a valid header value");
        ApiError::InvalidCredential
    })
}

/// Remove any client-supplied identity headers.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in IDENTITY_HEADERS {
        if headers.remove(name).is_some() {
            tracing::warn!(header = name, "Stripped client-supplied identity header");
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let identity = parts.extensions.get::<Self>().cloned();
        Box::pin(async move { identity.ok_or(ApiError::MissingCredential) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use chrono::{Duration, Utc};

    fn claims(role: Role, code: Option<&str>) -> VerifiedClaims {
        VerifiedClaims {
            subject_id: SubjectId::new("user-1").unwrap(),
            role,
            is_referrer: role.is_referrer(),
            referral_code_id: code.map(|c| ReferralCodeId::new(c).unwrap()),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn non_referrer_has_no_referrer_fields() {
        let identity = Identity::from_claims(claims(Role::JobSeeker, Some("rc-1")));
        assert!(identity.referrer.is_none());

        let headers = identity.header_values().unwrap();
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn referrer_fields_propagated() {
        let identity = Identity::from_claims(claims(Role::JobReferrer, Some("rc-1")));
        let referrer = identity.referrer.clone().unwrap();
        assert!(referrer.is_referrer);
        assert_eq!(referrer.referral_code_id.unwrap().as_str(), "rc-1");

        let headers = identity.header_values().unwrap();
        assert!(headers
            .iter()
            .any(|(n, v)| n == HEADER_IS_REFERRER && v == "true"));
        assert!(headers
            .iter()
            .any(|(n, v)| n == HEADER_REFERRAL_CODE_ID && v == "rc-1"));
    }

    #[test]
    fn serializes_camel_case() {
        let identity = Identity::from_claims(claims(Role::JobReferrer, None));
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "subjectId": "user-1",
                "role": "job_referrer",
                "isReferrer": true,
            })
        );
    }

    #[test]
    fn attach_sets_headers_and_extension() {
        let mut request = Request::new(Body::empty());
        Identity::from_claims(claims(Role::Admin, None))
            .attach(&mut request)
            .unwrap();

        assert_eq!(request.headers()[HEADER_USER_ID], "user-1");
        assert_eq!(request.headers()[HEADER_USER_ROLE], "admin");
        assert!(request.headers().get(HEADER_IS_REFERRER).is_none());
        assert_eq!(
            request.extensions().get::<Identity>().unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn unrepresentable_subject_rejected() {
        let mut c = claims(Role::Admin, None);
        c.subject_id = SubjectId::new("bad\nsubject").unwrap();
        let mut request = Request::new(Body::empty());

        assert_eq!(
            Identity::from_claims(c).attach(&mut request),
            Err(ApiError::InvalidCredential)
        );
        assert!(request.extensions().get::<Identity>().is_none());
    }

    #[test]
    fn strips_forged_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_USER_ROLE, HeaderValue::from_static("admin"));
        headers.insert(HEADER_USER_ID, HeaderValue::from_static("someone"));
        headers.insert("x-other", HeaderValue::from_static("kept"));

        strip_identity_headers(&mut headers);

        assert!(headers.get(HEADER_USER_ROLE).is_none());
        assert!(headers.get(HEADER_USER_ID).is_none());
        assert_eq!(headers["x-other"], "kept");
    }

    #[tokio::test]
    async fn extractor_requires_gateway() {
        let request = Request::new(Body::empty());
        let (mut parts, _) = request.into_parts();
        assert_eq!(
            Identity::from_request_parts(&mut parts, &()).await,
            Err(ApiError::MissingCredential)
        );

        let mut request = Request::new(Body::empty());
        Identity::from_claims(claims(Role::JobPoster, None))
            .attach(&mut request)
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.role, Role::JobPoster);
    }
}

//! JWT verification and claims extraction.
//!
//! This module provides the core credential verification logic: HS256
//! signature verification against the service secret, expiry enforcement,
//! and conversion of the raw payload into typed claims.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use jobgate_core::{ReferralCodeId, Role, SubjectId};

use crate::error::{AuthError, Result};
use crate::secret::SigningSecret;
use crate::AuthConfig;

/// Verified claims extracted from a credential.
///
/// Only produced when every claim decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    /// The subject identifier from the `sub` claim.
    pub subject_id: SubjectId,
    /// The account role.
    pub role: Role,
    /// The referrer flag. Defaults to `true` for referrers and `false`
    /// otherwise when the claim is absent.
    pub is_referrer: bool,
    /// The referral code the credential was issued for, if any.
    pub referral_code_id: Option<ReferralCodeId>,
    /// When the credential expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for verifying bearer credentials.
///
/// Implementations perform no I/O; verification is a pure in-memory check.
pub trait CredentialVerifier: Send + Sync {
    /// Verify a credential and extract its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, badly signed, expired, or
    /// carries unusable claims.
    fn verify(&self, token: &str) -> Result<VerifiedClaims>;
}

/// Raw claims from a JWT before typing.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    role: String,
    #[serde(default, rename = "isReferrer", alias = "is_referrer")]
    is_referrer: Option<bool>,
    #[serde(default, rename = "referralCodeId", alias = "referral_code_id")]
    referral_code_id: Option<String>,
    exp: u64,
}

impl TryFrom<RawClaims> for VerifiedClaims {
    type Error = AuthError;

    fn try_from(raw: RawClaims) -> Result<Self> {
        let subject_id =
            SubjectId::new(raw.sub).map_err(|e| AuthError::InvalidClaims(e.to_string()))?;

        let role: Role = raw
            .role
            .parse()
            .map_err(|e: jobgate_core::CoreError| AuthError::InvalidClaims(e.to_string()))?;

        let referral_code_id = raw
            .referral_code_id
            .map(ReferralCodeId::new)
            .transpose()
            .map_err(|e| AuthError::InvalidClaims(e.to_string()))?;

        let exp_secs = i64::try_from(raw.exp).unwrap_or(i64::MAX);
        let expires_at = DateTime::from_timestamp(exp_secs, 0)
            .ok_or_else(|| AuthError::InvalidClaims("invalid exp timestamp".to_string()))?;

        Ok(Self {
            subject_id,
            role,
            is_referrer: raw.is_referrer.unwrap_or(role.is_referrer()),
            referral_code_id,
            expires_at,
        })
    }
}

/// HMAC-SHA256 credential verifier.
///
/// Holds the decoding key derived from the injected secret; immutable after
/// construction and shareable across any number of concurrent requests.
pub struct HmacVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl HmacVerifier {
    /// Create a verifier for the given secret.
    #[must_use]
    pub fn new(secret: &SigningSecret, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        tracing::debug!(
            algorithm = "HS256",
            leeway_seconds = config.leeway_seconds,
            issuer = ?config.issuer,
            "Credential verifier configured"
        );

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for HmacVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacVerifier")
            .field("leeway", &self.validation.leeway)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier for HmacVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims> {
        let token_data = decode::<RawClaims>(token, &self.key, &self.validation)?;
        VerifiedClaims::try_from(token_data.claims)
    }
}

/// A mock credential verifier for testing.
///
/// Accepts tokens in the format `test-token:<role>:<subject>[:<referral_code_id>]`
/// and treats `expired-token:*` as expired. Every call is counted so tests can
/// assert the verifier was never reached.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockVerifier {
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockVerifier {
    /// Number of times [`CredentialVerifier::verify`] has been called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Build a token this verifier accepts.
    #[must_use]
    pub fn token(role: Role, subject: &str) -> String {
        format!("test-token:{role}:{subject}")
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl CredentialVerifier for MockVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if token.starts_with("expired-token:") {
            return Err(AuthError::TokenExpired);
        }

        let rest = token.strip_prefix("test-token:").ok_or_else(|| {
            AuthError::InvalidToken("expected test-token:<role>:<subject>".to_string())
        })?;

        let parts: Vec<&str> = rest.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(AuthError::InvalidToken(
                "expected test-token:<role>:<subject>".to_string(),
            ));
        }

        let raw = RawClaims {
            sub: parts[1].to_string(),
            role: parts[0].to_string(),
            is_referrer: None,
            referral_code_id: parts.get(2).map(|s| (*s).to_string()),
            exp: u64::try_from((Utc::now() + chrono::Duration::hours(1)).timestamp())
                .unwrap_or(u64::MAX),
        };
        VerifiedClaims::try_from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-signing-secret";

    fn verifier() -> HmacVerifier {
        HmacVerifier::new(&SigningSecret::new(SECRET).unwrap(), &AuthConfig::default())
    }

    fn mint(claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        (Utc::now() + chrono::Duration::hours(1)).timestamp()
    }

    #[test]
    fn verifies_valid_token() {
        let token = mint(
            &json!({ "sub": "user-1", "role": "job_poster", "exp": in_one_hour() }),
            SECRET,
        );

        let claims = verifier().verify(&token).unwrap();
        assert_eq!(claims.subject_id.as_str(), "user-1");
        assert_eq!(claims.role, Role::JobPoster);
        assert!(!claims.is_referrer);
        assert!(claims.referral_code_id.is_none());
    }

    #[test]
    fn referrer_fields_decoded() {
        let token = mint(
            &json!({
                "sub": "ref-7",
                "role": "job_referrer",
                "isReferrer": true,
                "referralCodeId": "rc-123",
                "exp": in_one_hour(),
            }),
            SECRET,
        );

        let claims = verifier().verify(&token).unwrap();
        assert_eq!(claims.role, Role::JobReferrer);
        assert!(claims.is_referrer);
        assert_eq!(claims.referral_code_id.unwrap().as_str(), "rc-123");
    }

    #[test]
    fn referrer_flag_defaults_from_role() {
        let token = mint(
            &json!({ "sub": "ref-7", "role": "job_referrer", "exp": in_one_hour() }),
            SECRET,
        );
        assert!(verifier().verify(&token).unwrap().is_referrer);
    }

    #[test]
    fn expired_token_rejected() {
        let exp = (Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = mint(&json!({ "sub": "user-1", "role": "admin", "exp": exp }), SECRET);

        assert_eq!(verifier().verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = mint(
            &json!({ "sub": "user-1", "role": "admin", "exp": in_one_hour() }),
            b"some-other-secret",
        );

        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn missing_exp_rejected() {
        let token = mint(&json!({ "sub": "user-1", "role": "admin" }), SECRET);

        let err = verifier().verify(&token).unwrap_err();
        assert_eq!(err.http_status_code(), 401);
    }

    #[test]
    fn unknown_role_rejected() {
        let token = mint(
            &json!({ "sub": "user-1", "role": "superuser", "exp": in_one_hour() }),
            SECRET,
        );

        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidClaims(_))
        ));
    }

    #[test]
    fn empty_subject_rejected() {
        let token = mint(
            &json!({ "sub": "", "role": "admin", "exp": in_one_hour() }),
            SECRET,
        );

        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidClaims(_))
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            verifier().verify("garbage"),
            Err(AuthError::InvalidToken(_))
        ));
        let err = verifier().verify("not.a.jwt").unwrap_err();
        assert_eq!(err.http_status_code(), 401);
    }

    #[test]
    fn other_algorithm_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS512),
            &json!({ "sub": "user-1", "role": "admin", "exp": in_one_hour() }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn issuer_enforced_when_configured() {
        let config = AuthConfig {
            issuer: Some("jobportal".to_string()),
            ..AuthConfig::default()
        };
        let verifier = HmacVerifier::new(&SigningSecret::new(SECRET).unwrap(), &config);

        let wrong = mint(
            &json!({ "sub": "u", "role": "admin", "iss": "elsewhere", "exp": in_one_hour() }),
            SECRET,
        );
        assert_eq!(verifier.verify(&wrong), Err(AuthError::InvalidIssuer));

        let right = mint(
            &json!({ "sub": "u", "role": "admin", "iss": "jobportal", "exp": in_one_hour() }),
            SECRET,
        );
        assert!(verifier.verify(&right).is_ok());
    }

    #[test]
    fn mock_verifier_counts_calls() {
        let verifier = MockVerifier::default();
        assert_eq!(verifier.calls(), 0);

        let claims = verifier
            .verify(&MockVerifier::token(Role::Admin, "user-1"))
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(verifier.calls(), 1);

        assert!(verifier.verify("garbage").is_err());
        assert_eq!(verifier.calls(), 2);
    }

    #[test]
    fn mock_verifier_referral_code() {
        let verifier = MockVerifier::default();
        let claims = verifier
            .verify("test-token:job_referrer:ref-1:rc-9")
            .unwrap();
        assert!(claims.is_referrer);
        assert_eq!(claims.referral_code_id.unwrap().as_str(), "rc-9");
    }

    #[test]
    fn mock_verifier_expired() {
        let verifier = MockVerifier::default();
        assert_eq!(
            verifier.verify("expired-token:anything"),
            Err(AuthError::TokenExpired)
        );
    }
}

//! The authorization gate.
//!
//! Every request passes through [`authorize`] before reaching a downstream
//! handler. The decision itself is made by [`evaluate`], a pure function of
//! the request path, hostname and `Authorization` header:
//!
//! 1. Classify the path. Unprotected paths bypass everything below.
//! 2. Resolve the tenant surface. A referrer-protected path requested through
//!    the main surface is rejected before the credential is looked at.
//! 3. Parse and verify the bearer credential.
//! 4. Check every matched rule set's role requirement (admin, then referrer).
//! 5. Check that role and surface agree: only referrers on the referrer
//!    portal, and referrers on the main surface only for referrer paths.
//! 6. Forward with the verified [`Identity`] attached.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use jobgate_auth::{parse_bearer, CredentialVerifier};

use crate::error::ApiError;
use crate::identity::{strip_identity_headers, Identity};
use crate::rules::RuleSet;
use crate::state::GatewayState;
use crate::tenant::Surface;

/// Outcome of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The path is unprotected; forward untouched.
    Bypass,
    /// The caller is allowed; forward with this identity.
    Forward(Identity),
}

/// Decide whether a request may proceed.
///
/// `authorization` is the raw `Authorization` header value, if any.
///
/// # Errors
///
/// Returns the rejection to send to the caller.
pub fn evaluate<V>(
    state: &GatewayState<V>,
    path: &str,
    host: Option<&str>,
    authorization: Option<&str>,
) -> Result<Decision, ApiError>
where
    V: CredentialVerifier,
{
    let matched = state.rules.classify(path);
    if !matched.is_protected() {
        return Ok(Decision::Bypass);
    }

    let surface = state.tenant.resolve(host);

    if matched.contains(RuleSet::Referrer) && !surface.is_referrer_portal() {
        return Err(reject(
            path,
            surface,
            ApiError::ReferrerPortalOnly {
                label: state.tenant.label().to_string(),
            },
        ));
    }

    let claims = parse_bearer(authorization)
        .and_then(|token| state.verifier.verify(token))
        .map_err(|err| {
            tracing::warn!(
                path = %path,
                surface = surface.as_str(),
                auth_error = err.kind(),
                detail = %err,
                "Credential verification failed"
            );
            reject(path, surface, ApiError::from(err))
        })?;

    for set in matched.iter() {
        let err = match set {
            RuleSet::Admin => ApiError::AdminRequired,
            RuleSet::Referrer => ApiError::ReferrerRequired,
            RuleSet::Authenticated => continue,
        };
        if set.required_role() != Some(claims.role) {
            return Err(reject(path, surface, err));
        }
    }

    match surface {
        Surface::ReferrerPortal if !claims.role.is_referrer() => {
            return Err(reject(path, surface, ApiError::ReferrerAccountRequired));
        }
        Surface::Main if claims.role.is_referrer() && !matched.contains(RuleSet::Referrer) => {
            return Err(reject(path, surface, ApiError::ReferrerSurfaceRequired));
        }
        _ => {}
    }

    let identity = Identity::from_claims(claims);
    tracing::debug!(
        path = %path,
        surface = surface.as_str(),
        subject_id = %identity.subject_id,
        role = %identity.role,
        "Request authorized"
    );
    Ok(Decision::Forward(identity))
}

fn reject(path: &str, surface: Surface, err: ApiError) -> ApiError {
    tracing::warn!(
        path = %path,
        surface = surface.as_str(),
        reason = err.code(),
        status = err.status_code().as_u16(),
        "Request rejected"
    );
    err
}

/// Axum middleware running [`evaluate`] on every request.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn authorize<V>(
    State(state): State<Arc<GatewayState<V>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    V: CredentialVerifier + 'static,
{
    strip_identity_headers(request.headers_mut());

    let decision = {
        let headers = request.headers();
        let host = state.tenant.host_of(headers, request.uri());
        // A non-ASCII header cannot be a bearer credential.
        let authorization = headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap_or_default());
        evaluate(&*state, request.uri().path(), host, authorization)
    };

    match decision {
        Ok(Decision::Bypass) => next.run(request).await,
        Ok(Decision::Forward(identity)) => match identity.attach(&mut request) {
            Ok(()) => next.run(request).await,
            Err(err) => err.into_response(),
        },
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobgate_auth::MockVerifier;
    use jobgate_core::Role;

    use crate::config::GatewayConfig;

    const MAIN: Option<&str> = Some("jobs.example");
    const PORTAL: Option<&str> = Some("referrer.jobs.example");

    fn state() -> GatewayState<MockVerifier> {
        GatewayState::new(Arc::new(MockVerifier::default()), GatewayConfig::default())
    }

    fn bearer(role: Role) -> Option<String> {
        Some(format!("Bearer {}", MockVerifier::token(role, "user-1")))
    }

    #[test]
    fn unprotected_path_bypasses_verifier() {
        let state = state();
        assert_eq!(
            evaluate(&state, "/api/jobs", MAIN, None),
            Ok(Decision::Bypass)
        );
        assert_eq!(
            evaluate(&state, "/", PORTAL, Some("Bearer garbage")),
            Ok(Decision::Bypass)
        );
        assert_eq!(state.verifier.calls(), 0);
    }

    #[test]
    fn missing_credential() {
        assert_eq!(
            evaluate(&state(), "/dashboard", MAIN, None),
            Err(ApiError::MissingCredential)
        );
    }

    #[test]
    fn invalid_and_expired_credentials() {
        let state = state();
        for header in ["Bearer garbage", "Bearer expired-token:x", "Basic abc", "Bearer "] {
            assert_eq!(
                evaluate(&state, "/dashboard", MAIN, Some(header)),
                Err(ApiError::InvalidCredential),
                "{header}"
            );
        }
    }

    #[test]
    fn admin_path_requires_admin() {
        let state = state();
        assert_eq!(
            evaluate(&state, "/api/admin/users", MAIN, bearer(Role::JobPoster).as_deref()),
            Err(ApiError::AdminRequired)
        );

        let Ok(Decision::Forward(identity)) =
            evaluate(&state, "/api/admin/users", MAIN, bearer(Role::Admin).as_deref())
        else {
            panic!("admin should be forwarded");
        };
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.subject_id.as_str(), "user-1");
        assert!(identity.referrer.is_none());
    }

    #[test]
    fn referrer_path_on_main_rejected_before_verification() {
        let state = state();
        for auth in [None, bearer(Role::JobReferrer), bearer(Role::Admin)] {
            assert_eq!(
                evaluate(&state, "/referrer/dashboard", MAIN, auth.as_deref()),
                Err(ApiError::ReferrerPortalOnly {
                    label: "referrer".to_string()
                })
            );
        }
        assert_eq!(state.verifier.calls(), 0);
    }

    #[test]
    fn referrer_path_on_portal() {
        let state = state();
        assert_eq!(
            evaluate(&state, "/referrer/dashboard", PORTAL, bearer(Role::JobSeeker).as_deref()),
            Err(ApiError::ReferrerRequired)
        );
        assert!(matches!(
            evaluate(&state, "/referrer/dashboard", PORTAL, bearer(Role::JobReferrer).as_deref()),
            Ok(Decision::Forward(_))
        ));
    }

    #[test]
    fn portal_rejects_non_referrers_on_any_protected_path() {
        let state = state();
        for role in [Role::JobPoster, Role::JobSeeker] {
            assert_eq!(
                evaluate(&state, "/dashboard", PORTAL, bearer(role).as_deref()),
                Err(ApiError::ReferrerAccountRequired)
            );
        }
        // Admin paths still report the admin failure first.
        assert_eq!(
            evaluate(&state, "/api/admin/users", PORTAL, bearer(Role::JobSeeker).as_deref()),
            Err(ApiError::AdminRequired)
        );
        // An admin passing the admin rule is still the wrong account type.
        assert_eq!(
            evaluate(&state, "/api/admin/users", PORTAL, bearer(Role::Admin).as_deref()),
            Err(ApiError::ReferrerAccountRequired)
        );
    }

    #[test]
    fn main_rejects_referrers_on_shared_paths() {
        assert_eq!(
            evaluate(
                &state(),
                "/api/auth/change-password",
                MAIN,
                bearer(Role::JobReferrer).as_deref()
            ),
            Err(ApiError::ReferrerSurfaceRequired)
        );
    }

    #[test]
    fn referrer_on_portal_shared_path_forwarded() {
        let Ok(Decision::Forward(identity)) = evaluate(
            &state(),
            "/api/auth/change-password",
            PORTAL,
            Some("Bearer test-token:job_referrer:ref-1:rc-42"),
        ) else {
            panic!("referrer should be forwarded");
        };
        assert_eq!(identity.role, Role::JobReferrer);
        let referrer = identity.referrer.unwrap();
        assert!(referrer.is_referrer);
        assert_eq!(referrer.referral_code_id.unwrap().as_str(), "rc-42");
    }

    #[test]
    fn overlapping_rules_require_all() {
        let config = GatewayConfig {
            admin_prefixes: vec!["/api/referrer/admin".into()],
            ..GatewayConfig::default()
        };
        let state = GatewayState::new(Arc::new(MockVerifier::default()), config);

        // Referrer passes the referrer rule but not the admin rule.
        assert_eq!(
            evaluate(
                &state,
                "/api/referrer/admin/codes",
                PORTAL,
                bearer(Role::JobReferrer).as_deref()
            ),
            Err(ApiError::AdminRequired)
        );
        // Admin passes the admin rule but not the referrer rule.
        assert_eq!(
            evaluate(
                &state,
                "/api/referrer/admin/codes",
                PORTAL,
                bearer(Role::Admin).as_deref()
            ),
            Err(ApiError::ReferrerRequired)
        );
    }

    #[test]
    fn decisions_are_repeatable() {
        let state = state();
        let cases = [
            ("/api/admin/users", MAIN, bearer(Role::JobPoster)),
            ("/api/admin/users", MAIN, bearer(Role::Admin)),
            ("/referrer/dashboard", MAIN, None),
            ("/dashboard", PORTAL, bearer(Role::JobReferrer)),
            ("/api/jobs", MAIN, None),
        ];
        for (path, host, auth) in &cases {
            let first = evaluate(&state, path, *host, auth.as_deref());
            let second = evaluate(&state, path, *host, auth.as_deref());
            assert_eq!(first, second, "{path}");
        }
    }
}

//! Router configuration.
//!
//! Wraps the downstream application behind the gate and adds the ambient
//! HTTP layers.

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use jobgate_auth::CredentialVerifier;

use crate::gate::authorize;
use crate::handlers::health;
use crate::state::GatewayState;

/// Create the gateway router.
///
/// `downstream` holds the business routes (jobs, applications, referral
/// codes, chat). Every request, including `GET /health` and unmatched
/// paths, passes through [`authorize`]; whether it needs a credential is
/// decided by the configured prefixes alone.
///
/// Layer order, outermost first: trace, CORS, gate, body limit. The gate
/// sits outside the body limit so it sees the plain request body.
pub fn create_router<V>(state: GatewayState<V>, downstream: Router) -> Router
where
    V: CredentialVerifier + 'static,
{
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        .merge(downstream)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn_with_state(state, authorize::<V>))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .into_inner(),
        )
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_any_origin() {
        let origins = vec!["*".to_string()];
        let _layer = build_cors_layer(&origins);
    }

    #[test]
    fn cors_specific_origins() {
        let origins = vec![
            "https://jobs.example".to_string(),
            "https://referrer.jobs.example".to_string(),
            "not a header value\n".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }
}

//! Jobgate Gateway - request authorization and tenant routing
//!
//! This is the main entry point for the gateway service. It serves the gate
//! in front of a minimal downstream (`GET /api/auth/me`) that echoes the
//! verified identity.
//!
//! # Configuration
//!
//! `JWT_SECRET` is required. See [`GatewayConfig::from_env`] for the
//! remaining variables.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to use a mock verifier that accepts
//! tokens in the format `test-token:<role>:<subject>[:<referral_code_id>]`.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "dev-mode")]
use jobgate_auth::MockVerifier;
#[cfg(not(feature = "dev-mode"))]
use jobgate_auth::HmacVerifier;
#[cfg(not(feature = "dev-mode"))]
use jobgate_gateway::config::auth_from_lookup;
use jobgate_gateway::handlers::identity::current_identity;
use jobgate_gateway::{create_router, GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Jobgate Gateway");

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        listen_addr = %config.listen_addr,
        referrer_host_label = %config.referrer_host_label,
        trust_forwarded_host = config.trust_forwarded_host,
        admin_prefixes = ?config.admin_prefixes,
        referrer_prefixes = ?config.referrer_prefixes,
        authenticated_prefixes = ?config.authenticated_prefixes,
        "Gateway configuration loaded"
    );

    #[cfg(feature = "dev-mode")]
    let verifier = {
        tracing::warn!("DEV MODE ENABLED - using mock credential verifier");
        tracing::warn!("Use tokens in format: test-token:<role>:<subject>");
        Arc::new(MockVerifier::default())
    };

    #[cfg(not(feature = "dev-mode"))]
    let verifier = {
        let (secret, auth_config) = auth_from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!(
            issuer = ?auth_config.issuer,
            leeway_seconds = auth_config.leeway_seconds,
            "Credential verifier initialized"
        );
        Arc::new(HmacVerifier::new(&secret, &auth_config))
    };

    let listen_addr = config.listen_addr.clone();
    let state = GatewayState::new(verifier, config);

    let downstream = Router::new().route("/api/auth/me", get(current_identity));
    let app = create_router(state, downstream);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

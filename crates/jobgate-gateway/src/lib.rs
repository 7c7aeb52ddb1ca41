//! Request authorization and tenant-routing gateway for the job portal.
//!
//! Every inbound request passes through one interception point before any
//! business handler runs. The gateway:
//!
//! - classifies the path against the admin, referrer and authenticated
//!   prefix lists
//! - resolves the tenant surface (main portal or referrer portal) from the
//!   hostname
//! - verifies the bearer credential and checks role and surface agreement
//! - forwards the request with the verified identity attached, or rejects it
//!   with a `{"error": "..."}` body
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! │          jobs.example          referrer.jobs.example        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      jobgate-gateway                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │    Path     │─▶│   Tenant    │─▶│  Verifier and       │  │
//! │  │ classifier  │  │  resolver   │  │  identity attach    │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!               Downstream handlers (jobs, applications,
//!               referral codes, chat) read `Identity`
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::routing::get;
//! use axum::Router;
//! use jobgate_auth::{AuthConfig, HmacVerifier, SigningSecret};
//! use jobgate_gateway::{create_router, GatewayConfig, GatewayState, Identity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = SigningSecret::new(std::env::var("JWT_SECRET")?)?;
//! let verifier = Arc::new(HmacVerifier::new(&secret, &AuthConfig::default()));
//! let state = GatewayState::new(verifier, GatewayConfig::default());
//!
//! let downstream = Router::new().route(
//!     "/api/applications",
//!     get(|identity: Identity| async move { identity.subject_id.to_string() }),
//! );
//! let app = create_router(state, downstream);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod rules;
pub mod state;
pub mod tenant;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use gate::{authorize, evaluate, Decision};
pub use identity::Identity;
pub use routes::create_router;
pub use rules::{MatchedRules, RouteRules, RuleSet};
pub use state::GatewayState;
pub use tenant::{Surface, TenantResolver};

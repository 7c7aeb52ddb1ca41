//! Gateway application state.
//!
//! Built once at startup and shared read-only by every request.

use std::sync::Arc;

use jobgate_auth::CredentialVerifier;

use crate::config::GatewayConfig;
use crate::rules::RouteRules;
use crate::tenant::TenantResolver;

/// Shared state for the gateway middleware.
pub struct GatewayState<V>
where
    V: CredentialVerifier,
{
    /// The credential verifier, holding the injected signing secret.
    pub verifier: Arc<V>,
    /// Path classifier.
    pub rules: RouteRules,
    /// Tenant surface resolver.
    pub tenant: TenantResolver,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<V> GatewayState<V>
where
    V: CredentialVerifier,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(verifier: Arc<V>, config: GatewayConfig) -> Self {
        Self {
            verifier,
            rules: config.route_rules(),
            tenant: config.tenant_resolver(),
            config,
        }
    }
}

impl<V> Clone for GatewayState<V>
where
    V: CredentialVerifier,
{
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            rules: self.rules.clone(),
            tenant: self.tenant.clone(),
            config: self.config.clone(),
        }
    }
}

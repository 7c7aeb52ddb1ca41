//! Gateway configuration types.
//!
//! Configuration is resolved once at process start and is immutable
//! afterwards. Values come from serde defaults, optionally overlaid by
//! environment variables through [`GatewayConfig::from_env`].

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use jobgate_auth::{AuthConfig, SigningSecret};

use crate::rules::RouteRules;
use crate::tenant::TenantResolver;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins. `*` allows any origin.
    #[serde(default = "GatewayConfig::default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// First hostname label identifying the referrer portal. Must be a
    /// single non-empty DNS label.
    #[serde(
        default = "GatewayConfig::default_referrer_host_label",
        deserialize_with = "deserialize_host_label"
    )]
    pub referrer_host_label: String,

    /// Honour `X-Forwarded-Host` when resolving the tenant surface.
    #[serde(default)]
    pub trust_forwarded_host: bool,

    /// Prefixes requiring the `admin` role.
    #[serde(default = "GatewayConfig::default_admin_prefixes")]
    pub admin_prefixes: Vec<String>,

    /// Prefixes requiring the `job_referrer` role.
    #[serde(default = "GatewayConfig::default_referrer_prefixes")]
    pub referrer_prefixes: Vec<String>,

    /// Prefixes requiring any verified role.
    #[serde(default = "GatewayConfig::default_authenticated_prefixes")]
    pub authenticated_prefixes: Vec<String>,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_cors_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    const fn default_max_body() -> usize {
        5 * 1024 * 1024 // resumes
    }

    fn default_referrer_host_label() -> String {
        "referrer".to_string()
    }

    fn default_admin_prefixes() -> Vec<String> {
        to_strings(&["/admin", "/api/admin"])
    }

    fn default_referrer_prefixes() -> Vec<String> {
        to_strings(&["/referrer", "/api/referrer"])
    }

    fn default_authenticated_prefixes() -> Vec<String> {
        to_strings(&[
            "/dashboard",
            "/profile",
            "/jobs/post",
            "/api/auth/change-password",
            "/api/auth/me",
            "/api/applications",
            "/api/jobs/manage",
            "/api/chat",
            "/api/resume",
            "/api/referral-codes",
        ])
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unset variables keep their defaults. List variables are
    /// comma-separated; surrounding whitespace and empty entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = split_list(&origins);
        }
        if let Some(bytes) = lookup("MAX_BODY_BYTES") {
            config.max_body_bytes = bytes.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "MAX_BODY_BYTES",
                value: bytes.clone(),
            })?;
        }
        if let Some(label) = lookup("REFERRER_HOST_LABEL") {
            config.referrer_host_label = label.trim().to_string();
        }
        if let Some(flag) = lookup("TRUST_FORWARDED_HOST") {
            config.trust_forwarded_host = parse_bool("TRUST_FORWARDED_HOST", &flag)?;
        }
        if let Some(list) = lookup("ADMIN_PREFIXES") {
            config.admin_prefixes = split_list(&list);
        }
        if let Some(list) = lookup("REFERRER_PREFIXES") {
            config.referrer_prefixes = split_list(&list);
        }
        if let Some(list) = lookup("AUTHENTICATED_PREFIXES") {
            config.authenticated_prefixes = split_list(&list);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the field types cannot express.
    ///
    /// Deserialization and [`GatewayConfig::from_lookup`] already run this;
    /// call it on configs assembled by hand.
    ///
    /// # Errors
    ///
    /// Returns an error if `referrer_host_label` is not a single non-empty
    /// DNS label.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_host_label(&self.referrer_host_label)
    }

    /// Build the path classifier from the configured prefixes.
    #[must_use]
    pub fn route_rules(&self) -> RouteRules {
        RouteRules::new(
            self.admin_prefixes.clone(),
            self.referrer_prefixes.clone(),
            self.authenticated_prefixes.clone(),
        )
    }

    /// Build the tenant resolver from the configured hostname label.
    ///
    /// Assumes the label passed [`GatewayConfig::validate`]; a dotted label
    /// never matches a host.
    #[must_use]
    pub fn tenant_resolver(&self) -> TenantResolver {
        TenantResolver::new(self.referrer_host_label.clone(), self.trust_forwarded_host)
    }
}

/// Load the signing secret and verification settings.
///
/// Reads `JWT_SECRET` (required), `JWT_ISSUER` and `JWT_LEEWAY_SECONDS`.
///
/// # Errors
///
/// Returns an error if the secret is missing or empty, or the leeway is not
/// a number.
pub fn auth_from_lookup<F>(lookup: F) -> Result<(SigningSecret, AuthConfig), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
    let secret = SigningSecret::new(secret).map_err(|_| ConfigError::Invalid {
        var: "JWT_SECRET",
        value: String::new(),
    })?;

    let issuer = lookup("JWT_ISSUER").filter(|iss| !iss.is_empty());
    let leeway_seconds = match lookup("JWT_LEEWAY_SECONDS") {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: "JWT_LEEWAY_SECONDS",
            value: value.clone(),
        })?,
        None => 0,
    };

    Ok((
        secret,
        AuthConfig {
            issuer,
            leeway_seconds,
        },
    ))
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: Self::default_cors_origins(),
            max_body_bytes: Self::default_max_body(),
            referrer_host_label: Self::default_referrer_host_label(),
            trust_forwarded_host: false,
            admin_prefixes: Self::default_admin_prefixes(),
            referrer_prefixes: Self::default_referrer_prefixes(),
            authenticated_prefixes: Self::default_authenticated_prefixes(),
        }
    }
}

fn check_host_label(label: &str) -> Result<(), ConfigError> {
    if label.is_empty() || label.contains('.') || label.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid {
            var: "REFERRER_HOST_LABEL",
            value: label.to_string(),
        });
    }
    Ok(())
}

fn deserialize_host_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    check_host_label(&label).map_err(serde::de::Error::custom)?;
    Ok(label)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        }),
    }
}

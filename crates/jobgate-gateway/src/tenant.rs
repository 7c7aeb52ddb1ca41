//! Tenant surface resolution.
//!
//! The referrer portal is served from a dedicated hostname whose first DNS
//! label is the configured referrer label (`referrer.jobs.example` for the
//! default label). Every other hostname, including a missing one, is the main
//! surface. Resolution is a pure string check.

use axum::http::{HeaderMap, Uri};

/// Forwarded-host header honoured when `trust_forwarded_host` is enabled.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// The front door a request arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The main job portal.
    Main,
    /// The referrer portal.
    ReferrerPortal,
}

impl Surface {
    /// Returns `true` for [`Surface::ReferrerPortal`].
    #[must_use]
    pub const fn is_referrer_portal(self) -> bool {
        matches!(self, Self::ReferrerPortal)
    }

    /// Short name used as a log field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::ReferrerPortal => "referrer_portal",
        }
    }
}

/// Resolves the [`Surface`] of a request from its hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantResolver {
    label: String,
    trust_forwarded_host: bool,
}

impl TenantResolver {
    /// Create a resolver for the given referrer hostname label.
    #[must_use]
    pub fn new(label: impl Into<String>, trust_forwarded_host: bool) -> Self {
        Self {
            label: label.into(),
            trust_forwarded_host,
        }
    }

    /// The hostname label identifying the referrer portal.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pick the hostname of a request.
    ///
    /// Order: `X-Forwarded-Host` (first entry, only when trusted), then
    /// `Host`, then the URI authority.
    #[must_use]
    pub fn host_of<'a>(&self, headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
        let forwarded = self
            .trust_forwarded_host
            .then(|| header_str(headers, X_FORWARDED_HOST))
            .flatten()
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        forwarded
            .or_else(|| header_str(headers, axum::http::header::HOST.as_str()))
            .or_else(|| uri.host())
    }

    /// Resolve a hostname to a surface.
    #[must_use]
    pub fn resolve(&self, host: Option<&str>) -> Surface {
        let Some(host) = host.map(str::trim).filter(|h| !h.is_empty()) else {
            return Surface::Main;
        };

        // Bracketed IPv6 literals have no DNS labels.
        if host.starts_with('[') {
            return Surface::Main;
        }

        let hostname = host.split(':').next().unwrap_or_default();
        let first_label = hostname.split('.').next().unwrap_or_default();

        if !self.label.is_empty() && first_label.eq_ignore_ascii_case(&self.label) {
            Surface::ReferrerPortal
        } else {
            Surface::Main
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

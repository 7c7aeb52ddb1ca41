//! Path classification.
//!
//! A path is protected by a rule set when it starts with any of the set's
//! prefixes. Matching is case-sensitive and byte-exact: `/api/admin` matches
//! `/api/admin`, `/api/admin/users` and `/api/administrators`, but not
//! `/API/admin`. Trailing slashes are never normalized, so a prefix of
//! `/referrer/` does not match `/referrer`.

use jobgate_core::Role;

/// A named group of path prefixes sharing one role requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSet {
    /// Role must be `admin`.
    Admin,
    /// Role must be `job_referrer`.
    Referrer,
    /// Any verified role.
    Authenticated,
}

impl RuleSet {
    /// The role this rule set requires, if any.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Admin => Some(Role::Admin),
            Self::Referrer => Some(Role::JobReferrer),
            Self::Authenticated => None,
        }
    }
}

/// The rule sets a path matched.
///
/// All matched sets apply together: a path under both the admin and
/// referrer prefixes must satisfy both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchedRules {
    admin: bool,
    referrer: bool,
    authenticated: bool,
}

impl MatchedRules {
    /// Returns `true` if any rule set matched.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        self.admin || self.referrer || self.authenticated
    }

    /// Returns `true` if `set` matched.
    #[must_use]
    pub const fn contains(self, set: RuleSet) -> bool {
        match set {
            RuleSet::Admin => self.admin,
            RuleSet::Referrer => self.referrer,
            RuleSet::Authenticated => self.authenticated,
        }
    }

    /// Iterate the matched sets in evaluation order (admin, referrer,
    /// authenticated).
    pub fn iter(self) -> impl Iterator<Item = RuleSet> {
        [RuleSet::Admin, RuleSet::Referrer, RuleSet::Authenticated]
            .into_iter()
            .filter(move |set| self.contains(*set))
    }
}

/// Prefix lists for the three rule sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRules {
    admin: Vec<String>,
    referrer: Vec<String>,
    authenticated: Vec<String>,
}

impl RouteRules {
    /// Build rules from prefix lists.
    ///
    /// Empty prefixes are dropped; an empty prefix would protect every path.
    #[must_use]
    pub fn new(admin: Vec<String>, referrer: Vec<String>, authenticated: Vec<String>) -> Self {
        Self {
            admin: sanitize(admin),
            referrer: sanitize(referrer),
            authenticated: sanitize(authenticated),
        }
    }

    /// Classify a request path.
    #[must_use]
    pub fn classify(&self, path: &str) -> MatchedRules {
        MatchedRules {
            admin: matches_any(&self.admin, path),
            referrer: matches_any(&self.referrer, path),
            authenticated: matches_any(&self.authenticated, path),
        }
    }

    /// The prefixes configured for `set`.
    #[must_use]
    pub fn prefixes(&self, set: RuleSet) -> &[String] {
        match set {
            RuleSet::Admin => &self.admin,
            RuleSet::Referrer => &self.referrer,
            RuleSet::Authenticated => &self.authenticated,
        }
    }
}

fn sanitize(prefixes: Vec<String>) -> Vec<String> {
    prefixes
        .into_iter()
        .filter(|p| {
            if p.is_empty() {
                tracing::warn!("Ignoring empty route prefix");
            }
            !p.is_empty()
        })
        .collect()
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

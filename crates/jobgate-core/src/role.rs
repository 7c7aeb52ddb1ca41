//! Account roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The role carried by a credential.
///
/// The set is closed: a credential naming any other role fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Portal administrator.
    Admin,
    /// Employer posting jobs.
    JobPoster,
    /// Candidate applying to jobs.
    JobSeeker,
    /// Employee issuing referral codes through the referrer portal.
    JobReferrer,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::JobPoster, Self::JobSeeker, Self::JobReferrer];

    /// The wire name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::JobPoster => "job_poster",
            Self::JobSeeker => "job_seeker",
            Self::JobReferrer => "job_referrer",
        }
    }

    /// Returns `true` for [`Role::JobReferrer`].
    #[must_use]
    pub const fn is_referrer(self) -> bool {
        matches!(self, Self::JobReferrer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(
            "Admin".parse::<Role>(),
            Err(CoreError::UnknownRole("Admin".to_string()))
        );
        assert!("referrer".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::JobReferrer).unwrap();
        assert_eq!(json, "\"job_referrer\"");

        let role: Role = serde_json::from_str("\"job_poster\"").unwrap();
        assert_eq!(role, Role::JobPoster);

        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn only_job_referrer_is_referrer() {
        assert!(Role::JobReferrer.is_referrer());
        assert!(!Role::Admin.is_referrer());
        assert!(!Role::JobPoster.is_referrer());
        assert!(!Role::JobSeeker.is_referrer());
    }
}

//! Core domain types for jobgate.
//!
//! This crate provides the vocabulary shared by the verifier and the gateway:
//!
//! - **Roles**: the closed set of account roles a credential can carry
//! - **Identifiers**: opaque subject and referral-code identifiers
//! - **Error types**: common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use jobgate_core::{Role, SubjectId};
//!
//! let role: Role = "job_referrer".parse().unwrap();
//! assert!(role.is_referrer());
//!
//! let subject = SubjectId::new("65f1c0ffee").unwrap();
//! assert_eq!(subject.as_str(), "65f1c0ffee");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod role;

pub use error::{CoreError, Result};
pub use ids::{ReferralCodeId, SubjectId};
pub use role::Role;

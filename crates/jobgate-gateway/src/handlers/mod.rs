//! HTTP request handlers.
//!
//! The gateway itself serves only a health check. `identity` is the minimal
//! downstream consumer the binary mounts behind the gate.

pub mod health;
pub mod identity;

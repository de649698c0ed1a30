//! quotagate core: quota authority wire contract, decision values, and errors.
//!
//! This crate defines the contract surface shared by the gateway and by
//! embedders: the Envoy RLS v3 messages the decision client speaks, the
//! key/query model used to build them, the reduced `RateLimitDecision`
//! value, and the shared error type. It deliberately carries no transport
//! or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `QuotaGateError`/`Result` so a
//! gateway process never crashes on a bad response or bad traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod decision;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{QuotaGateError, Result};

pub use decision::RateLimitDecision;
pub use protocol::query::{QuotaQuery, RateLimitKey};

//! quotagate gateway library entry.
//!
//! This crate wires the decision client, batch router, config, HTTP surface,
//! and metrics into a cohesive gateway stack. It is intended to be consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod router;

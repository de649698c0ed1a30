//! Top-level facade crate for quotagate.
//!
//! Re-exports core types and the gateway library so embedders can depend on
//! a single crate.

pub mod core {
    pub use quotagate_core::*;
}

pub mod gateway {
    pub use quotagate_gateway::*;
}

//! Observability (metrics registry).

pub mod metrics;

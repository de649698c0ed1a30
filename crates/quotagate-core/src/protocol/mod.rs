//! Protocol modules (wire contract + query model).
//!
//! - `rls`: the Envoy RLS v3 messages the decision client exchanges with the
//!   quota authority. The gateway is a consumer of this contract only.
//! - `query`: the key model and the `QuotaQuery` built from it per call.

pub mod query;
pub mod rls;

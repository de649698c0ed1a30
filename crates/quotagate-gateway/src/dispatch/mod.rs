//! Batch routing: seams and the concurrent router.
//!
//! The inbound/outbound transports stay external; this module only defines
//! the seams they plug into (`BatchSource`, `ItemSink`) plus the decision
//! seam (`QuotaDecider`) the router consumes, so routing logic is testable
//! without a remote authority or a real queue.

pub mod router;
pub mod sink;

pub use router::{BatchRouter, RouteSummary};
pub use sink::ChannelSink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quotagate_core::{RateLimitDecision, RateLimitKey, Result};

/// One inbound message awaiting a routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRequest {
    pub tenant_id: String,
    pub user_id: String,
    /// Opaque message body, passed through untouched.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl UserRequest {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            payload: None,
        }
    }

    /// The quota key this item is evaluated under.
    pub fn rate_limit_key(&self) -> RateLimitKey {
        RateLimitKey::principal(self.tenant_id.clone(), self.user_id.clone())
    }
}

/// Decision seam between the router and the quota authority client.
#[async_trait]
pub trait QuotaDecider: Send + Sync {
    async fn evaluate(&self, key: &RateLimitKey) -> Result<RateLimitDecision>;
}

/// An outbound destination accepting one item at a time.
/// No ordering or batching contract beyond the transport's own send.
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn deliver(&self, item: UserRequest) -> Result<()>;
}

/// Inbound transport adapter delivering ordered batches until exhausted.
#[async_trait]
pub trait BatchSource: Send {
    async fn next_batch(&mut self) -> Option<Vec<UserRequest>>;
}

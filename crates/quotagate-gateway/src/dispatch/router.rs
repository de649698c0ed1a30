//! Concurrent batch router: one decision and one destination per item.

use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;

use crate::dispatch::{BatchSource, ItemSink, QuotaDecider, UserRequest};
use crate::obs::metrics::GatewayMetrics;

/// Per-batch tally, returned once every item has a destination.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteSummary {
    pub accepted: usize,
    pub rejected: usize,
    /// Items whose decision call failed (fail-closed). These go to the
    /// rejected sink, so unverified traffic never goes downstream, and are
    /// counted here on top of `rejected`.
    pub failed: usize,
}

enum Disposition {
    Accepted,
    Rejected,
    Failed,
}

pub struct BatchRouter {
    decider: Arc<dyn QuotaDecider>,
    accepted: Arc<dyn ItemSink>,
    rejected: Arc<dyn ItemSink>,
    metrics: Arc<GatewayMetrics>,
}

impl BatchRouter {
    pub fn new(
        decider: Arc<dyn QuotaDecider>,
        accepted: Arc<dyn ItemSink>,
        rejected: Arc<dyn ItemSink>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            decider,
            accepted,
            rejected,
            metrics,
        }
    }

    /// Route every item in the batch, concurrently.
    ///
    /// All decision calls run at once over the shared client channel and are
    /// joined before returning: the batch is not done until every item has
    /// been assigned a destination. One item's failure never aborts its
    /// siblings.
    pub async fn route(&self, batch: Vec<UserRequest>) -> RouteSummary {
        let size = batch.len();

        let mut in_flight = FuturesUnordered::new();
        for item in batch {
            in_flight.push(self.route_one(item));
        }

        let mut summary = RouteSummary::default();
        while let Some(disposition) = in_flight.next().await {
            match disposition {
                Disposition::Accepted => summary.accepted += 1,
                Disposition::Rejected => summary.rejected += 1,
                Disposition::Failed => {
                    summary.rejected += 1;
                    summary.failed += 1;
                }
            }
        }

        tracing::debug!(
            size,
            accepted = summary.accepted,
            rejected = summary.rejected,
            failed = summary.failed,
            "batch routed"
        );
        summary
    }

    /// Drain a batch source until the transport closes it.
    pub async fn run<S: BatchSource>(&self, mut source: S) {
        while let Some(batch) = source.next_batch().await {
            self.route(batch).await;
        }
    }

    async fn route_one(&self, item: UserRequest) -> Disposition {
        let key = item.rate_limit_key();

        match self.decider.evaluate(&key).await {
            Ok(decision) if decision.is_rate_limited => {
                self.metrics.decisions.inc(&[("outcome", "limited")]);
                self.deliver(&self.rejected, "rejected", item).await;
                Disposition::Rejected
            }
            Ok(decision) => {
                let outcome = if decision.is_fail_open { "fail_open" } else { "allowed" };
                self.metrics.decisions.inc(&[("outcome", outcome)]);
                self.deliver(&self.accepted, "accepted", item).await;
                Disposition::Accepted
            }
            Err(e) => {
                // Fail-closed path: observable, non-fatal to the batch.
                tracing::warn!(
                    tenant = %item.tenant_id,
                    user = %item.user_id,
                    error = %e,
                    "decision unavailable, routing item to rejected"
                );
                self.metrics.decision_failures.inc(&[("kind", e.kind())]);
                self.deliver(&self.rejected, "rejected", item).await;
                Disposition::Failed
            }
        }
    }

    async fn deliver(&self, sink: &Arc<dyn ItemSink>, destination: &'static str, item: UserRequest) {
        self.metrics.routed.inc(&[("destination", destination)]);
        if let Err(e) = sink.deliver(item).await {
            tracing::warn!(destination, error = %e, "sink delivery failed");
        }
    }
}

//! Decision client for the remote quota authority.
//!
//! One long-lived multiplexed gRPC channel per client instance. The channel
//! is created at construction (URI validation is eager, so bad config fails
//! startup; the TCP connect itself is lazy and self-healing) and released by
//! a single idempotent `shutdown()`. Concurrent `evaluate` calls share the
//! channel; each carries its own deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use quotagate_core::protocol::rls::{self, RateLimitRequest, RateLimitResponse};
use quotagate_core::{QuotaGateError, QuotaQuery, RateLimitDecision, RateLimitKey, Result};

use crate::config::AuthorityConfig;

/// HTTP/2 keepalive: probe every 30s, drop after 10s without an ack.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct DecisionClient {
    channel: Channel,
    domain: String,
    tiers: Vec<String>,
    timeout_ms: u64,
    fail_open: bool,
    closed: AtomicBool,
    teardown: Notify,
}

impl DecisionClient {
    /// Build the client and its channel from immutable startup config.
    ///
    /// An unparseable endpoint is a fatal `Config` error. Reachability is
    /// not checked here; a down authority surfaces per call as `Transport`,
    /// where the fail-open policy applies.
    pub fn connect(cfg: &AuthorityConfig) -> Result<Self> {
        let endpoint = Endpoint::from_shared(cfg.endpoint_uri())
            .map_err(|e| QuotaGateError::Config(format!("invalid authority endpoint: {e}")))?
            .http2_keep_alive_interval(KEEPALIVE_INTERVAL)
            .keep_alive_timeout(KEEPALIVE_TIMEOUT)
            .keep_alive_while_idle(true)
            .tcp_nodelay(true);

        Ok(Self {
            channel: endpoint.connect_lazy(),
            domain: cfg.domain.clone(),
            tiers: cfg.enabled_tiers(),
            timeout_ms: cfg.timeout_ms,
            fail_open: cfg.fail_open,
            closed: AtomicBool::new(false),
            teardown: Notify::new(),
        })
    }

    /// One authoritative allow/deny decision for `key`.
    ///
    /// Builds a fresh query, sends it under the per-call deadline, and
    /// reduces the composite response. Deadline and transport failures
    /// become a fail-open decision when so configured; shutdown always
    /// surfaces as an error so cancelled calls resolve explicitly.
    pub async fn evaluate(&self, key: &RateLimitKey) -> Result<RateLimitDecision> {
        // Arm the teardown waiter before reading the flag; a shutdown()
        // landing between the two would otherwise miss this call and leave
        // it running to its deadline.
        let cancelled = self.teardown.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();
        if self.closed.load(Ordering::Acquire) {
            return Err(QuotaGateError::Shutdown);
        }

        let query = QuotaQuery::build(&self.domain, key, &self.tiers);
        let deadline = Duration::from_millis(self.timeout_ms);

        let outcome = tokio::select! {
            _ = &mut cancelled => Err(QuotaGateError::Shutdown),
            sent = tokio::time::timeout(deadline, self.should_rate_limit(query.into_request())) => {
                match sent {
                    Ok(Ok(resp)) => Ok(RateLimitDecision::from_response(&resp)),
                    Ok(Err(status)) => Err(QuotaGateError::Transport(status.to_string())),
                    Err(_) => Err(QuotaGateError::DeadlineExceeded {
                        timeout_ms: self.timeout_ms,
                    }),
                }
            }
        };

        match outcome {
            Err(e)
                if self.fail_open
                    && !matches!(e, QuotaGateError::Shutdown)
                    && e.is_decision_unavailable() =>
            {
                tracing::warn!(%key, error = %e, "quota authority unavailable, failing open");
                Ok(RateLimitDecision::fail_open())
            }
            other => other,
        }
    }

    /// Raw unary exchange; this is what tonic codegen would emit for
    /// `RateLimitService/ShouldRateLimit`.
    async fn should_rate_limit(
        &self,
        request: RateLimitRequest,
    ) -> std::result::Result<RateLimitResponse, tonic::Status> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready().await.map_err(|e| {
            tonic::Status::unavailable(format!("authority channel not ready: {e}"))
        })?;

        let codec: ProstCodec<RateLimitRequest, RateLimitResponse> = ProstCodec::default();
        let path = PathAndQuery::from_static(rls::SHOULD_RATE_LIMIT);
        let resp = grpc.unary(tonic::Request::new(request), path, codec).await?;
        Ok(resp.into_inner())
    }

    /// Tear the client down. Idempotent; the first call wins.
    ///
    /// In-flight `evaluate` calls are woken and resolve with `Shutdown`.
    /// The channel itself closes when the last clone drops.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.teardown.notify_waiters();
        tracing::info!("decision client shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl crate::dispatch::QuotaDecider for DecisionClient {
    async fn evaluate(&self, key: &RateLimitKey) -> Result<RateLimitDecision> {
        DecisionClient::evaluate(self, key).await
    }
}

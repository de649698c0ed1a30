//! Shared application state for the quotagate gateway.
//!
//! Built once at startup from immutable config, then cloned (Arc-shared)
//! into the HTTP handlers. Startup errors are explicit (`Result`, no
//! panics) so the composition root decides how to fail.

use std::sync::Arc;

use quotagate_core::Result;

use crate::client::DecisionClient;
use crate::config::GatewayConfig;
use crate::obs::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    client: Arc<DecisionClient>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state: validates nothing beyond what config
    /// already did, but constructing the client surfaces fatal endpoint
    /// config errors here, before the gateway starts serving.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let client = Arc::new(DecisionClient::connect(&cfg.authority)?);
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                client,
                metrics: Arc::new(GatewayMetrics::default()),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn client(&self) -> Arc<DecisionClient> {
        Arc::clone(&self.inner.client)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Scoped release for the owning composition root: marks the gateway
    /// draining and shuts the decision client down (idempotent).
    pub fn shutdown(&self) {
        self.inner.metrics.set_draining();
        self.inner.client.shutdown();
    }
}

use std::collections::BTreeMap;

use quotagate_core::{QuotaGateError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub authority: AuthorityConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(QuotaGateError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.authority.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Connection and decision parameters for the remote quota authority.
/// Fixed at startup; the decision client never re-reads them per call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Namespace scoping all quota counters for this gateway.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Hard per-call decision deadline.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// On authority failure: allow (true) or surface the error (false).
    #[serde(default)]
    pub fail_open: bool,

    /// Filter tiers for opaque keys; each enabled tier becomes one
    /// descriptor per query. Ordered by name for deterministic queries.
    #[serde(default = "default_tiers")]
    pub tiers: BTreeMap<String, bool>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            domain: default_domain(),
            timeout_ms: default_timeout_ms(),
            fail_open: false,
            tiers: default_tiers(),
        }
    }
}

impl AuthorityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(QuotaGateError::Config("authority.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(QuotaGateError::Config("authority.port must not be 0".into()));
        }
        if self.domain.is_empty() {
            return Err(QuotaGateError::Config("authority.domain must not be empty".into()));
        }
        if !(1..=60_000).contains(&self.timeout_ms) {
            return Err(QuotaGateError::Config(
                "authority.timeout_ms must be between 1 and 60000".into(),
            ));
        }
        for name in self.tiers.keys() {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(QuotaGateError::Config(format!(
                    "authority.tiers: invalid tier name {name:?}"
                )));
            }
        }
        Ok(())
    }

    /// Names of the enabled filter tiers, in deterministic (sorted) order.
    pub fn enabled_tiers(&self) -> Vec<String> {
        self.tiers
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn endpoint_uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    8081
}
fn default_domain() -> String {
    "quota".into()
}
fn default_timeout_ms() -> u64 {
    20
}
fn default_tiers() -> BTreeMap<String, bool> {
    BTreeMap::from([("silver".to_string(), true), ("gold".to_string(), true)])
}

//! Key model and quota query construction.
//!
//! A `RateLimitKey` names the principal a decision is about; a `QuotaQuery`
//! is the immutable wire request built from it. Queries are built fresh for
//! every decision call and discarded after send. Each send charges the
//! authority one hit per descriptor, so evaluation is deliberately not
//! idempotent.

use crate::protocol::rls::{DescriptorEntry, RateLimitDescriptor, RateLimitRequest};

/// Every quota query charges exactly one hit per descriptor.
pub const HITS_PER_QUERY: u32 = 1;

/// Suffix appended to a filter tier name to form its descriptor entry key.
const TIER_KEY_SUFFIX: &str = "_filter";

/// The identity a decision is evaluated for.
///
/// Two key modes exist, one per descriptor-mapping strategy:
/// - `Opaque`: a single identifying string, fanned out into one descriptor
///   per enabled filter tier (`<tier>_filter` -> key).
/// - `Principal`: tenant + user, folded into a single descriptor with
///   `tenant_id` and `user_id` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitKey {
    Opaque(String),
    Principal { tenant: String, user: String },
}

impl RateLimitKey {
    pub fn opaque(key: impl Into<String>) -> Self {
        RateLimitKey::Opaque(key.into())
    }

    pub fn principal(tenant: impl Into<String>, user: impl Into<String>) -> Self {
        RateLimitKey::Principal {
            tenant: tenant.into(),
            user: user.into(),
        }
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimitKey::Opaque(k) => write!(f, "{k}"),
            RateLimitKey::Principal { tenant, user } => write!(f, "{tenant}/{user}"),
        }
    }
}

/// A fully-built quota query. Immutable once constructed; never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaQuery {
    request: RateLimitRequest,
}

impl QuotaQuery {
    /// Build the query for one decision call.
    ///
    /// `tiers` only applies to opaque keys; a principal key always folds
    /// into one descriptor. Zero descriptors is a legal (no-op) query.
    pub fn build(domain: &str, key: &RateLimitKey, tiers: &[String]) -> Self {
        let descriptors = match key {
            RateLimitKey::Opaque(k) => tiers
                .iter()
                .map(|tier| RateLimitDescriptor {
                    entries: vec![DescriptorEntry {
                        key: format!("{tier}{TIER_KEY_SUFFIX}"),
                        value: k.clone(),
                    }],
                })
                .collect(),
            RateLimitKey::Principal { tenant, user } => vec![RateLimitDescriptor {
                entries: vec![
                    DescriptorEntry {
                        key: "tenant_id".to_string(),
                        value: tenant.clone(),
                    },
                    DescriptorEntry {
                        key: "user_id".to_string(),
                        value: user.clone(),
                    },
                ],
            }],
        };

        QuotaQuery {
            request: RateLimitRequest {
                domain: domain.to_string(),
                descriptors,
                hits_addend: HITS_PER_QUERY,
            },
        }
    }

    pub fn descriptor_count(&self) -> usize {
        self.request.descriptors.len()
    }

    /// Consume the query into its wire request.
    pub fn into_request(self) -> RateLimitRequest {
        self.request
    }
}

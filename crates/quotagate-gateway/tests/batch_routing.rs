#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;

use quotagate_core::{QuotaGateError, RateLimitDecision, RateLimitKey, Result};
use quotagate_gateway::dispatch::{
    BatchRouter, BatchSource, ChannelSink, QuotaDecider, UserRequest,
};
use quotagate_gateway::obs::metrics::GatewayMetrics;

#[derive(Clone, Copy)]
enum Behavior {
    Allow,
    Limit,
    FailOpen,
    Unavailable,
}

/// Scripted decider: behavior per user id, with a small delay so batch
/// concurrency is actually exercised.
struct ScriptedDecider {
    script: HashMap<String, Behavior>,
    delay: Duration,
}

impl ScriptedDecider {
    fn new(script: &[(&str, Behavior)], delay: Duration) -> Self {
        Self {
            script: script
                .iter()
                .map(|(u, b)| (u.to_string(), *b))
                .collect(),
            delay,
        }
    }
}

#[async_trait]
impl QuotaDecider for ScriptedDecider {
    async fn evaluate(&self, key: &RateLimitKey) -> Result<RateLimitDecision> {
        tokio::time::sleep(self.delay).await;
        let user = match key {
            RateLimitKey::Principal { user, .. } => user.clone(),
            RateLimitKey::Opaque(k) => k.clone(),
        };
        match self.script.get(&user).copied().unwrap_or(Behavior::Allow) {
            Behavior::Allow => Ok(RateLimitDecision {
                is_rate_limited: false,
                remaining: 9,
                limit: 10,
                reset_in_ms: 1000,
                is_fail_open: false,
                unit: Some("SECOND".into()),
            }),
            Behavior::Limit => Ok(RateLimitDecision {
                is_rate_limited: true,
                remaining: 0,
                limit: 10,
                reset_in_ms: 1000,
                is_fail_open: false,
                unit: Some("SECOND".into()),
            }),
            Behavior::FailOpen => Ok(RateLimitDecision::fail_open()),
            Behavior::Unavailable => Err(QuotaGateError::DeadlineExceeded { timeout_ms: 20 }),
        }
    }
}

fn router_with(
    decider: ScriptedDecider,
) -> (
    BatchRouter,
    mpsc::Receiver<UserRequest>,
    mpsc::Receiver<UserRequest>,
    Arc<GatewayMetrics>,
) {
    let (accepted, accepted_rx) = ChannelSink::new(64);
    let (rejected, rejected_rx) = ChannelSink::new(64);
    let metrics = Arc::new(GatewayMetrics::default());
    let router = BatchRouter::new(
        Arc::new(decider),
        Arc::new(accepted),
        Arc::new(rejected),
        Arc::clone(&metrics),
    );
    (router, accepted_rx, rejected_rx, metrics)
}

fn drain(rx: &mut mpsc::Receiver<UserRequest>) -> Vec<String> {
    let mut users = Vec::new();
    while let Ok(item) = rx.try_recv() {
        users.push(item.user_id);
    }
    users.sort();
    users
}

#[tokio::test]
async fn mixed_batch_partitions_exactly() {
    let decider = ScriptedDecider::new(
        &[
            ("u1", Behavior::Allow),
            ("u2", Behavior::Limit),
            ("u3", Behavior::Allow),
            ("u4", Behavior::Limit),
            ("u5", Behavior::FailOpen),
        ],
        Duration::from_millis(1),
    );
    let (router, mut accepted_rx, mut rejected_rx, _) = router_with(decider);

    let batch: Vec<UserRequest> = (1..=5)
        .map(|i| UserRequest::new("acme", format!("u{i}")))
        .collect();
    let summary = router.route(batch).await;

    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.failed, 0);

    // route() returned, so every item already has a destination.
    assert_eq!(drain(&mut accepted_rx), vec!["u1", "u3", "u5"]);
    assert_eq!(drain(&mut rejected_rx), vec!["u2", "u4"]);
}

#[tokio::test]
async fn decision_failure_is_per_item_and_nonfatal() {
    let decider = ScriptedDecider::new(
        &[
            ("ok", Behavior::Allow),
            ("broken", Behavior::Unavailable),
            ("limited", Behavior::Limit),
        ],
        Duration::from_millis(1),
    );
    let (router, mut accepted_rx, mut rejected_rx, metrics) = router_with(decider);

    let batch = vec![
        UserRequest::new("acme", "ok"),
        UserRequest::new("acme", "broken"),
        UserRequest::new("acme", "limited"),
    ];
    let summary = router.route(batch).await;

    // The failed item is reported, routed to rejected, and its siblings
    // still complete.
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(drain(&mut accepted_rx), vec!["ok"]);
    assert_eq!(drain(&mut rejected_rx), vec!["broken", "limited"]);
    assert_eq!(metrics.decision_failures.get(&[("kind", "deadline")]), 1);
}

#[tokio::test]
async fn items_are_decided_concurrently() {
    let per_item = Duration::from_millis(50);
    let decider = ScriptedDecider::new(&[], per_item);
    let (router, mut accepted_rx, _rejected_rx, _) = router_with(decider);

    let batch: Vec<UserRequest> = (0..8)
        .map(|i| UserRequest::new("acme", format!("u{i}")))
        .collect();

    let started = Instant::now();
    let summary = router.route(batch).await;
    let elapsed = started.elapsed();

    assert_eq!(summary.accepted, 8);
    // Sequential evaluation would take >= 8 * 50ms.
    assert!(
        elapsed < per_item * 4,
        "batch took {elapsed:?}, not concurrent"
    );
    assert_eq!(drain(&mut accepted_rx).len(), 8);
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let (router, mut accepted_rx, mut rejected_rx, _) =
        router_with(ScriptedDecider::new(&[], Duration::ZERO));
    let summary = router.route(Vec::new()).await;
    assert_eq!(summary, Default::default());
    assert!(drain(&mut accepted_rx).is_empty());
    assert!(drain(&mut rejected_rx).is_empty());
}

struct VecSource {
    batches: Vec<Vec<UserRequest>>,
}

#[async_trait]
impl BatchSource for VecSource {
    async fn next_batch(&mut self) -> Option<Vec<UserRequest>> {
        if self.batches.is_empty() {
            None
        } else {
            Some(self.batches.remove(0))
        }
    }
}

#[tokio::test]
async fn run_drains_source_until_closed() {
    let decider = ScriptedDecider::new(&[("r1", Behavior::Limit)], Duration::from_millis(1));
    let (router, mut accepted_rx, mut rejected_rx, _) = router_with(decider);

    let source = VecSource {
        batches: vec![
            vec![
                UserRequest::new("acme", "a1"),
                UserRequest::new("acme", "r1"),
            ],
            vec![UserRequest::new("acme", "a2")],
        ],
    };
    router.run(source).await;

    assert_eq!(drain(&mut accepted_rx), vec!["a1", "a2"]);
    assert_eq!(drain(&mut rejected_rx), vec!["r1"]);
}

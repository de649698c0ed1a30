//! The externally visible rate limit decision and its reduction rule.

use serde::Serialize;

use crate::protocol::rls::{Code, DescriptorStatus, RateLimitResponse};

/// Sentinel for numeric fields whose real value is unknown.
pub const UNKNOWN_COUNT: i64 = -1;

/// A single allow/deny decision, reduced from a composite authority
/// response. Immutable once constructed; consumed immediately by the
/// caller and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub is_rate_limited: bool,
    /// Requests left in the most restrictive window, or -1 if unknown.
    pub remaining: i64,
    /// Configured limit of that window, or -1 if unknown.
    pub limit: i64,
    /// Milliseconds until that window resets (0 if unknown).
    pub reset_in_ms: i64,
    /// True when the authority could not answer and policy allowed anyway.
    pub is_fail_open: bool,
    /// Unit of the limit window (e.g. "MINUTE"), if reported.
    pub unit: Option<String>,
}

impl RateLimitDecision {
    /// The decision taken when the authority is unreachable and policy is
    /// fail-open: allowed, with every quota field at its unknown sentinel.
    /// A fail-open decision never claims to know real quota state.
    pub fn fail_open() -> Self {
        RateLimitDecision {
            is_rate_limited: false,
            remaining: UNKNOWN_COUNT,
            limit: UNKNOWN_COUNT,
            reset_in_ms: 0,
            is_fail_open: true,
            unit: None,
        }
    }

    /// Reduce a composite response to one decision.
    ///
    /// The most restrictive status wins: the first `OVER_LIMIT` status, if
    /// any, supplies the quota detail; otherwise the first status is
    /// representative (all are OK). An empty status list yields sentinels.
    pub fn from_response(resp: &RateLimitResponse) -> Self {
        let worst = resp
            .statuses
            .iter()
            .find(|s| s.code() == Code::OverLimit)
            .or_else(|| resp.statuses.first());

        RateLimitDecision {
            is_rate_limited: resp.overall_code() == Code::OverLimit,
            remaining: worst
                .map(|s| i64::from(s.limit_remaining))
                .unwrap_or(UNKNOWN_COUNT),
            limit: worst
                .and_then(|s| s.current_limit.as_ref())
                .map(|l| i64::from(l.requests_per_unit))
                .unwrap_or(UNKNOWN_COUNT),
            reset_in_ms: worst.map(reset_in_ms).unwrap_or(0),
            is_fail_open: false,
            unit: worst
                .and_then(|s| s.current_limit.as_ref())
                .map(|l| l.unit().as_str().to_string()),
        }
    }
}

/// Full duration conversion (seconds and nanos); negative durations clamp
/// to zero rather than producing a reset in the past.
fn reset_in_ms(status: &DescriptorStatus) -> i64 {
    status
        .duration_until_reset
        .as_ref()
        .map(|d| d.seconds.saturating_mul(1000) + i64::from(d.nanos) / 1_000_000)
        .map(|ms| ms.max(0))
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::protocol::rls::{RateLimit, Unit};

    fn status(code: Code, remaining: u32, per_unit: u32, unit: Unit, secs: i64) -> DescriptorStatus {
        DescriptorStatus {
            code: code as i32,
            current_limit: Some(RateLimit {
                requests_per_unit: per_unit,
                unit: unit as i32,
            }),
            limit_remaining: remaining,
            duration_until_reset: Some(prost_types::Duration {
                seconds: secs,
                nanos: 0,
            }),
        }
    }

    fn response(overall: Code, statuses: Vec<DescriptorStatus>) -> RateLimitResponse {
        RateLimitResponse {
            overall_code: overall as i32,
            statuses,
        }
    }

    #[test]
    fn over_limit_status_wins_regardless_of_position() {
        let resp = response(
            Code::OverLimit,
            vec![
                status(Code::Ok, 9, 10, Unit::Second, 1),
                status(Code::OverLimit, 0, 5, Unit::Minute, 42),
                status(Code::Ok, 7, 10, Unit::Second, 1),
            ],
        );
        let d = RateLimitDecision::from_response(&resp);

        assert!(d.is_rate_limited);
        assert!(!d.is_fail_open);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.limit, 5);
        assert_eq!(d.reset_in_ms, 42_000);
        assert_eq!(d.unit.as_deref(), Some("MINUTE"));
    }

    #[test]
    fn all_ok_takes_first_status_as_representative() {
        let resp = response(
            Code::Ok,
            vec![
                status(Code::Ok, 3, 10, Unit::Hour, 5),
                status(Code::Ok, 8, 20, Unit::Day, 9),
            ],
        );
        let d = RateLimitDecision::from_response(&resp);

        assert!(!d.is_rate_limited);
        assert_eq!(d.remaining, 3);
        assert_eq!(d.limit, 10);
        assert_eq!(d.unit.as_deref(), Some("HOUR"));
    }

    #[test]
    fn empty_statuses_yield_sentinels() {
        let d = RateLimitDecision::from_response(&response(Code::Ok, vec![]));

        assert!(!d.is_rate_limited);
        assert_eq!(d.remaining, UNKNOWN_COUNT);
        assert_eq!(d.limit, UNKNOWN_COUNT);
        assert_eq!(d.reset_in_ms, 0);
        assert_eq!(d.unit, None);
    }

    #[test]
    fn status_without_limit_detail_keeps_limit_unknown() {
        let resp = response(
            Code::OverLimit,
            vec![DescriptorStatus {
                code: Code::OverLimit as i32,
                current_limit: None,
                limit_remaining: 0,
                duration_until_reset: None,
            }],
        );
        let d = RateLimitDecision::from_response(&resp);

        assert!(d.is_rate_limited);
        assert_eq!(d.limit, UNKNOWN_COUNT);
        assert_eq!(d.reset_in_ms, 0);
        assert_eq!(d.unit, None);
    }

    #[test]
    fn nanos_contribute_to_reset_ms() {
        let mut s = status(Code::Ok, 1, 2, Unit::Second, 1);
        s.duration_until_reset = Some(prost_types::Duration {
            seconds: 1,
            nanos: 500_000_000,
        });
        let d = RateLimitDecision::from_response(&response(Code::Ok, vec![s]));
        assert_eq!(d.reset_in_ms, 1_500);
    }

    #[test]
    fn fail_open_never_claims_quota_state() {
        let d = RateLimitDecision::fail_open();

        assert!(d.is_fail_open);
        assert!(!d.is_rate_limited);
        assert_eq!(d.remaining, UNKNOWN_COUNT);
        assert_eq!(d.limit, UNKNOWN_COUNT);
        assert_eq!(d.reset_in_ms, 0);
        assert_eq!(d.unit, None);
    }
}

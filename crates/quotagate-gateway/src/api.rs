//! Synchronous decision lookup endpoint.
//!
//! `GET /v1/ratelimit?user_id=...` evaluates the opaque key mode and maps
//! the decision onto HTTP: 200 when allowed (fail-open included, with the
//! flag visible in the body), 429 when throttled, 503 when the decision is
//! unavailable (fail-closed).

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use quotagate_core::{RateLimitDecision, RateLimitKey};

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct RateLimitParams {
    pub user_id: String,
}

pub async fn check_rate_limit(
    State(state): State<AppState>,
    Query(params): Query<RateLimitParams>,
) -> Response {
    let key = RateLimitKey::opaque(params.user_id);
    let metrics = state.metrics();

    let started = Instant::now();
    let outcome = state.client().evaluate(&key).await;
    metrics
        .decision_duration
        .observe(&[("surface", "http")], started.elapsed());

    match outcome {
        Ok(decision) => {
            metrics
                .decisions
                .inc(&[("outcome", decision_outcome(&decision))]);
            decision_response(&decision)
        }
        Err(e) => {
            tracing::warn!(%key, error = %e, "decision unavailable");
            metrics.decision_failures.inc(&[("kind", e.kind())]);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "rate limit decision unavailable" })),
            )
                .into_response()
        }
    }
}

pub(crate) fn decision_outcome(decision: &RateLimitDecision) -> &'static str {
    if decision.is_fail_open {
        "fail_open"
    } else if decision.is_rate_limited {
        "limited"
    } else {
        "allowed"
    }
}

pub(crate) fn decision_response(decision: &RateLimitDecision) -> Response {
    let status = if decision.is_rate_limited {
        StatusCode::TOO_MANY_REQUESTS
    } else {
        StatusCode::OK
    };
    (status, Json(decision)).into_response()
}

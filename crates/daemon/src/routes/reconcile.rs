// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /reconcile/*`, `GET /reconcile/metrics*` — spec.md §4.F/§6.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rp_core::clock::{Clock, SystemClock};
use rp_engine::reconcile::{reconcile_human_loop_timeouts, reconcile_stale_claims, reconcile_stale_syncs};
use rp_wire::{ReconcileHumanLoopRequest, ReconcileHumanLoopResponse, ReconcileRunsRequest, ReconcileRunsResponse, ReconcileSyncRequest, ReconcileSyncResponse};

use crate::state::AppState;

pub async fn reconcile_runs(State(state): State<Arc<AppState>>, Json(body): Json<ReconcileRunsRequest>) -> Json<ReconcileRunsResponse> {
    let now = SystemClock.epoch_ms();
    let retry_delay_ms = body.retry_delay_ms.unwrap_or(state.config.retry_delay_ms);
    let limit = body.limit.unwrap_or(100);
    let counts = reconcile_stale_claims(&state.queue, &state.metrics, now, retry_delay_ms, limit).await;
    Json(ReconcileRunsResponse { total: counts.retried + counts.failed, retried: counts.retried, failed: counts.failed })
}

pub async fn reconcile_sync(State(state): State<Arc<AppState>>, Json(body): Json<ReconcileSyncRequest>) -> Json<ReconcileSyncResponse> {
    let now = SystemClock.epoch_ms();
    let limit = body.limit.unwrap_or(100);
    let counts = reconcile_stale_syncs(&state.lifecycle, &state.metrics, now, body.stale_after_ms, limit).await;
    Json(ReconcileSyncResponse {
        total: counts.succeeded + counts.skipped + counts.failed,
        succeeded: counts.succeeded,
        skipped: counts.skipped,
        failed: counts.failed,
    })
}

pub async fn reconcile_human_loop_timeout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReconcileHumanLoopRequest>,
) -> Json<ReconcileHumanLoopResponse> {
    let now = SystemClock.epoch_ms();
    let limit = body.limit.unwrap_or(100);
    let counts = reconcile_human_loop_timeouts(&state.callbacks, &state.bus, &state.queue, &state.metrics, now, body.timeout_ms, limit).await;
    Json(ReconcileHumanLoopResponse { pending: counts.pending, expired: counts.expired, failed_runs: counts.failed_runs })
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    #[serde(default, rename = "alertLimit")]
    alert_limit: Option<usize>,
}

/// Counters above zero are surfaced as `alerts`, capped at `alertLimit`
/// (default 10) — every other counter is informational only.
pub async fn metrics(State(state): State<Arc<AppState>>, Query(query): Query<MetricsQuery>) -> Json<serde_json::Value> {
    let snapshot = state.metrics.snapshot();
    let alert_limit = query.alert_limit.unwrap_or(10);
    let mut alerts = Vec::new();
    for (name, value) in [
        ("stale_claims_failed", snapshot.stale_claims_failed),
        ("syncs_failed", snapshot.syncs_failed),
        ("human_loop_failed_runs", snapshot.human_loop_failed_runs),
    ] {
        if value > 0 {
            alerts.push(serde_json::json!({"metric": name, "value": value}));
        }
    }
    alerts.truncate(alert_limit);
    Json(serde_json::json!({"metrics": snapshot, "alerts": alerts}))
}

pub async fn metrics_prometheus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], state.metrics.to_prometheus())
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

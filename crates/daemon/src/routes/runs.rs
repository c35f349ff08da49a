// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/runs/*` handlers — spec.md §4.C/§6.
//!
//! `/runs/{runId}/todos` and `/runs/{runId}/todos/events` have no
//! dedicated backing store: todo state already flows through the per-run
//! event bus as `todo.update` events, so both routes are views over the
//! same `EventBus` the main stream uses, one snapshotted and one filtered
//! to live-tail.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use rp_core::clock::{Clock, SystemClock};
use rp_core::event::{RunEvent, RunEventKind};
use rp_core::ids::{RunId, SessionId};
use rp_engine::StartRunRequest;
use rp_wire::{BindRunRequest, RunStartRequest};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn sse_response(rx: tokio::sync::mpsc::Receiver<RunEvent>) -> Response {
    let stream = ReceiverStream::new(rx).map(|event| {
        let chunk = rp_wire::encode_event(&event).map(|c| c.0).unwrap_or_default();
        Ok::<_, Infallible>(Bytes::from(chunk))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

pub async fn start_run(State(state): State<Arc<AppState>>, Json(body): Json<RunStartRequest>) -> ApiResult<Response> {
    let now = SystemClock.epoch_ms();
    let run_id = body.run_id.map(RunId::from).unwrap_or_else(RunId::generate);
    let req = StartRunRequest {
        run_id: Some(run_id.clone()),
        session_id: body.session_id.map(SessionId::from),
        provider: body.provider,
        max_attempts: 3,
        payload: serde_json::json!({
            "run_id": run_id.as_str(),
            "model": body.model,
            "executionProfile": body.execution_profile,
            "providerOptions": body.provider_options,
            "messages": body.messages,
        }),
        require_human_loop: body.require_human_loop,
    };
    let started = state.orchestrator.start_run(req, now).await.map_err(ApiError::from)?;
    Ok(sse_response(started.subscription.rx))
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    cursor: Option<u64>,
}

pub async fn stream_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: axum::http::HeaderMap,
) -> ApiResult<Response> {
    let run_id = RunId::from(run_id);
    let from_seq = resume_cursor(&headers, query.cursor);
    let subscription = state.bus.subscribe(&run_id, from_seq).await.map_err(ApiError::from)?;
    Ok(sse_response(subscription.rx))
}

/// `cursor` query param and `Last-Event-ID` header are accepted
/// equivalently (spec.md §6); the header wins if both are present since
/// it reflects the browser's own EventSource reconnect state.
fn resume_cursor(headers: &axum::http::HeaderMap, cursor: Option<u64>) -> u64 {
    let last_event_id = headers.get("last-event-id").and_then(|v| v.to_str().ok()).and_then(|v| v.parse::<u64>().ok());
    match last_event_id.or(cursor) {
        Some(seq) => seq + 1,
        None => 0,
    }
}

pub async fn stop_run(State(state): State<Arc<AppState>>, Path(run_id): Path<String>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    state.orchestrator.stop(&RunId::from(run_id), now).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn bind_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    Json(body): Json<BindRunRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.ingestor.bind_run(&RunId::from(run_id), &body.session_id).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn get_todos(State(state): State<Arc<AppState>>, Path(run_id): Path<String>) -> ApiResult<Json<serde_json::Value>> {
    let run_id = RunId::from(run_id);
    let mut subscription = state.bus.subscribe(&run_id, 0).await.map_err(ApiError::from)?;
    let mut latest = None;
    while let Ok(event) = subscription.rx.try_recv() {
        if let RunEventKind::TodoUpdate { payload } = event.kind {
            latest = Some(payload);
        }
    }
    Ok(Json(serde_json::json!({"todos": latest})))
}

pub async fn stream_todos(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> ApiResult<Response> {
    let run_id = RunId::from(run_id);
    let from_seq = query.cursor.map(|c| c + 1).unwrap_or(0);
    let subscription = state.bus.subscribe(&run_id, from_seq).await.map_err(ApiError::from)?;

    let stream = ReceiverStream::new(subscription.rx)
        .filter(|event| futures_util::future::ready(matches!(event.kind, RunEventKind::TodoUpdate { .. } | RunEventKind::RunClosed)))
        .map(|event| {
            let chunk = rp_wire::encode_event(&event).map(|c| c.0).unwrap_or_default();
            Ok::<_, Infallible>(Bytes::from(chunk))
        });

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;

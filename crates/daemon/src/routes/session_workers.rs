// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/session-workers/*` — spec.md §4.E/§6.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use rp_core::clock::{Clock, SystemClock};
use rp_core::ids::SessionId;
use rp_engine::lifecycle::ActivateContext;
use rp_wire::{ActivateSessionRequest, ActivateSessionResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<ActivateSessionRequest>,
) -> ApiResult<Json<ActivateSessionResponse>> {
    let now = SystemClock.epoch_ms();
    let session_id = SessionId::from(session_id);
    let workspace_s3_prefix = format!("s3://{}/{}", body.app_id, session_id.as_str());
    let existed_before = state.lifecycle.worker_store().get(&session_id).await.map_err(|e| {
        ApiError::from(rp_engine::LifecycleError::from(e))
    })?;

    let ctx = ActivateContext {
        session_id: session_id.clone(),
        workspace_s3_prefix,
        manifest: body.manifest.map(|manifest| rp_core::ports::executor::RestorePlan { manifest }),
        required_paths: vec![],
    };
    let worker = state.lifecycle.activate_session(ctx, now).await.map_err(ApiError::from)?;

    let action = match existed_before {
        Some(_) => "resumed",
        None => "created",
    };
    Ok(Json(ActivateSessionResponse { action: action.to_string(), worker }))
}

pub async fn cleanup_idle(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    let counts = state.lifecycle.stop_idle_workers(now, state.config.idle_timeout_ms, 100).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"stopped": counts.stopped, "deleted": counts.deleted, "failed": counts.failed})))
}

pub async fn cleanup_stopped(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    let counts = state.lifecycle.remove_long_stopped_workers(now, state.config.remove_after_ms, 100).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"deleted": counts.deleted, "failed": counts.failed})))
}

#[cfg(test)]
#[path = "session_workers_tests.rs"]
mod tests;

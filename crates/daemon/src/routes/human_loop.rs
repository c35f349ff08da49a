// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /human-loop/pending`, `POST /human-loop/reply` — spec.md §4.D/§6.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use rp_core::clock::{Clock, SystemClock};
use rp_core::ids::RunId;
use rp_engine::ReplyOutcome;
use rp_wire::{HumanLoopReplyRequest, HumanLoopReplyResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    #[serde(default, rename = "runId")]
    run_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn pending(State(state): State<Arc<AppState>>, Query(query): Query<PendingQuery>) -> ApiResult<Json<serde_json::Value>> {
    let run_id = query.run_id.map(RunId::from);
    let limit = query.limit.unwrap_or(100);
    let requests = state.callbacks.pending_human_loop(run_id.as_ref(), limit).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"requests": requests})))
}

pub async fn reply(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HumanLoopReplyRequest>,
) -> ApiResult<Json<HumanLoopReplyResponse>> {
    let now = SystemClock.epoch_ms();
    let run_id = RunId::from(body.run_id);
    let outcome =
        state.ingestor.reply_human_loop(&run_id, &body.question_id, body.answer, now).await.map_err(ApiError::from)?;

    match outcome {
        ReplyOutcome::Accepted => Ok(Json(HumanLoopReplyResponse::accepted())),
        ReplyOutcome::Duplicate { status } => Ok(Json(HumanLoopReplyResponse::duplicate(status))),
        ReplyOutcome::Rejected => Err(ApiError::Conflict("human-loop reply rejected by provider".into())),
    }
}

#[cfg(test)]
#[path = "human_loop_tests.rs"]
mod tests;

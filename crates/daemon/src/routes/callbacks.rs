// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /runs/{runId}/callbacks` — spec.md §4.D.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use rp_core::clock::{Clock, SystemClock};
use rp_core::ids::{EventId, RunId};
use rp_core::RunUsage;
use rp_engine::{CallbackEvent, FinishedRunStatus};
use rp_wire::{CallbackRequest, FinishedStatusWire};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn to_engine_event(body: CallbackRequest) -> CallbackEvent {
    match body {
        CallbackRequest::MessageStop { event_id } => CallbackEvent::MessageStop { event_id: EventId::from(event_id) },
        CallbackRequest::TodoUpdate { event_id, payload } => {
            CallbackEvent::TodoUpdate { event_id: EventId::from(event_id), payload }
        }
        CallbackRequest::HumanLoopRequested { event_id, question_id, prompt, metadata } => {
            CallbackEvent::HumanLoopRequested { event_id: EventId::from(event_id), question_id, prompt, metadata }
        }
        CallbackRequest::HumanLoopResolved { event_id, question_id, answer } => {
            CallbackEvent::HumanLoopResolved { event_id: EventId::from(event_id), question_id, answer }
        }
        CallbackRequest::RunFinished { event_id, status, usage, error_message } => CallbackEvent::RunFinished {
            event_id: EventId::from(event_id),
            status: match status {
                FinishedStatusWire::Succeeded => FinishedRunStatus::Succeeded,
                FinishedStatusWire::Failed => FinishedRunStatus::Failed,
                FinishedStatusWire::Canceled => FinishedRunStatus::Canceled,
            },
            usage: usage.map(|u| RunUsage { input_tokens: u.input_tokens, output_tokens: u.output_tokens }),
            error_message,
        },
    }
}

pub async fn post_callback(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    Json(body): Json<CallbackRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    let event = to_engine_event(body);
    let outcome = state.ingestor.ingest(&RunId::from(run_id), event, now).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"action": outcome.action, "duplicate": outcome.duplicate})))
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;

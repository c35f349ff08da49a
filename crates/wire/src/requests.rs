// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request bodies for the HTTP surface, spec.md §6. Field names follow
//! the spec's camelCase JSON convention.

use rp_core::run::ProviderKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /runs/start` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartRequest {
    pub run_id: Option<String>,
    pub session_id: Option<String>,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default = "default_true")]
    pub require_human_loop: bool,
    #[serde(default)]
    pub execution_profile: Option<String>,
    #[serde(default)]
    pub provider_options: Value,
    pub messages: Vec<Value>,
}

fn default_true() -> bool {
    true
}

/// `POST /runs/{runId}/bind` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRunRequest {
    pub session_id: String,
}

/// `POST /runs/{runId}/callbacks` body, discriminated by `kind` — mirrors
/// the five callback kinds named in spec.md §4.D. The daemon maps this
/// onto `rp_engine::CallbackEvent` after attaching the path's `runId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CallbackRequest {
    #[serde(rename = "message.stop", rename_all = "camelCase")]
    MessageStop { event_id: String },
    #[serde(rename = "todo.update", rename_all = "camelCase")]
    TodoUpdate { event_id: String, payload: Value },
    #[serde(rename = "human_loop.requested", rename_all = "camelCase")]
    HumanLoopRequested { event_id: String, question_id: String, prompt: String, #[serde(default)] metadata: Value },
    #[serde(rename = "human_loop.resolved", rename_all = "camelCase")]
    HumanLoopResolved { event_id: String, question_id: String, answer: Value },
    #[serde(rename = "run.finished", rename_all = "camelCase")]
    RunFinished {
        event_id: String,
        status: FinishedStatusWire,
        #[serde(default)]
        usage: Option<UsageWire>,
        #[serde(default)]
        error_message: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishedStatusWire {
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWire {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// `POST /human-loop/reply` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanLoopReplyRequest {
    pub run_id: String,
    pub question_id: String,
    pub answer: Value,
}

/// `POST /reconcile/runs` body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRunsRequest {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
}

/// `POST /reconcile/sync` body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSyncRequest {
    pub stale_after_ms: u64,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `POST /reconcile/human-loop-timeout` body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileHumanLoopRequest {
    pub timeout_ms: u64,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `POST /session-workers/{sessionId}/activate` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSessionRequest {
    pub app_id: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub user_login_name: String,
    #[serde(default)]
    pub runtime_version: Option<String>,
    #[serde(default)]
    pub manifest: Option<Value>,
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;

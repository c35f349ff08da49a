// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response bodies for the HTTP surface, spec.md §6.

use rp_core::SessionWorker;
use serde::{Deserialize, Serialize};

/// `POST /human-loop/reply` response. `409` on orchestrator reject,
/// `404` on unknown question — those cases never construct this type,
/// they're mapped straight to an error response by the handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanLoopReplyResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
}

impl HumanLoopReplyResponse {
    pub fn accepted() -> Self {
        Self { ok: true, status: None, duplicate: None }
    }

    pub fn duplicate(status: impl Into<String>) -> Self {
        Self { ok: true, status: Some(status.into()), duplicate: Some(true) }
    }
}

/// `POST /reconcile/runs` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRunsResponse {
    pub total: u64,
    pub retried: u64,
    pub failed: u64,
}

/// `POST /reconcile/sync` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSyncResponse {
    pub total: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// `POST /reconcile/human-loop-timeout` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileHumanLoopResponse {
    pub pending: u64,
    pub expired: u64,
    pub failed_runs: u64,
}

/// `POST /session-workers/{sessionId}/activate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSessionResponse {
    pub action: String,
    pub worker: SessionWorker,
}

#[cfg(test)]
#[path = "responses_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-in-the-loop question/answer state, grounded on the teacher's
//! `Decision` type but narrowed to the single `pending -> {resolved,
//! expired}` state machine spec.md §3 requires.

use crate::ids::{QuestionId, RunId, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a [`HumanLoopRequest`]. Terminal once `Resolved` or `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanLoopStatus {
    Pending,
    Resolved,
    Expired,
}

impl HumanLoopStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

crate::simple_display! {
    HumanLoopStatus {
        Pending => "pending",
        Resolved => "resolved",
        Expired => "expired",
    }
}

/// A paused question awaiting (or answered by) a caller-supplied reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanLoopRequest {
    pub question_id: QuestionId,
    pub run_id: RunId,
    pub session_id: Option<SessionId>,
    pub prompt: String,
    #[serde(default)]
    pub metadata: Value,
    pub status: HumanLoopStatus,
    pub requested_at: u64,
    pub resolved_at: Option<u64>,
}

impl HumanLoopRequest {
    pub fn new(
        question_id: QuestionId,
        run_id: RunId,
        session_id: Option<SessionId>,
        prompt: String,
        metadata: Value,
        requested_at: u64,
    ) -> Self {
        Self {
            question_id,
            run_id,
            session_id,
            prompt,
            metadata,
            status: HumanLoopStatus::Pending,
            requested_at,
            resolved_at: None,
        }
    }
}

/// A recorded reply to a [`HumanLoopRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanLoopResponse {
    pub question_id: QuestionId,
    pub answer: Value,
    pub answered_at: u64,
}

#[cfg(test)]
#[path = "human_loop_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run event log record and its discriminated-union kinds.

use crate::ids::RunId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry in a run's ordered event log.
///
/// `seq` is gap-free and strictly increasing per `run_id`; `Closed` is
/// always the terminal kind and, once published, nothing further is
/// appended for that run (enforced by the bus, not by this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub run_id: RunId,
    pub seq: u64,
    pub kind: RunEventKind,
    pub ts: u64,
    pub payload: Value,
}

/// Status detail carried on a `RunStatus` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatusDetail {
    Finished,
    Succeeded,
    Failed,
    Canceled,
    Error,
    Blocked,
    WaitingHuman,
    Running,
}

crate::simple_display! {
    RunStatusDetail {
        Finished => "finished",
        Succeeded => "succeeded",
        Failed => "failed",
        Canceled => "canceled",
        Error => "error",
        Blocked => "blocked",
        WaitingHuman => "waiting_human",
        Running => "running",
    }
}

/// Discriminated union of event kinds on the per-run log.
///
/// Mirrors the SSE `event:` names in spec.md §6 exactly so the HTTP layer
/// can forward `kind.as_str()` directly as the SSE event name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunEventKind {
    #[serde(rename = "run.status")]
    RunStatus { status: RunStatusDetail, detail: Option<String> },
    #[serde(rename = "message.delta")]
    MessageDelta { text: String },
    #[serde(rename = "todo.update")]
    TodoUpdate { payload: Value },
    #[serde(rename = "run.warning")]
    RunWarning { message: String },
    #[serde(rename = "run.closed")]
    RunClosed,
}

impl RunEventKind {
    /// The SSE `event:` line value for this kind, per spec.md §6.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStatus { .. } => "run.status",
            Self::MessageDelta { .. } => "message.delta",
            Self::TodoUpdate { .. } => "todo.update",
            Self::RunWarning { .. } => "run.warning",
            Self::RunClosed => "run.closed",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::RunClosed)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

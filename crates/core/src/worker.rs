// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-worker state machine: `running -> stopped -> deleted` (terminal),
//! with a workspace-sync status tracked independently per spec.md §3/§4.E.

use crate::ids::SessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Running,
    Stopped,
    Deleted,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

crate::simple_display! {
    WorkerState {
        Running => "running",
        Stopped => "stopped",
        Deleted => "deleted",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    None,
    Running,
    Success,
    Failed,
}

crate::simple_display! {
    SyncStatus {
        None => "none",
        Running => "running",
        Success => "success",
        Failed => "failed",
    }
}

/// Why a workspace sync was triggered; forwarded to the sync client as the
/// `reason` field so traces can be correlated with the lifecycle event that
/// caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncReason {
    PreStop,
    PreRemove,
    Reconciler,
    Manual,
}

crate::simple_display! {
    SyncReason {
        PreStop => "pre.stop",
        PreRemove => "pre.remove",
        Reconciler => "reconciler",
        Manual => "manual",
    }
}

/// A containerized execution sandbox bound to a session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWorker {
    pub session_id: SessionId,
    pub container_id: String,
    pub workspace_s3_prefix: String,
    pub state: WorkerState,
    pub last_active_at: u64,
    pub stopped_at: Option<u64>,
    pub last_sync_status: SyncStatus,
    pub last_sync_at: Option<u64>,
    pub last_sync_error: Option<String>,
}

impl SessionWorker {
    pub fn new(
        session_id: SessionId,
        container_id: impl Into<String>,
        workspace_s3_prefix: impl Into<String>,
        now: u64,
    ) -> Self {
        Self {
            session_id,
            container_id: container_id.into(),
            workspace_s3_prefix: workspace_s3_prefix.into(),
            state: WorkerState::Running,
            last_active_at: now,
            stopped_at: None,
            last_sync_status: SyncStatus::None,
            last_sync_at: None,
            last_sync_error: None,
        }
    }

    /// Whether this record is idle long enough to be a candidate for
    /// `stopIdleWorkers`.
    pub fn is_idle_since(&self, now: u64, idle_timeout_ms: u64) -> bool {
        self.state == WorkerState::Running && self.last_active_at.saturating_add(idle_timeout_ms) <= now
    }

    /// Whether this record has been stopped long enough to be a candidate
    /// for `removeLongStoppedWorkers`.
    pub fn is_stale_stopped(&self, now: u64, remove_after_ms: u64) -> bool {
        self.state == WorkerState::Stopped
            && self.stopped_at.map(|t| t.saturating_add(remove_after_ms) <= now).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

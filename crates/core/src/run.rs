// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable run queue's row type and status state machine.

use crate::ids::{OwnerId, RunId, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider adapter kind a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Claude,
    Codex,
    OpenCode,
    Fake,
}

crate::simple_display! {
    ProviderKind {
        Claude => "claude",
        Codex => "codex",
        OpenCode => "opencode",
        Fake => "fake",
    }
}

/// Lifecycle status of a [`RunQueueItem`].
///
/// `Queued -> Claimed -> {Queued, Succeeded, Failed, Canceled}`. The three
/// tail variants are terminal except `Queued`, which a claim can re-enter
/// via `markRetryOrFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Claimed,
    Succeeded,
    Failed,
    Canceled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

crate::simple_display! {
    RunStatus {
        Queued => "queued",
        Claimed => "claimed",
        Succeeded => "succeeded",
        Failed => "failed",
        Canceled => "canceled",
    }
}

/// One row in the durable run queue.
///
/// Invariants (enforced by the `QueueStore` implementation, not by this
/// struct alone): `status == Claimed` implies `lock_owner` and
/// `lock_expires_at` are both set; `attempts <= max_attempts`; terminal
/// statuses never transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunQueueItem {
    pub run_id: RunId,
    pub session_id: Option<SessionId>,
    pub provider: ProviderKind,
    pub status: RunStatus,
    pub lock_owner: Option<OwnerId>,
    pub lock_expires_at: Option<u64>,
    /// Earliest epoch-ms at which a retried, still-`Queued` row may be
    /// claimed again. Kept distinct from `lock_expires_at` (see
    /// SPEC_FULL.md §4.A) so a claim lease and a retry backoff are never
    /// confused with one another.
    pub available_at: Option<u64>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub payload: Value,
    pub error_message: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl RunQueueItem {
    pub fn new(
        run_id: RunId,
        session_id: Option<SessionId>,
        provider: ProviderKind,
        max_attempts: u32,
        payload: Value,
        now: u64,
    ) -> Self {
        Self {
            run_id,
            session_id,
            provider,
            status: RunStatus::Queued,
            lock_owner: None,
            lock_expires_at: None,
            available_at: None,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            payload,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this row is eligible for `claimNext` at `now`.
    pub fn is_claimable(&self, now: u64) -> bool {
        match self.status {
            RunStatus::Queued => self.available_at.map(|t| t <= now).unwrap_or(true),
            RunStatus::Claimed => self.lock_expires_at.is_some_and(|t| t <= now),
            _ => false,
        }
    }
}

/// Outcome of `markRetryOrFailed`, returned to the caller per spec.md §4.A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryOutcome {
    pub status: RunStatus,
    pub attempts: u32,
    pub max_attempts: u32,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

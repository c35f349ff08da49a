// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback ingestion state port — spec.md §4.D.
//!
//! Bundles the three pieces of durable state the ingestor touches: the
//! per-run `eventId` dedup set, the human-loop request table, and
//! finalize-once usage. They are kept on one port (rather than three)
//! because every ingest operation reads or writes at least two of them
//! together under the same per-run critical section.

use crate::human_loop::{HumanLoopRequest, HumanLoopResponse};
use crate::ids::{EventId, QuestionId, RunId};
use crate::usage::RunUsage;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("question {0} belongs to a different run")]
    RunMismatch(QuestionId),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type CallbackResult<T> = Result<T, CallbackError>;

/// Whether an ingest call was the first delivery of an `eventId` or a
/// replay that must be treated as a no-op (P2 in spec.md §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    First,
    Duplicate,
}

#[async_trait]
pub trait CallbackStore: Send + Sync {
    /// Record `event_id` against `run_id` if unseen. Returns `Dedup::First`
    /// exactly once per `(run_id, event_id)` pair.
    async fn observe_event(&self, run_id: &RunId, event_id: &EventId) -> CallbackResult<Dedup>;

    /// Record `run_id -> session_id`. Last write wins; idempotent.
    async fn bind_run(&self, run_id: &RunId, session_id: &str) -> CallbackResult<()>;

    async fn session_for_run(&self, run_id: &RunId) -> CallbackResult<Option<String>>;

    async fn insert_human_loop_request(&self, req: HumanLoopRequest) -> CallbackResult<()>;

    async fn find_human_loop_request(
        &self,
        question_id: &QuestionId,
    ) -> CallbackResult<Option<HumanLoopRequest>>;

    /// Transition a pending request to `resolved`, persisting `response`.
    /// No-op if already terminal.
    async fn resolve_human_loop(
        &self,
        question_id: &QuestionId,
        response: HumanLoopResponse,
        now: u64,
    ) -> CallbackResult<()>;

    /// Transition a pending request to `expired`. No-op if already terminal.
    async fn expire_human_loop(&self, question_id: &QuestionId, now: u64) -> CallbackResult<()>;

    /// Pending requests with `requested_at <= now - timeout_ms`, oldest
    /// first, capped at `limit`. Backs the human-loop-timeout reconciler.
    async fn find_stale_human_loop(
        &self,
        now: u64,
        timeout_ms: u64,
        limit: usize,
    ) -> CallbackResult<Vec<HumanLoopRequest>>;

    async fn pending_human_loop(
        &self,
        run_id: Option<&RunId>,
        limit: usize,
    ) -> CallbackResult<Vec<HumanLoopRequest>>;

    /// Record usage for `run_id` iff none has been recorded yet (finalize-once,
    /// P5 in spec.md §8). Returns `true` if this call actually wrote.
    async fn finalize_usage(&self, run_id: &RunId, usage: RunUsage) -> CallbackResult<bool>;

    async fn usage_for_run(&self, run_id: &RunId) -> CallbackResult<Option<RunUsage>>;
}

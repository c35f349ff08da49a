// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable run queue port — spec.md §4.A.

use crate::ids::{OwnerId, RunId, SessionId};
use crate::run::{ProviderKind, RetryOutcome, RunQueueItem};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("run {0} not found")]
    NotFound(RunId),
    #[error("run {0} is already in a terminal status")]
    AlreadyTerminal(RunId),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueOutcome {
    pub accepted: bool,
}

/// The durable FIFO run queue described in spec.md §4.A.
///
/// Implementations must make `claim_next` safe under concurrent callers:
/// exactly one caller may receive a given row for a given eligibility
/// window (P4 in spec.md §8). The reference in-memory implementation uses
/// a single mutex over the whole table as the stand-in for a row-level
/// `SELECT ... FOR UPDATE SKIP LOCKED`.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn enqueue(
        &self,
        run_id: RunId,
        session_id: Option<SessionId>,
        provider: ProviderKind,
        max_attempts: u32,
        payload: Value,
        now: u64,
    ) -> QueueResult<EnqueueOutcome>;

    async fn claim_next(
        &self,
        owner: OwnerId,
        now: u64,
        lease_ms: u64,
    ) -> QueueResult<Option<RunQueueItem>>;

    async fn mark_succeeded(&self, run_id: &RunId, now: u64) -> QueueResult<()>;

    async fn mark_canceled(
        &self,
        run_id: &RunId,
        now: u64,
        reason: Option<String>,
    ) -> QueueResult<()>;

    async fn mark_retry_or_failed(
        &self,
        run_id: &RunId,
        now: u64,
        retry_delay_ms: u64,
        error_message: String,
    ) -> QueueResult<RetryOutcome>;

    async fn find_by_run_id(&self, run_id: &RunId) -> QueueResult<Option<RunQueueItem>>;

    /// Rows with `status = claimed && lock_expires_at <= now`, oldest first,
    /// capped at `limit`. Backs the stale-claim reconciler (spec.md §4.F).
    async fn find_stale_claims(&self, now: u64, limit: usize) -> QueueResult<Vec<RunQueueItem>>;

    /// Number of rows currently `queued` or `claimed`; feeds the
    /// `queue_depth` metric.
    async fn depth(&self) -> QueueResult<u64>;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of [`rp_core::ports::queue::QueueStore`].
//!
//! Stands in for a relational table with a row-level `SELECT ... FOR
//! UPDATE SKIP LOCKED` claim: the whole table sits behind one
//! `parking_lot::Mutex`, and `claim_next` does its scan-then-mutate
//! entirely inside one critical section, which is what makes P3/P4
//! (spec.md §8) hold under concurrent callers.

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::queue::{EnqueueOutcome, QueueError, QueueResult, QueueStore};
use rp_core::{OwnerId, ProviderKind, RetryOutcome, RunId, RunQueueItem, RunStatus, SessionId};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryQueueStore {
    rows: Mutex<HashMap<String, RunQueueItem>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn enqueue(
        &self,
        run_id: RunId,
        session_id: Option<SessionId>,
        provider: ProviderKind,
        max_attempts: u32,
        payload: Value,
        now: u64,
    ) -> QueueResult<EnqueueOutcome> {
        let mut rows = self.rows.lock();
        if rows.contains_key(run_id.as_str()) {
            return Ok(EnqueueOutcome { accepted: false });
        }
        let item = RunQueueItem::new(run_id.clone(), session_id, provider, max_attempts, payload, now);
        rows.insert(run_id.0, item);
        Ok(EnqueueOutcome { accepted: true })
    }

    async fn claim_next(
        &self,
        owner: OwnerId,
        now: u64,
        lease_ms: u64,
    ) -> QueueResult<Option<RunQueueItem>> {
        let mut rows = self.rows.lock();
        let winner = rows
            .values()
            .filter(|r| r.is_claimable(now))
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.run_id.0.cmp(&b.run_id.0)))
            .map(|r| r.run_id.clone());

        let Some(run_id) = winner else { return Ok(None) };
        let Some(row) = rows.get_mut(run_id.as_str()) else { return Ok(None) };
        row.status = RunStatus::Claimed;
        row.lock_owner = Some(owner);
        row.lock_expires_at = Some(now + lease_ms);
        row.available_at = None;
        row.attempts += 1;
        row.error_message = None;
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn mark_succeeded(&self, run_id: &RunId, now: u64) -> QueueResult<()> {
        let mut rows = self.rows.lock();
        let row = rows.get_mut(run_id.as_str()).ok_or_else(|| QueueError::NotFound(run_id.clone()))?;
        if row.status.is_terminal() {
            return Err(QueueError::AlreadyTerminal(run_id.clone()));
        }
        row.status = RunStatus::Succeeded;
        row.lock_owner = None;
        row.lock_expires_at = None;
        row.updated_at = now;
        Ok(())
    }

    async fn mark_canceled(&self, run_id: &RunId, now: u64, reason: Option<String>) -> QueueResult<()> {
        let mut rows = self.rows.lock();
        let row = rows.get_mut(run_id.as_str()).ok_or_else(|| QueueError::NotFound(run_id.clone()))?;
        if row.status.is_terminal() {
            // Cancel is documented idempotent at the orchestrator layer;
            // at the storage layer a second cancel of an already-terminal
            // row is simply a no-op rather than an error.
            return Ok(());
        }
        row.status = RunStatus::Canceled;
        row.lock_owner = None;
        row.lock_expires_at = None;
        row.error_message = reason;
        row.updated_at = now;
        Ok(())
    }

    async fn mark_retry_or_failed(
        &self,
        run_id: &RunId,
        now: u64,
        retry_delay_ms: u64,
        error_message: String,
    ) -> QueueResult<RetryOutcome> {
        let mut rows = self.rows.lock();
        let row = rows.get_mut(run_id.as_str()).ok_or_else(|| QueueError::NotFound(run_id.clone()))?;
        if row.status.is_terminal() {
            return Err(QueueError::AlreadyTerminal(run_id.clone()));
        }
        row.error_message = Some(error_message);
        row.lock_owner = None;
        row.lock_expires_at = None;
        row.updated_at = now;
        if row.attempts >= row.max_attempts {
            row.status = RunStatus::Failed;
        } else {
            row.status = RunStatus::Queued;
            row.available_at = Some(now + retry_delay_ms);
        }
        Ok(RetryOutcome { status: row.status, attempts: row.attempts, max_attempts: row.max_attempts })
    }

    async fn find_by_run_id(&self, run_id: &RunId) -> QueueResult<Option<RunQueueItem>> {
        Ok(self.rows.lock().get(run_id.as_str()).cloned())
    }

    async fn find_stale_claims(&self, now: u64, limit: usize) -> QueueResult<Vec<RunQueueItem>> {
        let rows = self.rows.lock();
        let mut stale: Vec<RunQueueItem> = rows
            .values()
            .filter(|r| r.status == RunStatus::Claimed && r.lock_expires_at.is_some_and(|t| t <= now))
            .cloned()
            .collect();
        stale.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.run_id.0.cmp(&b.run_id.0)));
        stale.truncate(limit);
        Ok(stale)
    }

    async fn depth(&self) -> QueueResult<u64> {
        let rows = self.rows.lock();
        Ok(rows.values().filter(|r| matches!(r.status, RunStatus::Queued | RunStatus::Claimed)).count() as u64)
    }
}

#[cfg(test)]
#[path = "queue_store_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "queue_store_proptests.rs"]
mod proptests;

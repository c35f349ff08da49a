// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-worker repository port — spec.md §3/§4.E.
//!
//! Exposes the specific mutations the lifecycle manager needs rather than
//! a generic read-modify-write closure, so the port stays object-safe
//! behind `Arc<dyn WorkerStore>` and so `last_sync_status = running`
//! compare-and-set (P6 in spec.md §8) is a single atomic operation instead
//! of a race between a separate get and put.

use crate::ids::SessionId;
use crate::worker::SessionWorker;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerStoreError {
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type WorkerStoreResult<T> = Result<T, WorkerStoreError>;

#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn get(&self, session_id: &SessionId) -> WorkerStoreResult<Option<SessionWorker>>;

    /// Insert or fully replace the record for `session_id` (used by the
    /// create-on-activate path).
    async fn put(&self, worker: SessionWorker) -> WorkerStoreResult<()>;

    async fn set_running(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()>;

    async fn touch_active(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()>;

    async fn set_stopped(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()>;

    async fn set_deleted(&self, session_id: &SessionId) -> WorkerStoreResult<()>;

    /// Atomically transition `last_sync_status` from anything but `Running`
    /// to `Running`. Returns `false` if a sync was already in progress
    /// (caller must not start a second concurrent sync for the session).
    async fn begin_sync(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<bool>;

    async fn finish_sync(
        &self,
        session_id: &SessionId,
        now: u64,
        result: Result<(), String>,
    ) -> WorkerStoreResult<()>;

    async fn list_running(&self) -> WorkerStoreResult<Vec<SessionWorker>>;

    async fn list_stopped(&self) -> WorkerStoreResult<Vec<SessionWorker>>;

    async fn list_stale_sync(
        &self,
        now: u64,
        stale_after_ms: u64,
    ) -> WorkerStoreResult<Vec<SessionWorker>>;
}

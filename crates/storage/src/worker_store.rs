// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of
//! [`rp_core::ports::worker_store::WorkerStore`].

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::worker_store::{WorkerStore, WorkerStoreResult};
use rp_core::{SessionId, SessionWorker, SyncStatus, WorkerState};
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryWorkerStore {
    workers: Mutex<HashMap<String, SessionWorker>>,
}

impl InMemoryWorkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerStore for InMemoryWorkerStore {
    async fn get(&self, session_id: &SessionId) -> WorkerStoreResult<Option<SessionWorker>> {
        Ok(self.workers.lock().get(session_id.as_str()).cloned())
    }

    async fn put(&self, worker: SessionWorker) -> WorkerStoreResult<()> {
        self.workers.lock().insert(worker.session_id.0.clone(), worker);
        Ok(())
    }

    async fn set_running(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()> {
        if let Some(w) = self.workers.lock().get_mut(session_id.as_str()) {
            w.state = WorkerState::Running;
            w.stopped_at = None;
            w.last_active_at = now;
        }
        Ok(())
    }

    async fn touch_active(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()> {
        if let Some(w) = self.workers.lock().get_mut(session_id.as_str()) {
            w.last_active_at = now;
        }
        Ok(())
    }

    async fn set_stopped(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<()> {
        if let Some(w) = self.workers.lock().get_mut(session_id.as_str()) {
            w.state = WorkerState::Stopped;
            w.stopped_at = Some(now);
        }
        Ok(())
    }

    async fn set_deleted(&self, session_id: &SessionId) -> WorkerStoreResult<()> {
        if let Some(w) = self.workers.lock().get_mut(session_id.as_str()) {
            w.state = WorkerState::Deleted;
        }
        Ok(())
    }

    async fn begin_sync(&self, session_id: &SessionId, now: u64) -> WorkerStoreResult<bool> {
        let mut workers = self.workers.lock();
        let Some(w) = workers.get_mut(session_id.as_str()) else { return Ok(false) };
        if w.last_sync_status == SyncStatus::Running {
            return Ok(false);
        }
        w.last_sync_status = SyncStatus::Running;
        w.last_sync_at = Some(now);
        w.last_sync_error = None;
        Ok(true)
    }

    async fn finish_sync(
        &self,
        session_id: &SessionId,
        now: u64,
        result: Result<(), String>,
    ) -> WorkerStoreResult<()> {
        if let Some(w) = self.workers.lock().get_mut(session_id.as_str()) {
            w.last_sync_at = Some(now);
            match result {
                Ok(()) => {
                    w.last_sync_status = SyncStatus::Success;
                    w.last_sync_error = None;
                }
                Err(msg) => {
                    w.last_sync_status = SyncStatus::Failed;
                    w.last_sync_error = Some(msg);
                }
            }
        }
        Ok(())
    }

    async fn list_running(&self) -> WorkerStoreResult<Vec<SessionWorker>> {
        Ok(self.workers.lock().values().filter(|w| w.state == WorkerState::Running).cloned().collect())
    }

    async fn list_stopped(&self) -> WorkerStoreResult<Vec<SessionWorker>> {
        Ok(self.workers.lock().values().filter(|w| w.state == WorkerState::Stopped).cloned().collect())
    }

    async fn list_stale_sync(&self, now: u64, stale_after_ms: u64) -> WorkerStoreResult<Vec<SessionWorker>> {
        Ok(self
            .workers
            .lock()
            .values()
            .filter(|w| {
                matches!(w.state, WorkerState::Running | WorkerState::Stopped)
                    && w.last_sync_status != SyncStatus::Running
                    && w.last_sync_at.map(|t| t.saturating_add(stale_after_ms) <= now).unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "worker_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-worker lifecycle manager: create/resume/sync/stop/remove against
//! the container runtime, spec.md §4.E.

use std::sync::Arc;

use rp_core::ids::{SessionId, TraceId};
use rp_core::ports::executor::{CallTrace, DockerClient, ExecutorClient, ExecutorError, RestorePlan, SyncRequest, WorkspaceSyncClient};
use rp_core::ports::worker_store::{WorkerStore, WorkerStoreError};
use rp_core::worker::{SessionWorker, SyncReason, WorkerState};
use thiserror::Error;

const SYNC_INCLUDE: &[&str] = &["/workspace/**", "/workspace/.agent_data/**"];
const SYNC_EXCLUDE: &[&str] = &["/workspace/.codex/**", "/workspace/.claude/**", "/workspace/.opencode/**"];

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("session {0} is already in a terminal state")]
    InvalidTransition(String),
    #[error("workspace validation failed, activation aborted: {0}")]
    ValidationFailed(String),
    #[error(transparent)]
    Store(#[from] WorkerStoreError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Inputs to `activateSession`, spec.md §4.E.
pub struct ActivateContext {
    pub session_id: SessionId,
    pub workspace_s3_prefix: String,
    pub manifest: Option<RestorePlan>,
    pub required_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StopSweepCounts {
    pub stopped: u64,
    pub deleted: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveSweepCounts {
    pub deleted: u64,
    pub failed: u64,
}

pub struct WorkerLifecycleManager {
    store: Arc<dyn WorkerStore>,
    docker: Arc<dyn DockerClient>,
    sync: Arc<dyn WorkspaceSyncClient>,
    executor: Arc<dyn ExecutorClient>,
    executor_id: String,
}

impl WorkerLifecycleManager {
    pub fn new(
        store: Arc<dyn WorkerStore>,
        docker: Arc<dyn DockerClient>,
        sync: Arc<dyn WorkspaceSyncClient>,
        executor: Arc<dyn ExecutorClient>,
        executor_id: impl Into<String>,
    ) -> Self {
        Self { store, docker, sync, executor, executor_id: executor_id.into() }
    }

    fn trace(&self, session_id: &SessionId, operation: &'static str, now: u64) -> CallTrace {
        CallTrace {
            trace_id: TraceId::new(),
            session_id: session_id.as_str().to_string(),
            executor_id: self.executor_id.clone(),
            operation,
            ts: now,
            run_id: None,
        }
    }

    pub async fn activate_session(&self, ctx: ActivateContext, now: u64) -> LifecycleResult<SessionWorker> {
        let existing = self.store.get(&ctx.session_id).await?;

        match existing {
            Some(worker) if worker.state == WorkerState::Running => {
                self.store.touch_active(&ctx.session_id, now).await?;
                let mut worker = worker;
                worker.last_active_at = now;
                Ok(worker)
            }
            Some(worker) if worker.state == WorkerState::Stopped => {
                let exists = self.docker.exists(&worker.container_id, &self.trace(&ctx.session_id, "activate.exists", now)).await?;
                if !exists {
                    return self.create_worker(ctx, now).await;
                }
                self.docker.start(&worker.container_id, &self.trace(&ctx.session_id, "activate.start", now)).await?;
                self.store.set_running(&ctx.session_id, now).await?;
                let mut worker = worker;
                worker.state = WorkerState::Running;
                worker.last_active_at = now;
                worker.stopped_at = None;
                Ok(worker)
            }
            _ => self.create_worker(ctx, now).await,
        }
    }

    async fn create_worker(&self, ctx: ActivateContext, now: u64) -> LifecycleResult<SessionWorker> {
        let create_trace = self.trace(&ctx.session_id, "activate.create", now);
        let container_id = self.docker.create_worker(ctx.session_id.as_str(), &create_trace).await?;
        self.docker.start(&container_id, &self.trace(&ctx.session_id, "activate.start", now)).await?;

        if let Some(plan) = &ctx.manifest {
            let restore_trace = self.trace(&ctx.session_id, "activate.restore", now);
            if let Err(e) = self.run_restore_sequence(&container_id, plan, &ctx.required_paths, &restore_trace).await {
                return Err(e);
            }
        }

        let worker = SessionWorker::new(ctx.session_id.clone(), container_id, ctx.workspace_s3_prefix, now);
        self.store.put(worker.clone()).await?;
        Ok(worker)
    }

    async fn run_restore_sequence(
        &self,
        container_id: &str,
        plan: &RestorePlan,
        required_paths: &[String],
        trace: &CallTrace,
    ) -> LifecycleResult<()> {
        self.executor.restore_workspace(container_id, plan, trace).await?;
        self.executor.link_agent_data(container_id, trace).await?;
        self.executor
            .validate_workspace(container_id, required_paths, trace)
            .await
            .map_err(|e| match e {
                ExecutorError::MissingPaths(paths) => LifecycleError::ValidationFailed(paths.join(", ")),
                other => LifecycleError::Executor(other),
            })?;
        Ok(())
    }

    pub async fn sync_session_workspace(
        &self,
        session_id: &SessionId,
        reason: SyncReason,
        now: u64,
        run_id: Option<String>,
    ) -> LifecycleResult<()> {
        let Some(worker) = self.store.get(session_id).await? else {
            return Err(LifecycleError::InvalidTransition(format!("no worker for session {session_id}")));
        };

        if !self.store.begin_sync(session_id, now).await? {
            return Ok(());
        }

        let mut trace = self.trace(session_id, "sync.workspace", now);
        trace.run_id = run_id;

        let req = SyncRequest {
            session_id: session_id.as_str(),
            container_id: &worker.container_id,
            workspace_s3_prefix: &worker.workspace_s3_prefix,
            include: SYNC_INCLUDE,
            exclude: SYNC_EXCLUDE,
            reason,
            trace,
        };

        let result = self.sync.sync_workspace(req).await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.to_string());
        self.store.finish_sync(session_id, now, outcome).await?;
        result.map_err(LifecycleError::from)
    }

    pub async fn stop_idle_workers(&self, now: u64, idle_timeout_ms: u64, limit: usize) -> LifecycleResult<StopSweepCounts> {
        let mut counts = StopSweepCounts::default();
        let mut candidates: Vec<_> =
            self.store.list_running().await?.into_iter().filter(|w| w.is_idle_since(now, idle_timeout_ms)).collect();
        candidates.truncate(limit);

        for worker in candidates {
            match self.stop_one(&worker, now).await {
                Ok(true) => counts.deleted += 1,
                Ok(false) => counts.stopped += 1,
                Err(_) => counts.failed += 1,
            }
        }
        Ok(counts)
    }

    async fn stop_one(&self, worker: &SessionWorker, now: u64) -> LifecycleResult<bool> {
        let exists = self.docker.exists(&worker.container_id, &self.trace(&worker.session_id, "idle.exists", now)).await?;
        if !exists {
            self.store.set_deleted(&worker.session_id).await?;
            return Ok(true);
        }

        let _ = self.sync_session_workspace(&worker.session_id, SyncReason::PreStop, now, None).await;
        self.docker.stop(&worker.container_id, &self.trace(&worker.session_id, "idle.stop", now)).await?;
        self.store.set_stopped(&worker.session_id, now).await?;
        Ok(false)
    }

    /// Accessor for the reconciler sweep, which needs to list sync
    /// candidates directly rather than through a lifecycle operation.
    pub fn worker_store(&self) -> &Arc<dyn WorkerStore> {
        &self.store
    }

    pub async fn container_exists(&self, worker: &SessionWorker, now: u64) -> LifecycleResult<bool> {
        Ok(self.docker.exists(&worker.container_id, &self.trace(&worker.session_id, "reconcile.exists", now)).await?)
    }

    pub async fn remove_long_stopped_workers(&self, now: u64, remove_after_ms: u64, limit: usize) -> LifecycleResult<RemoveSweepCounts> {
        let mut counts = RemoveSweepCounts::default();
        let mut candidates: Vec<_> =
            self.store.list_stopped().await?.into_iter().filter(|w| w.is_stale_stopped(now, remove_after_ms)).collect();
        candidates.truncate(limit);

        for worker in candidates {
            match self.remove_one(&worker, now).await {
                Ok(()) => counts.deleted += 1,
                Err(_) => counts.failed += 1,
            }
        }
        Ok(counts)
    }

    async fn remove_one(&self, worker: &SessionWorker, now: u64) -> LifecycleResult<()> {
        let exists = self.docker.exists(&worker.container_id, &self.trace(&worker.session_id, "remove.exists", now)).await?;
        if exists {
            let _ = self.sync_session_workspace(&worker.session_id, SyncReason::PreRemove, now, None).await;
            self.docker.remove(&worker.container_id, &self.trace(&worker.session_id, "remove.remove", now)).await?;
        }
        self.store.set_deleted(&worker.session_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

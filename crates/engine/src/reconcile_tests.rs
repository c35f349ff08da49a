// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::{ActivateContext, WorkerLifecycleManager};
use async_trait::async_trait;
use rp_core::ids::{OwnerId, SessionId};
use rp_core::ports::executor::{CallTrace, DockerClient, ExecutorClient, ExecutorError, RestorePlan, SyncRequest, WorkspaceSyncClient};
use rp_core::run::ProviderKind;
use rp_storage::callback_store::InMemoryCallbackStore;
use rp_storage::queue_store::InMemoryQueueStore;
use rp_storage::worker_store::InMemoryWorkerStore;
use serde_json::json;

struct NoopDocker;

#[async_trait]
impl DockerClient for NoopDocker {
    async fn create_worker(&self, _session_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<String> {
        Ok("ctr-1".into())
    }
    async fn start(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn stop(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn remove(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn exists(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<bool> {
        Ok(true)
    }
}

struct NoopSync;

#[async_trait]
impl WorkspaceSyncClient for NoopSync {
    async fn sync_workspace(&self, _req: SyncRequest<'_>) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
}

struct NoopExecutor;

#[async_trait]
impl ExecutorClient for NoopExecutor {
    async fn restore_workspace(&self, _container_id: &str, _plan: &RestorePlan, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn link_agent_data(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn validate_workspace(
        &self,
        _container_id: &str,
        _required_paths: &[String],
        _trace: &CallTrace,
    ) -> rp_core::ports::executor::ExecutorResult<()> {
        Ok(())
    }
    async fn execute_workspace_command(&self, _container_id: &str, _command: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<String> {
        Ok(String::new())
    }
}

#[tokio::test]
async fn stale_claims_are_retried_under_max_attempts_and_failed_once_exhausted() {
    let queue: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
    let metrics = ReconcileMetrics::default();

    queue.enqueue(RunId::from("run-1"), None, ProviderKind::Fake, 2, json!({}), 0).await.unwrap();
    queue.claim_next(OwnerId::new("worker-1"), 0, 1_000).await.unwrap();

    let counts = reconcile_stale_claims(&queue, &metrics, 5_000, 0, 10).await;
    assert_eq!(counts.retried, 1);
    assert_eq!(counts.failed, 0);

    queue.claim_next(OwnerId::new("worker-1"), 6_000, 1_000).await.unwrap();
    let counts2 = reconcile_stale_claims(&queue, &metrics, 10_000, 0, 10).await;
    assert_eq!(counts2.failed, 1);

    let row = queue.find_by_run_id(&RunId::from("run-1")).await.unwrap().unwrap();
    assert_eq!(row.status, rp_core::run::RunStatus::Failed);
    assert_eq!(row.error_message.as_deref(), Some("reconciler_stale_claim_timeout"));
}

#[tokio::test]
async fn stale_syncs_skip_workers_whose_container_is_gone() {
    struct MissingDocker;
    #[async_trait]
    impl DockerClient for MissingDocker {
        async fn create_worker(&self, _session_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<String> {
            Ok("ctr-1".into())
        }
        async fn start(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
            Ok(())
        }
        async fn stop(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
            Ok(())
        }
        async fn remove(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<()> {
            Ok(())
        }
        async fn exists(&self, _container_id: &str, _trace: &CallTrace) -> rp_core::ports::executor::ExecutorResult<bool> {
            Ok(false)
        }
    }

    let store = Arc::new(InMemoryWorkerStore::new());
    let lifecycle = WorkerLifecycleManager::new(store.clone(), Arc::new(MissingDocker), Arc::new(NoopSync), Arc::new(NoopExecutor), "executor-1");
    let metrics = ReconcileMetrics::default();

    let ctx = ActivateContext { session_id: SessionId::new("sess-1"), workspace_s3_prefix: "s3://p".into(), manifest: None, required_paths: vec![] };
    lifecycle.activate_session(ctx, 0).await.unwrap();

    let counts = reconcile_stale_syncs(&lifecycle, &metrics, 1_000_000, 1_000, 10).await;
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.succeeded, 0);
}

#[tokio::test]
async fn stale_syncs_succeed_for_workers_with_a_live_container() {
    let store = Arc::new(InMemoryWorkerStore::new());
    let lifecycle = WorkerLifecycleManager::new(store.clone(), Arc::new(NoopDocker), Arc::new(NoopSync), Arc::new(NoopExecutor), "executor-1");
    let metrics = ReconcileMetrics::default();

    let ctx = ActivateContext { session_id: SessionId::new("sess-2"), workspace_s3_prefix: "s3://p".into(), manifest: None, required_paths: vec![] };
    lifecycle.activate_session(ctx, 0).await.unwrap();

    let counts = reconcile_stale_syncs(&lifecycle, &metrics, 1_000_000, 1_000, 10).await;
    assert_eq!(counts.succeeded, 1);
}

#[tokio::test]
async fn human_loop_timeouts_expire_and_fail_the_owning_run() {
    let queue: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
    let bus: Arc<dyn EventBus> = Arc::new(rp_bus::InMemoryEventBus::new(100, 100));
    let callbacks: Arc<dyn CallbackStore> = Arc::new(InMemoryCallbackStore::new());
    let metrics = ReconcileMetrics::default();

    let run_id = RunId::from("run-1");
    queue.enqueue(run_id.clone(), None, ProviderKind::Fake, 3, json!({}), 0).await.unwrap();
    queue.claim_next(OwnerId::new("worker-1"), 0, 30_000).await.unwrap();

    let req = rp_core::human_loop::HumanLoopRequest::new(
        rp_core::ids::QuestionId::from("q1"),
        run_id.clone(),
        None,
        "pick".into(),
        json!({}),
        0,
    );
    callbacks.insert_human_loop_request(req).await.unwrap();

    let counts = reconcile_human_loop_timeouts(&callbacks, &bus, &queue, &metrics, 10_000_000, 60_000, 10).await;
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.expired, 1);
    assert_eq!(counts.failed_runs, 1);

    let row = queue.find_by_run_id(&run_id).await.unwrap().unwrap();
    assert_eq!(row.status, rp_core::run::RunStatus::Failed);
}
// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for route-handler tests: an in-process [`AppState`]
//! wired to fakes instead of real HTTP sidecars, plus `oneshot` request
//! helpers in the style of a scenario test driving the bare router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;

use rp_adapters::FakeProviderAdapter;
use rp_bus::InMemoryEventBus;
use rp_core::ids::OwnerId;
use rp_core::ports::executor::{CallTrace, DockerClient, ExecutorClient, ExecutorResult, RestorePlan, SyncRequest, WorkspaceSyncClient};
use rp_core::{ReconcileMetrics, RunPlaneConfig};
use rp_engine::{CallbackIngestor, OrchestratorPort, RunOrchestrator, WorkerLifecycleManager};
use rp_filegate::FileGateway;
use rp_storage::{InMemoryAuditLog, InMemoryCallbackStore, InMemoryFileBrowser, InMemoryQueueStore, InMemoryRbacPort, InMemoryWorkerStore};

use crate::state::AppState;

#[derive(Default)]
pub struct FakeDocker;

#[async_trait]
impl DockerClient for FakeDocker {
    async fn create_worker(&self, session_id: &str, _trace: &CallTrace) -> ExecutorResult<String> {
        Ok(format!("ctr-{session_id}"))
    }
    async fn start(&self, _container_id: &str, _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn stop(&self, _container_id: &str, _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn remove(&self, _container_id: &str, _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn exists(&self, _container_id: &str, _trace: &CallTrace) -> ExecutorResult<bool> {
        Ok(true)
    }
}

#[derive(Default)]
pub struct FakeSync {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl WorkspaceSyncClient for FakeSync {
    async fn sync_workspace(&self, req: SyncRequest<'_>) -> ExecutorResult<()> {
        self.calls.lock().push(req.container_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeExecutor;

#[async_trait]
impl ExecutorClient for FakeExecutor {
    async fn restore_workspace(&self, _container_id: &str, _plan: &RestorePlan, _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn link_agent_data(&self, _container_id: &str, _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn validate_workspace(&self, _container_id: &str, _required_paths: &[String], _trace: &CallTrace) -> ExecutorResult<()> {
        Ok(())
    }
    async fn execute_workspace_command(&self, _container_id: &str, _command: &str, _trace: &CallTrace) -> ExecutorResult<String> {
        Ok(String::new())
    }
}

/// RBAC grants a test wants seeded before building state, keyed by user id.
#[derive(Default)]
pub struct Grants {
    pub read: Vec<(&'static str, &'static str)>,
    pub write: Vec<(&'static str, &'static str)>,
}

pub fn make_state() -> Arc<AppState> {
    make_state_with_grants(Grants::default())
}

pub fn make_state_with_grants(grants: Grants) -> Arc<AppState> {
    let config = RunPlaneConfig::default();
    let owner = OwnerId::new("test-owner");

    let queue: Arc<dyn rp_core::ports::queue::QueueStore> = Arc::new(InMemoryQueueStore::new());
    let bus: Arc<dyn rp_core::ports::bus::EventBus> = Arc::new(InMemoryEventBus::new(config.bus_buffer_capacity, config.subscriber_high_water_mark));
    let callbacks: Arc<dyn rp_core::ports::callback::CallbackStore> = Arc::new(InMemoryCallbackStore::new());
    let workers: Arc<dyn rp_core::ports::worker_store::WorkerStore> = Arc::new(InMemoryWorkerStore::new());

    let provider = Arc::new(FakeProviderAdapter::new().with_human_loop());
    let orchestrator =
        Arc::new(RunOrchestrator::new(owner.clone(), Arc::clone(&queue), Arc::clone(&bus), Arc::clone(&callbacks), provider, config.lease_ms, config.retry_delay_ms));
    let orchestrator_port: Arc<dyn OrchestratorPort> = Arc::clone(&orchestrator) as Arc<dyn OrchestratorPort>;
    let ingestor = Arc::new(CallbackIngestor::new(Arc::clone(&bus), Arc::clone(&queue), Arc::clone(&callbacks), orchestrator_port, config.retry_delay_ms));

    let docker = Arc::new(FakeDocker);
    let sync = Arc::new(FakeSync::default());
    let executor = Arc::new(FakeExecutor);
    let lifecycle = Arc::new(WorkerLifecycleManager::new(Arc::clone(&workers), docker, sync, executor, "executor-1"));

    let rbac = Arc::new(InMemoryRbacPort::new());
    for (user, prefix) in grants.read {
        rbac.grant_read(user, prefix);
    }
    for (user, prefix) in grants.write {
        rbac.grant_write(user, prefix);
    }
    let audit = Arc::new(InMemoryAuditLog::new());
    let backend = Arc::new(InMemoryFileBrowser::new());
    let gateway = Arc::new(FileGateway::new(rbac, backend, audit));

    Arc::new(AppState {
        config,
        queue,
        bus,
        callbacks,
        workers,
        orchestrator,
        ingestor,
        lifecycle,
        gateway,
        metrics: Arc::new(ReconcileMetrics::default()),
    })
}

pub async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.expect("body collect failed").to_bytes();
    (status, body)
}

pub fn parse_json(b: Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("build request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("build request")
}

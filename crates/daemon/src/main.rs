// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! runplane-daemon entry point. Thin: wires tracing, builds shared state,
//! attaches middleware, starts the HTTP server. All route handlers live in
//! `rp_daemon::routes`; all shared state lives in `rp_daemon::state`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::Method;
use rp_adapters::{FakeProviderAdapter, HttpDockerClient, HttpExecutorClient};
use rp_core::ids::OwnerId;
use rp_core::{ReconcileMetrics, RunPlaneConfig};
use rp_daemon::state::AppState;
use rp_daemon::routes;
use rp_engine::{CallbackIngestor, OrchestratorPort, RunOrchestrator, WorkerLifecycleManager};
use rp_filegate::FileGateway;
use rp_storage::{InMemoryAuditLog, InMemoryCallbackStore, InMemoryQueueStore, InMemoryRbacPort, InMemoryWorkerStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = RunPlaneConfig::from_env();
    let state = Arc::new(build_state(config));

    let app = routes::build_router(Arc::clone(&state))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::new().allow_origin(tower_http::cors::Any).allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]));

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    info!("runplane-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await.context("server crashed")?;

    Ok(())
}

/// Wires every in-memory store, the single `FakeProviderAdapter`-backed
/// orchestrator, and the HTTP-backed executor/docker clients against a
/// sidecar configured by `RUNPLANE_EXECUTOR_URL`/`RUNPLANE_DOCKER_URL`.
/// Real provider wire protocols are out of scope; this is the only
/// `ProviderAdapter` the daemon ever constructs.
fn build_state(config: RunPlaneConfig) -> AppState {
    let owner = OwnerId::new(format!("daemon-{}", nanoid::nanoid!(8)));

    let queue: Arc<dyn rp_core::ports::queue::QueueStore> = Arc::new(InMemoryQueueStore::new());
    let bus: Arc<dyn rp_core::ports::bus::EventBus> = Arc::new(rp_bus::InMemoryEventBus::new(config.bus_buffer_capacity, config.subscriber_high_water_mark));
    let callbacks: Arc<dyn rp_core::ports::callback::CallbackStore> = Arc::new(InMemoryCallbackStore::new());
    let workers: Arc<dyn rp_core::ports::worker_store::WorkerStore> = Arc::new(InMemoryWorkerStore::new());

    let provider = Arc::new(FakeProviderAdapter::new().with_human_loop());
    let orchestrator =
        Arc::new(RunOrchestrator::new(owner.clone(), Arc::clone(&queue), Arc::clone(&bus), Arc::clone(&callbacks), provider, config.lease_ms, config.retry_delay_ms));
    let orchestrator_port: Arc<dyn OrchestratorPort> = Arc::clone(&orchestrator);
    let ingestor = Arc::new(CallbackIngestor::new(Arc::clone(&bus), Arc::clone(&queue), Arc::clone(&callbacks), orchestrator_port, config.retry_delay_ms));

    let docker_url = std::env::var("RUNPLANE_DOCKER_URL").unwrap_or_else(|_| "http://localhost:9001".to_string());
    let executor_url = std::env::var("RUNPLANE_EXECUTOR_URL").unwrap_or_else(|_| "http://localhost:9002".to_string());
    let auth_token = std::env::var("RUNPLANE_EXECUTOR_TOKEN").ok();
    let docker = Arc::new(HttpDockerClient::new(docker_url, auth_token.clone()));
    let executor = Arc::new(HttpExecutorClient::new(executor_url, auth_token));
    let lifecycle =
        Arc::new(WorkerLifecycleManager::new(Arc::clone(&workers), docker, Arc::clone(&executor) as _, executor as _, owner.as_str().to_string()));

    // RBAC seed data is out of scope; the gateway denies everything until an
    // operator grants access through `InMemoryRbacPort`.
    let rbac = Arc::new(InMemoryRbacPort::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let backend = Arc::new(rp_storage::InMemoryFileBrowser::new());
    let gateway = Arc::new(FileGateway::new(rbac, backend, audit));

    AppState {
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
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("RUNPLANE_DAEMON_ADDR").ok()?.parse().ok()
}

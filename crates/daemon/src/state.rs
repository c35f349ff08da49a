// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state handed to every Axum handler via `State<Arc<AppState>>`.

use std::sync::Arc;

use rp_core::ports::bus::EventBus;
use rp_core::ports::callback::CallbackStore;
use rp_core::ports::queue::QueueStore;
use rp_core::ports::worker_store::WorkerStore;
use rp_core::{ReconcileMetrics, RunPlaneConfig};
use rp_engine::{CallbackIngestor, RunOrchestrator, WorkerLifecycleManager};
use rp_filegate::FileGateway;

/// Cloneable (via `Arc`) handle shared across all route handlers.
pub struct AppState {
    pub config: RunPlaneConfig,
    pub queue: Arc<dyn QueueStore>,
    pub bus: Arc<dyn EventBus>,
    pub callbacks: Arc<dyn CallbackStore>,
    pub workers: Arc<dyn WorkerStore>,
    pub orchestrator: Arc<RunOrchestrator>,
    pub ingestor: Arc<CallbackIngestor>,
    pub lifecycle: Arc<WorkerLifecycleManager>,
    pub gateway: Arc<FileGateway>,
    pub metrics: Arc<ReconcileMetrics>,
}

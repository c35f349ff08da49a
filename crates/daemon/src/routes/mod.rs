// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Axum router: one entry point, `build_router`, wiring every handler
//! group to the routes named in spec.md §6. Middleware (tracing, CORS) is
//! attached by `main.rs`, not here, so scenario tests can drive the bare
//! router directly.

mod callbacks;
mod files;
mod human_loop;
mod reconcile;
mod runs;
mod session_workers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/runs/start", post(runs::start_run))
        .route("/runs/:run_id/stream", get(runs::stream_run))
        .route("/runs/:run_id/stop", post(runs::stop_run))
        .route("/runs/:run_id/bind", post(runs::bind_run))
        .route("/runs/:run_id/todos", get(runs::get_todos))
        .route("/runs/:run_id/todos/events", get(runs::stream_todos))
        .route("/runs/:run_id/callbacks", post(callbacks::post_callback))
        .route("/human-loop/pending", get(human_loop::pending))
        .route("/human-loop/reply", post(human_loop::reply))
        .route("/reconcile/runs", post(reconcile::reconcile_runs))
        .route("/reconcile/sync", post(reconcile::reconcile_sync))
        .route("/reconcile/human-loop-timeout", post(reconcile::reconcile_human_loop_timeout))
        .route("/reconcile/metrics", get(reconcile::metrics))
        .route("/reconcile/metrics/prometheus", get(reconcile::metrics_prometheus))
        .route("/session-workers/:session_id/activate", post(session_workers::activate))
        .route("/session-workers/cleanup/idle", post(session_workers::cleanup_idle))
        .route("/session-workers/cleanup/stopped", post(session_workers::cleanup_stopped))
        .route("/files/tree", get(files::tree))
        .route("/files/download", get(files::download))
        .route("/files/file", get(files::read_file).put(files::write_file).delete(files::delete_file))
        .route("/files/upload", post(files::upload))
        .route("/files/rename", post(files::rename))
        .route("/files/mkdir", post(files::mkdir))
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

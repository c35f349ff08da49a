// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler sweeps: stale claims, stale syncs, human-loop timeouts —
//! spec.md §4.F. Each is a free function over the ports it needs, bounded
//! by `limit`, and does not spawn its own task; a scheduler or an HTTP
//! `POST /reconcile/*` handler drives the cadence.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use rp_core::event::RunEventKind;
use rp_core::ids::RunId;
use rp_core::metrics::ReconcileMetrics;
use rp_core::ports::bus::EventBus;
use rp_core::ports::callback::CallbackStore;
use rp_core::ports::queue::QueueStore;
use rp_core::worker::SyncReason;
use rp_core::RunStatusDetail;

use crate::lifecycle::WorkerLifecycleManager;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaleClaimCounts {
    pub retried: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaleSyncCounts {
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HumanLoopTimeoutCounts {
    pub pending: u64,
    pub expired: u64,
    pub failed_runs: u64,
}

/// Reclaims queue rows whose claim lease expired without the holding
/// worker finishing the run — spec.md §4.F "Stale claims".
pub async fn reconcile_stale_claims(
    queue: &Arc<dyn QueueStore>,
    metrics: &ReconcileMetrics,
    now: u64,
    retry_delay_ms: u64,
    limit: usize,
) -> StaleClaimCounts {
    let mut counts = StaleClaimCounts::default();

    let stale = match queue.find_stale_claims(now, limit).await {
        Ok(rows) => rows,
        Err(_) => return counts,
    };

    for row in stale {
        let outcome = queue.mark_retry_or_failed(&row.run_id, now, retry_delay_ms, "reconciler_stale_claim_timeout".into()).await;
        match outcome {
            Ok(outcome) if outcome.status.is_terminal() => {
                counts.failed += 1;
                metrics.stale_claims_failed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {
                counts.retried += 1;
                metrics.stale_claims_retried.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                counts.failed += 1;
                metrics.stale_claims_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    counts
}

/// Re-syncs session workspaces that have gone too long without a
/// successful sync attempt — spec.md §4.F "Stale syncs".
pub async fn reconcile_stale_syncs(
    lifecycle: &WorkerLifecycleManager,
    metrics: &ReconcileMetrics,
    now: u64,
    stale_after_ms: u64,
    limit: usize,
) -> StaleSyncCounts {
    let mut counts = StaleSyncCounts::default();

    let candidates = match lifecycle.worker_store().list_stale_sync(now, stale_after_ms).await {
        Ok(rows) => rows,
        Err(_) => return counts,
    };

    for worker in candidates.into_iter().take(limit) {
        match lifecycle.container_exists(&worker, now).await {
            Ok(false) => {
                counts.skipped += 1;
                metrics.syncs_skipped.fetch_add(1, Ordering::Relaxed);
            }
            Ok(true) => match lifecycle.sync_session_workspace(&worker.session_id, SyncReason::Reconciler, now, None).await {
                Ok(()) => {
                    counts.succeeded += 1;
                    metrics.syncs_succeeded.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    counts.failed += 1;
                    metrics.syncs_failed.fetch_add(1, Ordering::Relaxed);
                }
            },
            Err(_) => {
                counts.failed += 1;
                metrics.syncs_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    counts
}

/// Expires human-loop questions left pending past `timeout_ms`, failing
/// their run and publishing a terminal event — spec.md §4.F "Human-loop
/// timeouts".
pub async fn reconcile_human_loop_timeouts(
    callbacks: &Arc<dyn CallbackStore>,
    bus: &Arc<dyn EventBus>,
    queue: &Arc<dyn QueueStore>,
    metrics: &ReconcileMetrics,
    now: u64,
    timeout_ms: u64,
    limit: usize,
) -> HumanLoopTimeoutCounts {
    let mut counts = HumanLoopTimeoutCounts::default();

    let stale = match callbacks.find_stale_human_loop(now, timeout_ms, limit).await {
        Ok(rows) => rows,
        Err(_) => return counts,
    };
    counts.pending = stale.len() as u64;

    for req in stale {
        if callbacks.expire_human_loop(&req.question_id, now).await.is_err() {
            continue;
        }
        counts.expired += 1;
        metrics.human_loop_expired.fetch_add(1, Ordering::Relaxed);

        let _ = bus
            .publish(
                &req.run_id,
                RunEventKind::RunStatus { status: RunStatusDetail::Failed, detail: Some("human-loop request timed out".into()) },
                now,
            )
            .await;
        let _ = bus.close(&req.run_id, now).await;

        force_fail(queue, &req.run_id, now, "human-loop request timed out".into()).await;
        counts.failed_runs += 1;
        metrics.human_loop_failed_runs.fetch_add(1, Ordering::Relaxed);
    }

    counts
}

/// Drives a queue row straight to `Failed` regardless of `attempts`,
/// mirroring the orchestrator's non-retryable-failure path.
async fn force_fail(queue: &Arc<dyn QueueStore>, run_id: &RunId, now: u64, message: String) {
    for _ in 0..64 {
        match queue.mark_retry_or_failed(run_id, now, 0, message.clone()).await {
            Ok(outcome) if outcome.status.is_terminal() => return,
            Ok(_) => continue,
            Err(_) => return,
        }
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

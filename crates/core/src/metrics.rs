// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler counters backing `GET /reconcile/metrics` and its Prometheus
//! exposition sibling (spec.md §6). Plain atomics rather than a metrics
//! crate, matching the ambient weight of a control-plane binary — this is
//! the only thing the Prometheus endpoint reads.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ReconcileMetrics {
    pub stale_claims_retried: AtomicU64,
    pub stale_claims_failed: AtomicU64,
    pub syncs_succeeded: AtomicU64,
    pub syncs_skipped: AtomicU64,
    pub syncs_failed: AtomicU64,
    pub human_loop_expired: AtomicU64,
    pub human_loop_failed_runs: AtomicU64,
}

impl ReconcileMetrics {
    pub fn snapshot(&self) -> ReconcileMetricsSnapshot {
        ReconcileMetricsSnapshot {
            stale_claims_retried: self.stale_claims_retried.load(Ordering::Relaxed),
            stale_claims_failed: self.stale_claims_failed.load(Ordering::Relaxed),
            syncs_succeeded: self.syncs_succeeded.load(Ordering::Relaxed),
            syncs_skipped: self.syncs_skipped.load(Ordering::Relaxed),
            syncs_failed: self.syncs_failed.load(Ordering::Relaxed),
            human_loop_expired: self.human_loop_expired.load(Ordering::Relaxed),
            human_loop_failed_runs: self.human_loop_failed_runs.load(Ordering::Relaxed),
        }
    }

    /// Render as Prometheus text exposition format.
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        format!(
            "# TYPE runplane_reconcile_stale_claims_retried_total counter\n\
runplane_reconcile_stale_claims_retried_total {}\n\
# TYPE runplane_reconcile_stale_claims_failed_total counter\n\
runplane_reconcile_stale_claims_failed_total {}\n\
# TYPE runplane_reconcile_syncs_succeeded_total counter\n\
runplane_reconcile_syncs_succeeded_total {}\n\
# TYPE runplane_reconcile_syncs_skipped_total counter\n\
runplane_reconcile_syncs_skipped_total {}\n\
# TYPE runplane_reconcile_syncs_failed_total counter\n\
runplane_reconcile_syncs_failed_total {}\n\
# TYPE runplane_reconcile_human_loop_expired_total counter\n\
runplane_reconcile_human_loop_expired_total {}\n\
# TYPE runplane_reconcile_human_loop_failed_runs_total counter\n\
runplane_reconcile_human_loop_failed_runs_total {}\n",
            s.stale_claims_retried,
            s.stale_claims_failed,
            s.syncs_succeeded,
            s.syncs_skipped,
            s.syncs_failed,
            s.human_loop_expired,
            s.human_loop_failed_runs,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileMetricsSnapshot {
    pub stale_claims_retried: u64,
    pub stale_claims_failed: u64,
    pub syncs_succeeded: u64,
    pub syncs_skipped: u64,
    pub syncs_failed: u64,
    pub human_loop_expired: u64,
    pub human_loop_failed_runs: u64,
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn snapshot_starts_at_zero() {
    let m = ReconcileMetrics::default();
    assert_eq!(m.snapshot(), ReconcileMetricsSnapshot::default());
}

#[test]
fn prometheus_output_contains_all_counter_names() {
    let m = ReconcileMetrics::default();
    m.stale_claims_retried.fetch_add(3, Ordering::Relaxed);
    let text = m.to_prometheus();
    assert!(text.contains("runplane_reconcile_stale_claims_retried_total 3"));
    assert!(text.contains("runplane_reconcile_human_loop_failed_runs_total 0"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepted_reply_serializes_without_optional_fields() {
    let value = serde_json::to_value(HumanLoopReplyResponse::accepted()).unwrap();
    assert_eq!(value, serde_json::json!({"ok": true}));
}

#[test]
fn duplicate_reply_serializes_status_and_duplicate_flag() {
    let value = serde_json::to_value(HumanLoopReplyResponse::duplicate("resolved")).unwrap();
    assert_eq!(value, serde_json::json!({"ok": true, "status": "resolved", "duplicate": true}));
}

#[test]
fn reconcile_runs_response_uses_camel_case_fields() {
    let value = serde_json::to_value(ReconcileRunsResponse { total: 3, retried: 2, failed: 1 }).unwrap();
    assert_eq!(value, serde_json::json!({"total": 3, "retried": 2, "failed": 1}));
}

#[test]
fn reconcile_human_loop_response_uses_camel_case_failed_runs() {
    let value = serde_json::to_value(ReconcileHumanLoopResponse { pending: 2, expired: 1, failed_runs: 1 }).unwrap();
    assert_eq!(value["failedRuns"], serde_json::json!(1));
}
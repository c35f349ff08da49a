// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::FileAction;

#[tokio::test]
async fn deny_by_default_for_unknown_user() {
    let rbac = InMemoryRbacPort::new();
    assert!(!rbac.can_read_path("alice", "/workspace/a.txt").await);
    assert!(!rbac.can_write_path("alice", "/workspace/a.txt").await);
}

#[tokio::test]
async fn read_grant_does_not_imply_write() {
    let rbac = InMemoryRbacPort::new();
    rbac.grant_read("alice", "/workspace/");
    assert!(rbac.can_read_path("alice", "/workspace/a.txt").await);
    assert!(!rbac.can_write_path("alice", "/workspace/a.txt").await);
}

#[tokio::test]
async fn grant_is_scoped_to_prefix() {
    let rbac = InMemoryRbacPort::new();
    rbac.grant_write("alice", "/workspace/scratch/");
    assert!(rbac.can_write_path("alice", "/workspace/scratch/out.txt").await);
    assert!(!rbac.can_write_path("alice", "/workspace/secrets/out.txt").await);
}

#[tokio::test]
async fn audit_log_preserves_order() {
    let audit = InMemoryAuditLog::new();
    audit
        .record(AuditRecord { user_id: "alice".into(), action: FileAction::Read, path: "/a".into(), allowed: true, reason: None, ts: 1 })
        .await;
    audit
        .record(AuditRecord { user_id: "alice".into(), action: FileAction::Write, path: "/b".into(), allowed: false, reason: Some("denied".into()), ts: 2 })
        .await;

    let records = audit.records();
    assert_eq!(records.len(), 2);
    assert!(records[0].allowed);
    assert!(!records[1].allowed);
}
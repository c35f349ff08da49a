// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::ports::rbac::GatewayError;
use rp_storage::memory_fs::InMemoryFileBrowser;
use rp_storage::rbac_store::{InMemoryAuditLog, InMemoryRbacPort};
use std::sync::Arc;

fn new_gateway() -> (FileGateway, Arc<InMemoryRbacPort>, Arc<InMemoryAuditLog>, Arc<InMemoryFileBrowser>) {
    let rbac = Arc::new(InMemoryRbacPort::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let backend = Arc::new(InMemoryFileBrowser::new());
    let gateway = FileGateway::new(rbac.clone(), backend.clone(), audit.clone());
    (gateway, rbac, audit, backend)
}

#[tokio::test]
async fn write_without_a_grant_is_forbidden_and_never_reaches_the_backend() {
    let (gateway, _rbac, audit, backend) = new_gateway();

    let err = gateway.write_file("u-alice", "/workspace/private/deny.txt", b"x".to_vec(), 0).await.unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);

    assert!(backend.download("/workspace/private/deny.txt").await.is_err());
    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].allowed);
}

#[tokio::test]
async fn write_with_a_grant_succeeds_and_is_audited() {
    let (gateway, rbac, audit, _backend) = new_gateway();
    rbac.grant_write("u-alice", "/workspace/public");

    gateway.write_file("u-alice", "/workspace/public/notes.md", b"hello".to_vec(), 0).await.unwrap();

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].allowed);
    assert_eq!(records[0].action, FileAction::Write);

    let read = gateway.read_file("u-alice", "/workspace/public/notes.md", 0, 100, 1).await;
    assert!(read.is_err(), "u-alice has no read grant, only write");
}

#[tokio::test]
async fn rename_requires_write_on_both_source_and_target() {
    let (gateway, rbac, audit, backend) = new_gateway();
    rbac.grant_write("u-alice", "/workspace/public");
    backend.write_file("/workspace/public/a.md", b"x".to_vec()).await.unwrap();

    // Target outside the granted prefix: denied, single combined audit record.
    let err = gateway.rename("u-alice", "/workspace/public/a.md", "/workspace/private/a.md", 0).await.unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden(_)));

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].allowed);
    assert_eq!(records[0].path, "/workspace/public/a.md -> /workspace/private/a.md");

    // Both sides granted: succeeds.
    gateway.rename("u-alice", "/workspace/public/a.md", "/workspace/public/b.md", 1).await.unwrap();
    assert!(backend.download("/workspace/public/b.md").await.is_ok());
}

#[tokio::test]
async fn list_and_download_require_read_not_write() {
    let (gateway, rbac, _audit, backend) = new_gateway();
    backend.mkdir("/workspace/public").await.unwrap();
    rbac.grant_read("u-bob", "/workspace/public");

    let entries = gateway.list_tree("u-bob", "/workspace/public", 0).await.unwrap();
    assert!(entries.is_empty());

    let err = gateway.write_file("u-bob", "/workspace/public/x.md", b"x".to_vec(), 0).await.unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden(_)));
}

#[tokio::test]
async fn error_taxonomy_maps_to_expected_http_status_codes() {
    assert_eq!(GatewayError::InvalidPath("p".into()).status_code(), 400);
    assert_eq!(GatewayError::NotDirectory("p".into()).status_code(), 400);
    assert_eq!(GatewayError::Forbidden("p".into()).status_code(), 403);
    assert_eq!(GatewayError::NotFound("p".into()).status_code(), 404);
    assert_eq!(GatewayError::AlreadyExists("p".into()).status_code(), 409);
    assert_eq!(GatewayError::IsDirectory("p".into()).status_code(), 409);
    assert_eq!(GatewayError::Backend("p".into()).status_code(), 500);
}

#[tokio::test]
async fn delete_and_mkdir_are_gated_by_write_access() {
    let (gateway, rbac, audit, backend) = new_gateway();
    rbac.grant_write("u-alice", "/workspace/public");
    backend.write_file("/workspace/public/a.md", b"x".to_vec()).await.unwrap();

    gateway.delete_path("u-alice", "/workspace/public/a.md", 0).await.unwrap();
    assert!(backend.download("/workspace/public/a.md").await.is_err());

    gateway.mkdir("u-alice", "/workspace/public/sub", 1).await.unwrap();

    let err = gateway.mkdir("u-alice", "/workspace/private/sub", 2).await.unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden(_)));

    assert_eq!(audit.records().len(), 4);
}
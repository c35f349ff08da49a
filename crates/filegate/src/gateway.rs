// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File gateway: RBAC-then-audit wrapper around a [`FileBrowser`] backend —
//! spec.md §4.G.

use std::sync::Arc;

use rp_core::ports::rbac::{AuditLog, DirEntry, FileBrowser, GatewayError, GatewayResult, ReadResult, RbacPort};
use rp_core::{AuditRecord, FileAction};

/// Boundary component sitting in front of a [`FileBrowser`]: every
/// operation is RBAC-checked and audited before it reaches the backend.
/// Denied attempts never touch `backend`.
pub struct FileGateway {
    rbac: Arc<dyn RbacPort>,
    backend: Arc<dyn FileBrowser>,
    audit: Arc<dyn AuditLog>,
}

impl FileGateway {
    pub fn new(rbac: Arc<dyn RbacPort>, backend: Arc<dyn FileBrowser>, audit: Arc<dyn AuditLog>) -> Self {
        Self { rbac, backend, audit }
    }

    async fn audit_and_gate_read(&self, user_id: &str, action: FileAction, path: &str, now: u64) -> GatewayResult<()> {
        let allowed = self.rbac.can_read_path(user_id, path).await;
        self.audit
            .record(AuditRecord {
                user_id: user_id.to_string(),
                action,
                path: path.to_string(),
                allowed,
                reason: (!allowed).then(|| "read denied by rbac policy".to_string()),
                ts: now,
            })
            .await;
        if allowed {
            Ok(())
        } else {
            tracing::warn!(user_id, path, "read denied by rbac policy");
            Err(GatewayError::Forbidden(path.to_string()))
        }
    }

    async fn audit_and_gate_write(&self, user_id: &str, action: FileAction, path: &str, now: u64) -> GatewayResult<()> {
        let allowed = self.rbac.can_write_path(user_id, path).await;
        self.audit
            .record(AuditRecord {
                user_id: user_id.to_string(),
                action,
                path: path.to_string(),
                allowed,
                reason: (!allowed).then(|| "write denied by rbac policy".to_string()),
                ts: now,
            })
            .await;
        if allowed {
            Ok(())
        } else {
            tracing::warn!(user_id, path, "write denied by rbac policy");
            Err(GatewayError::Forbidden(path.to_string()))
        }
    }

    pub async fn list_tree(&self, user_id: &str, path: &str, now: u64) -> GatewayResult<Vec<DirEntry>> {
        self.audit_and_gate_read(user_id, FileAction::List, path, now).await?;
        self.backend.list_tree(path).await
    }

    pub async fn download(&self, user_id: &str, path: &str, now: u64) -> GatewayResult<Vec<u8>> {
        self.audit_and_gate_read(user_id, FileAction::Read, path, now).await?;
        self.backend.download(path).await
    }

    pub async fn read_file(&self, user_id: &str, path: &str, offset: u64, limit: u64, now: u64) -> GatewayResult<ReadResult> {
        self.audit_and_gate_read(user_id, FileAction::Read, path, now).await?;
        self.backend.read_file(path, offset, limit).await
    }

    pub async fn write_file(&self, user_id: &str, path: &str, content: Vec<u8>, now: u64) -> GatewayResult<()> {
        self.audit_and_gate_write(user_id, FileAction::Write, path, now).await?;
        self.backend.write_file(path, content).await
    }

    /// Requires write access on both `from` and `to`; a single combined
    /// audit record is written for the pair (spec.md §9 open question).
    pub async fn rename(&self, user_id: &str, from: &str, to: &str, now: u64) -> GatewayResult<()> {
        let from_allowed = self.rbac.can_write_path(user_id, from).await;
        let to_allowed = from_allowed && self.rbac.can_write_path(user_id, to).await;
        let allowed = from_allowed && to_allowed;

        self.audit
            .record(AuditRecord {
                user_id: user_id.to_string(),
                action: FileAction::Rename,
                path: format!("{from} -> {to}"),
                allowed,
                reason: (!allowed).then(|| "write denied by rbac policy".to_string()),
                ts: now,
            })
            .await;

        if !allowed {
            let denied_path = if from_allowed { to } else { from };
            tracing::warn!(user_id, from, to, "rename denied by rbac policy");
            return Err(GatewayError::Forbidden(denied_path.to_string()));
        }
        self.backend.rename(from, to).await
    }

    pub async fn delete_path(&self, user_id: &str, path: &str, now: u64) -> GatewayResult<()> {
        self.audit_and_gate_write(user_id, FileAction::Delete, path, now).await?;
        self.backend.delete_path(path).await
    }

    pub async fn mkdir(&self, user_id: &str, path: &str, now: u64) -> GatewayResult<()> {
        self.audit_and_gate_write(user_id, FileAction::Mkdir, path, now).await?;
        self.backend.mkdir(path).await
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;

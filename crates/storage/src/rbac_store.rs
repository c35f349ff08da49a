// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementations of [`rp_core::ports::rbac::AuditLog`]
//! and [`rp_core::ports::rbac::RbacPort`].
//!
//! Seeding real ACL data is out of scope (spec.md §1); this grants access
//! by an explicit per-user allow-list of path prefixes, which is enough to
//! exercise the gateway's deny-by-default behavior in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::rbac::{AuditLog, RbacPort};
use rp_core::AuditRecord;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, record: AuditRecord) {
        self.records.lock().push(record);
    }
}

#[derive(Debug, Clone, Default)]
struct UserGrants {
    read_prefixes: Vec<String>,
    write_prefixes: Vec<String>,
}

/// Allow-list RBAC policy: a path is permitted iff it starts with one of
/// the user's granted prefixes. Write access never implies read access or
/// vice versa.
#[derive(Default)]
pub struct InMemoryRbacPort {
    grants: Mutex<HashMap<String, UserGrants>>,
}

impl InMemoryRbacPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_read(&self, user_id: impl Into<String>, path_prefix: impl Into<String>) {
        self.grants.lock().entry(user_id.into()).or_default().read_prefixes.push(path_prefix.into());
    }

    pub fn grant_write(&self, user_id: impl Into<String>, path_prefix: impl Into<String>) {
        self.grants.lock().entry(user_id.into()).or_default().write_prefixes.push(path_prefix.into());
    }
}

#[async_trait]
impl RbacPort for InMemoryRbacPort {
    async fn can_read_path(&self, user_id: &str, path: &str) -> bool {
        self.grants
            .lock()
            .get(user_id)
            .is_some_and(|g| g.read_prefixes.iter().any(|p| path.starts_with(p.as_str())))
    }

    async fn can_write_path(&self, user_id: &str, path: &str) -> bool {
        self.grants
            .lock()
            .get(user_id)
            .is_some_and(|g| g.write_prefixes.iter().any(|p| path.starts_with(p.as_str())))
    }
}

#[cfg(test)]
#[path = "rbac_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File gateway audit record, named in spec.md §4.G without a struct
//! shape; defined here as the type persisted by the audit log store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Read,
    Write,
    Rename,
    Delete,
    Mkdir,
    List,
}

crate::simple_display! {
    FileAction {
        Read => "read",
        Write => "write",
        Rename => "rename",
        Delete => "delete",
        Mkdir => "mkdir",
        List => "list",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub user_id: String,
    pub action: FileAction,
    pub path: String,
    pub allowed: bool,
    pub reason: Option<String>,
    pub ts: u64,
}

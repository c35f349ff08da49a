// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RBAC policy port, file-browser port, and audit-log port for the file
//! gateway — spec.md §4.G.

use crate::audit::AuditRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RBAC policy check port. Seed ACL data is out of scope (spec.md §1);
/// this is the decision interface the gateway consults.
#[async_trait]
pub trait RbacPort: Send + Sync {
    async fn can_read_path(&self, user_id: &str, path: &str) -> bool;
    async fn can_write_path(&self, user_id: &str, path: &str) -> bool;
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("not a directory: {0}")]
    NotDirectory(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("is a directory: {0}")]
    IsDirectory(String),
    #[error("permission denied: {0}")]
    Forbidden(String),
    #[error("backend failure: {0}")]
    Backend(String),
}

/// HTTP status this error maps to, per spec.md §4.G's taxonomy.
impl GatewayError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPath(_) | Self::NotDirectory(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::AlreadyExists(_) | Self::IsDirectory(_) => 409,
            Self::Backend(_) => 500,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    pub path: String,
    pub is_dir: bool,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResult {
    pub content: Vec<u8>,
    pub next_offset: Option<u64>,
    pub truncated: bool,
}

/// Underlying file backend port, named `FileBrowser` in spec.md §4.G.
#[async_trait]
pub trait FileBrowser: Send + Sync {
    async fn list_tree(&self, path: &str) -> GatewayResult<Vec<DirEntry>>;
    async fn download(&self, path: &str) -> GatewayResult<Vec<u8>>;
    async fn read_file(&self, path: &str, offset: u64, limit: u64) -> GatewayResult<ReadResult>;
    async fn write_file(&self, path: &str, content: Vec<u8>) -> GatewayResult<()>;
    async fn rename(&self, from: &str, to: &str) -> GatewayResult<()>;
    async fn delete_path(&self, path: &str) -> GatewayResult<()>;
    async fn mkdir(&self, path: &str) -> GatewayResult<()>;
}

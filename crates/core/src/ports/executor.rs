// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound ports for the container lifecycle: `DockerClient`,
//! `WorkspaceSyncClient`, `ExecutorClient` — spec.md §6.

use crate::ids::TraceId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("timed out after {0}ms")]
    Timeout(u64),
    #[error("{0}")]
    Transport(String),
    #[error("workspace validation failed: missing paths {0:?}")]
    MissingPaths(Vec<String>),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Correlation metadata attached to every outbound call, per spec.md §4.E
/// "Tracing".
#[derive(Debug, Clone)]
pub struct CallTrace {
    pub trace_id: TraceId,
    pub session_id: String,
    pub executor_id: String,
    pub operation: &'static str,
    pub ts: u64,
    pub run_id: Option<String>,
}

/// Container lifecycle operations against the backing container runtime.
#[async_trait]
pub trait DockerClient: Send + Sync {
    async fn create_worker(&self, session_id: &str, trace: &CallTrace) -> ExecutorResult<String>;
    async fn start(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()>;
    async fn stop(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()>;
    async fn remove(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()>;
    async fn exists(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<bool>;
}

pub struct SyncRequest<'a> {
    pub session_id: &'a str,
    pub container_id: &'a str,
    pub workspace_s3_prefix: &'a str,
    pub include: &'a [&'a str],
    pub exclude: &'a [&'a str],
    pub reason: crate::worker::SyncReason,
    pub trace: CallTrace,
}

/// Workspace data sync between a session worker's filesystem and
/// persistent storage — spec.md §4.E `syncSessionWorkspace`.
#[async_trait]
pub trait WorkspaceSyncClient: Send + Sync {
    async fn sync_workspace(&self, req: SyncRequest<'_>) -> ExecutorResult<()>;
}

/// Manifest describing how to restore a workspace on activation.
#[derive(Debug, Clone, Default)]
pub struct RestorePlan {
    pub manifest: serde_json::Value,
}

/// In-container operations used by `activateSession`'s restore sequence
/// (`restoreWorkspace -> linkAgentData -> validateWorkspace`) and by the
/// agent's own workspace command execution.
#[async_trait]
pub trait ExecutorClient: Send + Sync {
    async fn restore_workspace(&self, container_id: &str, plan: &RestorePlan, trace: &CallTrace) -> ExecutorResult<()>;
    async fn link_agent_data(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()>;
    async fn validate_workspace(
        &self,
        container_id: &str,
        required_paths: &[String],
        trace: &CallTrace,
    ) -> ExecutorResult<()>;
    async fn execute_workspace_command(
        &self,
        container_id: &str,
        command: &str,
        trace: &CallTrace,
    ) -> ExecutorResult<String>;
}

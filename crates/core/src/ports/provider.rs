// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider adapter port — spec.md §6 "Outbound ports" `ProviderAdapter`.
//!
//! Mirrors the teacher's `AgentAdapter` trait shape (config in, event
//! stream out, explicit error enum) but narrowed to the chunk kinds the
//! orchestrator maps in spec.md §4.C.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("provider does not support human-loop")]
    HumanLoopUnsupported,
    #[error("run already finished")]
    AlreadyFinished,
    #[error("provider error: {0}")]
    Other(String),
}

/// A single capability a provider adapter may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    HumanLoop,
}

/// Terminal status a provider reports on `run.finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishedStatus {
    Succeeded,
    Failed,
    Canceled,
}

/// A chunk yielded by a provider's asynchronous run stream.
#[derive(Debug, Clone)]
pub enum ProviderChunk {
    MessageDelta { text: String },
    TodoUpdate { payload: Value },
    HumanLoopRequested { question_id: String, prompt: String, metadata: Value },
    Finished { status: FinishedStatus, usage: Option<(u64, u64)> },
}

/// A running provider invocation: its chunk stream plus control handles.
pub struct ProviderHandle {
    pub chunks: mpsc::Receiver<ProviderChunk>,
}

/// Outbound port to whichever provider adapter a run targets.
///
/// Adapters are contractually required to honor cancellation promptly
/// (spec.md §5): once `stop` is invoked, the chunk stream must end.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn capabilities(&self) -> HashSet<Capability>;

    /// Start a run. `input` is the caller's opaque payload from
    /// `RunQueueItem::payload`.
    async fn run(&self, input: Value) -> Result<ProviderHandle, ProviderError>;

    /// Cooperatively cancel a running invocation. Idempotent.
    async fn stop(&self, run_id: &str);

    /// Resume a run paused on a human-loop question. Returns `Ok(true)`
    /// if the adapter accepted the reply and will resume producing
    /// chunks, `Ok(false)` if it rejected it (surfaced as 409 by the
    /// caller without mutating state).
    async fn reply_human_loop(
        &self,
        run_id: &str,
        question_id: &str,
        answer: Value,
    ) -> Result<bool, ProviderError>;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable `ProviderAdapter` used by orchestrator tests and by the
//! `ProviderKind::Fake` target in non-production deployments.
//!
//! Each run is driven by a script of [`FakeStep`]s registered up front
//! via [`FakeProviderAdapter::script`]; `run()` looks the script up by
//! the `run_id` field the caller is expected to carry in its payload.

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::provider::{Capability, FinishedStatus, ProviderAdapter, ProviderChunk, ProviderError, ProviderHandle};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone)]
pub enum FakeStep {
    MessageDelta(String),
    TodoUpdate(Value),
    HumanLoopRequested { question_id: String, prompt: String, metadata: Value },
    Finished { status: FinishedStatus, usage: Option<(u64, u64)> },
}

#[derive(Default)]
pub struct FakeProviderAdapter {
    capabilities: Mutex<HashSet<Capability>>,
    scripts: Mutex<HashMap<String, Vec<FakeStep>>>,
    canceled: Arc<Mutex<HashSet<String>>>,
    waiting: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
}

impl FakeProviderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_human_loop(self) -> Self {
        self.capabilities.lock().insert(Capability::HumanLoop);
        self
    }

    pub fn script(&self, run_id: impl Into<String>, steps: Vec<FakeStep>) {
        self.scripts.lock().insert(run_id.into(), steps);
    }

    fn run_id_of(input: &Value) -> Result<String, ProviderError> {
        input
            .get("run_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::SpawnFailed("payload missing run_id".into()))
    }
}

#[async_trait]
impl ProviderAdapter for FakeProviderAdapter {
    fn capabilities(&self) -> HashSet<Capability> {
        self.capabilities.lock().clone()
    }

    async fn run(&self, input: Value) -> Result<ProviderHandle, ProviderError> {
        let run_id = Self::run_id_of(&input)?;
        let steps = self
            .scripts
            .lock()
            .remove(&run_id)
            .ok_or_else(|| ProviderError::SpawnFailed(format!("no script registered for {run_id}")))?;

        let (tx, rx) = mpsc::channel(steps.len().max(1));
        let canceled = Arc::clone(&self.canceled);
        let waiting = Arc::clone(&self.waiting);

        tokio::spawn(async move {
            for step in steps {
                if canceled.lock().contains(&run_id) {
                    return;
                }
                let chunk = match step {
                    FakeStep::MessageDelta(text) => ProviderChunk::MessageDelta { text },
                    FakeStep::TodoUpdate(payload) => ProviderChunk::TodoUpdate { payload },
                    FakeStep::HumanLoopRequested { question_id, prompt, metadata } => {
                        let (answer_tx, answer_rx) = oneshot::channel();
                        waiting.lock().insert(run_id.clone(), answer_tx);
                        if tx
                            .send(ProviderChunk::HumanLoopRequested { question_id, prompt, metadata })
                            .await
                            .is_err()
                        {
                            return;
                        }
                        if answer_rx.await.is_err() {
                            return; // stop() dropped the sender; treat as cancellation
                        }
                        continue;
                    }
                    FakeStep::Finished { status, usage } => ProviderChunk::Finished { status, usage },
                };
                if tx.send(chunk).await.is_err() {
                    return;
                }
            }
        });

        Ok(ProviderHandle { chunks: rx })
    }

    async fn stop(&self, run_id: &str) {
        self.canceled.lock().insert(run_id.to_string());
        self.waiting.lock().remove(run_id); // dropping the sender unblocks a paused task
    }

    async fn reply_human_loop(&self, run_id: &str, _question_id: &str, answer: Value) -> Result<bool, ProviderError> {
        match self.waiting.lock().remove(run_id) {
            Some(tx) => Ok(tx.send(answer).is_ok()),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "fake_provider_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run orchestrator: binds a claimed run to a provider adapter, shapes its
//! chunk stream into ordered bus events, and honors stop/reply — spec.md
//! §4.C.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::event::RunEventKind;
use rp_core::human_loop::HumanLoopRequest;
use rp_core::ids::{OwnerId, QuestionId, RunId, SessionId};
use rp_core::ports::bus::{EventBus, EventSubscription};
use rp_core::ports::callback::CallbackStore;
use rp_core::ports::provider::{Capability, FinishedStatus, ProviderAdapter, ProviderChunk, ProviderError};
use rp_core::ports::queue::QueueStore;
use rp_core::run::ProviderKind;
use rp_core::{RunStatusDetail, RunUsage};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Queue(#[from] rp_core::ports::queue::QueueError),
    #[error(transparent)]
    Bus(#[from] rp_core::ports::bus::BusError),
    #[error(transparent)]
    Callback(#[from] rp_core::ports::callback::CallbackError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Parameters for `POST /runs/start`, per spec.md §6.
pub struct StartRunRequest {
    pub run_id: Option<RunId>,
    pub session_id: Option<SessionId>,
    pub provider: ProviderKind,
    pub max_attempts: u32,
    pub payload: Value,
    pub require_human_loop: bool,
}

pub struct StartedRun {
    pub run_id: RunId,
    pub subscription: EventSubscription,
}

/// Narrow interface the callback ingestor consumes, breaking the
/// orchestrator/ingestor cycle per SPEC_FULL.md §9.
#[async_trait]
pub trait OrchestratorPort: Send + Sync {
    async fn stop(&self, run_id: &RunId, now: u64) -> OrchestratorResult<()>;

    /// Resume a run paused on a human-loop question. `Ok(false)` means the
    /// adapter rejected the reply; the caller must not mutate any state.
    async fn reply_human_loop(&self, run_id: &RunId, question_id: &str, answer: Value) -> OrchestratorResult<bool>;
}

/// Binds claimed runs to a single [`ProviderAdapter`] and shapes its chunk
/// stream into the per-run event log.
pub struct RunOrchestrator {
    owner: OwnerId,
    queue: Arc<dyn QueueStore>,
    bus: Arc<dyn EventBus>,
    callbacks: Arc<dyn CallbackStore>,
    provider: Arc<dyn ProviderAdapter>,
    lease_ms: u64,
    retry_delay_ms: u64,
    cancellations: Mutex<HashMap<String, CancellationToken>>,
}

impl RunOrchestrator {
    pub fn new(
        owner: OwnerId,
        queue: Arc<dyn QueueStore>,
        bus: Arc<dyn EventBus>,
        callbacks: Arc<dyn CallbackStore>,
        provider: Arc<dyn ProviderAdapter>,
        lease_ms: u64,
        retry_delay_ms: u64,
    ) -> Self {
        Self { owner, queue, bus, callbacks, provider, lease_ms, retry_delay_ms, cancellations: Mutex::new(HashMap::new()) }
    }

    pub async fn start_run(&self, req: StartRunRequest, now: u64) -> OrchestratorResult<StartedRun> {
        let run_id = req.run_id.unwrap_or_else(RunId::generate);

        self.queue
            .enqueue(run_id.clone(), req.session_id.clone(), req.provider, req.max_attempts, req.payload, now)
            .await?;
        let claimed = self.queue.claim_next(self.owner.clone(), now, self.lease_ms).await?;

        let subscription = self.bus.subscribe(&run_id, 0).await?;

        let Some(item) = claimed else {
            // Another worker beat us to the claim (or the store is
            // genuinely empty, which cannot happen right after enqueue);
            // the caller still gets a valid subscriber, just no driver.
            return Ok(StartedRun { run_id, subscription });
        };

        if req.require_human_loop && !self.provider.capabilities().contains(&Capability::HumanLoop) {
            self.bus
                .publish(
                    &run_id,
                    RunEventKind::RunStatus {
                        status: RunStatusDetail::Blocked,
                        detail: Some("provider does not support human-loop".into()),
                    },
                    now,
                )
                .await?;
            self.bus.close(&run_id, now).await?;
            self.force_fail(&run_id, now, "provider does not support human-loop".into()).await?;
            return Ok(StartedRun { run_id, subscription });
        }

        let token = CancellationToken::new();
        self.cancellations.lock().insert(run_id.0.clone(), token.clone());

        let bus = Arc::clone(&self.bus);
        let queue = Arc::clone(&self.queue);
        let callbacks = Arc::clone(&self.callbacks);
        let provider = Arc::clone(&self.provider);
        let retry_delay_ms = self.retry_delay_ms;
        let drive_run_id = run_id.clone();
        let payload = item.payload.clone();

        tokio::spawn(async move {
            drive_run(drive_run_id, payload, bus, queue, callbacks, provider, token, retry_delay_ms, now).await;
        });

        Ok(StartedRun { run_id, subscription })
    }

    /// Drive a force-fail for a run whose retry policy should not apply
    /// (spec.md §4.C human-loop capability mismatch). The queue port has
    /// no direct "fail regardless of attempts" operation, so this steps
    /// `markRetryOrFailed` forward until the row reaches `Failed`.
    async fn force_fail(&self, run_id: &RunId, now: u64, error_message: String) -> OrchestratorResult<()> {
        for _ in 0..64 {
            let outcome = self.queue.mark_retry_or_failed(run_id, now, 0, error_message.clone()).await?;
            if outcome.status.is_terminal() {
                return Ok(());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrchestratorPort for RunOrchestrator {
    async fn stop(&self, run_id: &RunId, now: u64) -> OrchestratorResult<()> {
        if let Some(token) = self.cancellations.lock().remove(&run_id.0) {
            token.cancel();
        }
        self.provider.stop(run_id.as_str()).await;
        self.bus
            .publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Canceled, detail: None }, now)
            .await?;
        self.bus.close(run_id, now).await?;
        self.queue.mark_canceled(run_id, now, None).await?;
        Ok(())
    }

    async fn reply_human_loop(&self, run_id: &RunId, question_id: &str, answer: Value) -> OrchestratorResult<bool> {
        Ok(self.provider.reply_human_loop(run_id.as_str(), question_id, answer).await?)
    }
}

#[allow(clippy::too_many_arguments)]
async fn drive_run(
    run_id: RunId,
    payload: Value,
    bus: Arc<dyn EventBus>,
    queue: Arc<dyn QueueStore>,
    callbacks: Arc<dyn CallbackStore>,
    provider: Arc<dyn ProviderAdapter>,
    token: CancellationToken,
    retry_delay_ms: u64,
    started_at: u64,
) {
    let mut handle = match provider.run(payload).await {
        Ok(handle) => handle,
        Err(e) => {
            publish_failure(&run_id, &bus, &queue, retry_delay_ms, started_at, &e.to_string()).await;
            return;
        }
    };

    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => break,
            chunk = handle.chunks.recv() => chunk,
        };

        let Some(chunk) = chunk else { break };

        match chunk {
            ProviderChunk::MessageDelta { text } => {
                let _ = bus.publish(&run_id, RunEventKind::MessageDelta { text }, started_at).await;
            }
            ProviderChunk::TodoUpdate { payload } => {
                let _ = bus.publish(&run_id, RunEventKind::TodoUpdate { payload }, started_at).await;
            }
            ProviderChunk::HumanLoopRequested { question_id, prompt, metadata } => {
                let req = HumanLoopRequest::new(
                    QuestionId::from(question_id.as_str()),
                    run_id.clone(),
                    None,
                    prompt,
                    metadata,
                    started_at,
                );
                if callbacks.insert_human_loop_request(req).await.is_ok() {
                    let _ = bus
                        .publish(
                            &run_id,
                            RunEventKind::RunStatus { status: RunStatusDetail::WaitingHuman, detail: None },
                            started_at,
                        )
                        .await;
                }
            }
            ProviderChunk::Finished { status, usage } => {
                if let Some((input_tokens, output_tokens)) = usage {
                    let _ = callbacks.finalize_usage(&run_id, RunUsage { input_tokens, output_tokens }).await;
                }
                let detail = match status {
                    FinishedStatus::Succeeded => RunStatusDetail::Succeeded,
                    FinishedStatus::Failed => RunStatusDetail::Failed,
                    FinishedStatus::Canceled => RunStatusDetail::Canceled,
                };
                let _ = bus
                    .publish(
                        &run_id,
                        RunEventKind::RunStatus { status: RunStatusDetail::Finished, detail: Some(detail.to_string()) },
                        started_at,
                    )
                    .await;
                let _ = bus.close(&run_id, started_at).await;

                match status {
                    FinishedStatus::Succeeded => {
                        let _ = queue.mark_succeeded(&run_id, started_at).await;
                    }
                    FinishedStatus::Canceled => {
                        let _ = queue.mark_canceled(&run_id, started_at, None).await;
                    }
                    FinishedStatus::Failed => {
                        let _ = queue
                            .mark_retry_or_failed(&run_id, started_at, retry_delay_ms, format!("run finished: {detail}"))
                            .await;
                    }
                }
                return;
            }
        }
    }
}

async fn publish_failure(
    run_id: &RunId,
    bus: &Arc<dyn EventBus>,
    queue: &Arc<dyn QueueStore>,
    retry_delay_ms: u64,
    ts: u64,
    message: &str,
) {
    let _ = bus.publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Error, detail: Some(message.into()) }, ts).await;
    let _ = bus.close(run_id, ts).await;
    let _ = queue.mark_retry_or_failed(run_id, ts, retry_delay_ms, message.to_string()).await;
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

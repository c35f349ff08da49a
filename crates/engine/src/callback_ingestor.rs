// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent sink for provider/worker-driven HTTP callbacks, maintaining
//! human-loop state and finalize-once usage — spec.md §4.D.

use std::sync::Arc;

use rp_core::event::RunEventKind;
use rp_core::human_loop::{HumanLoopRequest, HumanLoopResponse};
use rp_core::ids::{EventId, QuestionId, RunId};
use rp_core::ports::bus::EventBus;
use rp_core::ports::callback::{CallbackError, CallbackStore, Dedup};
use rp_core::ports::queue::QueueStore;
use rp_core::{RunStatusDetail, RunUsage};
use serde_json::Value;
use thiserror::Error;

use crate::orchestrator::OrchestratorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishedRunStatus {
    Succeeded,
    Failed,
    Canceled,
}

/// Discriminated-union body of `POST /runs/{runId}/callbacks`, spec.md §4.D.
#[derive(Debug, Clone)]
pub enum CallbackEvent {
    MessageStop { event_id: EventId },
    TodoUpdate { event_id: EventId, payload: Value },
    HumanLoopRequested { event_id: EventId, question_id: String, prompt: String, metadata: Value },
    HumanLoopResolved { event_id: EventId, question_id: String, answer: Value },
    RunFinished { event_id: EventId, status: FinishedRunStatus, usage: Option<RunUsage>, error_message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub action: &'static str,
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Accepted,
    Duplicate { status: &'static str },
    Rejected,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("question {0} not found")]
    QuestionNotFound(String),
    #[error(transparent)]
    Callback(#[from] CallbackError),
    #[error(transparent)]
    Bus(#[from] rp_core::ports::bus::BusError),
    #[error(transparent)]
    Queue(#[from] rp_core::ports::queue::QueueError),
    #[error(transparent)]
    Orchestrator(#[from] crate::orchestrator::OrchestratorError),
}

pub type IngestResult<T> = Result<T, IngestError>;

pub struct CallbackIngestor {
    bus: Arc<dyn EventBus>,
    queue: Arc<dyn QueueStore>,
    callbacks: Arc<dyn CallbackStore>,
    orchestrator: Arc<dyn OrchestratorPort>,
    retry_delay_ms: u64,
}

impl CallbackIngestor {
    pub fn new(
        bus: Arc<dyn EventBus>,
        queue: Arc<dyn QueueStore>,
        callbacks: Arc<dyn CallbackStore>,
        orchestrator: Arc<dyn OrchestratorPort>,
        retry_delay_ms: u64,
    ) -> Self {
        Self { bus, queue, callbacks, orchestrator, retry_delay_ms }
    }

    pub async fn bind_run(&self, run_id: &RunId, session_id: &str) -> IngestResult<()> {
        self.callbacks.bind_run(run_id, session_id).await?;
        Ok(())
    }

    pub async fn ingest(&self, run_id: &RunId, event: CallbackEvent, now: u64) -> IngestResult<IngestOutcome> {
        let event_id = match &event {
            CallbackEvent::MessageStop { event_id }
            | CallbackEvent::TodoUpdate { event_id, .. }
            | CallbackEvent::HumanLoopRequested { event_id, .. }
            | CallbackEvent::HumanLoopResolved { event_id, .. }
            | CallbackEvent::RunFinished { event_id, .. } => event_id.clone(),
        };

        if self.callbacks.observe_event(run_id, &event_id).await? == Dedup::Duplicate {
            return Ok(IngestOutcome { action: "duplicate_ignored", duplicate: true });
        }

        match event {
            CallbackEvent::MessageStop { .. } => {
                let _ = self
                    .bus
                    .publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Running, detail: None }, now)
                    .await;
                Ok(IngestOutcome { action: "message_stop_synced", duplicate: false })
            }
            CallbackEvent::TodoUpdate { payload, .. } => {
                let _ = self.bus.publish(run_id, RunEventKind::TodoUpdate { payload }, now).await;
                Ok(IngestOutcome { action: "todo_updated", duplicate: false })
            }
            CallbackEvent::HumanLoopRequested { question_id, prompt, metadata, .. } => {
                let req = HumanLoopRequest::new(QuestionId::from(question_id.as_str()), run_id.clone(), None, prompt, metadata, now);
                self.callbacks.insert_human_loop_request(req).await?;
                let _ = self
                    .bus
                    .publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::WaitingHuman, detail: None }, now)
                    .await;
                Ok(IngestOutcome { action: "human_loop_requested", duplicate: false })
            }
            CallbackEvent::HumanLoopResolved { question_id, answer, .. } => {
                let qid = QuestionId::from(question_id.as_str());
                let response = HumanLoopResponse { question_id: qid.clone(), answer, answered_at: now };
                self.callbacks.resolve_human_loop(&qid, response, now).await?;
                let _ = self
                    .bus
                    .publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Running, detail: None }, now)
                    .await;
                Ok(IngestOutcome { action: "human_loop_resolved", duplicate: false })
            }
            CallbackEvent::RunFinished { status, usage, error_message, .. } => {
                if let Some(usage) = usage {
                    let _ = self.callbacks.finalize_usage(run_id, usage).await;
                }
                let detail = match status {
                    FinishedRunStatus::Succeeded => RunStatusDetail::Succeeded,
                    FinishedRunStatus::Failed => RunStatusDetail::Failed,
                    FinishedRunStatus::Canceled => RunStatusDetail::Canceled,
                };
                let _ = self
                    .bus
                    .publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Finished, detail: Some(detail.to_string()) }, now)
                    .await;
                let _ = self.bus.close(run_id, now).await;

                match status {
                    FinishedRunStatus::Succeeded => {
                        self.queue.mark_succeeded(run_id, now).await?;
                    }
                    FinishedRunStatus::Canceled => {
                        self.queue.mark_canceled(run_id, now, error_message).await?;
                    }
                    FinishedRunStatus::Failed => {
                        self.queue
                            .mark_retry_or_failed(run_id, now, self.retry_delay_ms, error_message.unwrap_or_default())
                            .await?;
                    }
                }
                Ok(IngestOutcome { action: "run_finished", duplicate: false })
            }
        }
    }

    /// `POST /human-loop/reply`, spec.md §4.D.
    pub async fn reply_human_loop(&self, run_id: &RunId, question_id: &str, answer: Value, now: u64) -> IngestResult<ReplyOutcome> {
        let qid = QuestionId::from(question_id);
        let req = self
            .callbacks
            .find_human_loop_request(&qid)
            .await?
            .ok_or_else(|| IngestError::QuestionNotFound(question_id.to_string()))?;

        if req.run_id != *run_id {
            return Err(IngestError::QuestionNotFound(question_id.to_string()));
        }

        if req.status.is_terminal() {
            let status = match req.status {
                rp_core::human_loop::HumanLoopStatus::Resolved => "resolved",
                rp_core::human_loop::HumanLoopStatus::Expired => "expired",
                rp_core::human_loop::HumanLoopStatus::Pending => unreachable!("is_terminal() excludes Pending"),
            };
            return Ok(ReplyOutcome::Duplicate { status });
        }

        if !self.orchestrator.reply_human_loop(run_id, question_id, answer.clone()).await? {
            return Ok(ReplyOutcome::Rejected);
        }

        let response = HumanLoopResponse { question_id: qid.clone(), answer, answered_at: now };
        self.callbacks.resolve_human_loop(&qid, response, now).await?;
        let _ = self.bus.publish(run_id, RunEventKind::RunStatus { status: RunStatusDetail::Running, detail: None }, now).await;

        Ok(ReplyOutcome::Accepted)
    }
}

#[cfg(test)]
#[path = "callback_ingestor_tests.rs"]
mod tests;

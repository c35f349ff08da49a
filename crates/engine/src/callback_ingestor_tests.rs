// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_bus::InMemoryEventBus;
use rp_core::ids::OwnerId;
use rp_core::run::ProviderKind;
use rp_storage::callback_store::InMemoryCallbackStore;
use rp_storage::queue_store::InMemoryQueueStore;
use serde_json::json;

struct NeverOrchestrator;

#[async_trait::async_trait]
impl OrchestratorPort for NeverOrchestrator {
    async fn stop(&self, _run_id: &RunId, _now: u64) -> crate::orchestrator::OrchestratorResult<()> {
        Ok(())
    }

    async fn reply_human_loop(&self, _run_id: &RunId, _question_id: &str, _answer: Value) -> crate::orchestrator::OrchestratorResult<bool> {
        Ok(true)
    }
}

struct RejectingOrchestrator;

#[async_trait::async_trait]
impl OrchestratorPort for RejectingOrchestrator {
    async fn stop(&self, _run_id: &RunId, _now: u64) -> crate::orchestrator::OrchestratorResult<()> {
        Ok(())
    }

    async fn reply_human_loop(&self, _run_id: &RunId, _question_id: &str, _answer: Value) -> crate::orchestrator::OrchestratorResult<bool> {
        Ok(false)
    }
}

async fn seed_run(queue: &InMemoryQueueStore, run_id: &RunId) {
    queue
        .enqueue(run_id.clone(), None, ProviderKind::Fake, 3, json!({}), 0)
        .await
        .unwrap();
    queue.claim_next(OwnerId::new("worker-1"), 0, 30_000).await.unwrap();
}

fn new_ingestor(
    orchestrator: Arc<dyn OrchestratorPort>,
) -> (CallbackIngestor, Arc<InMemoryQueueStore>, Arc<InMemoryCallbackStore>, Arc<InMemoryEventBus>) {
    let queue = Arc::new(InMemoryQueueStore::new());
    let bus = Arc::new(InMemoryEventBus::new(100, 100));
    let callbacks = Arc::new(InMemoryCallbackStore::new());
    let ingestor = CallbackIngestor::new(bus.clone(), queue.clone(), callbacks.clone(), orchestrator, 1_000);
    (ingestor, queue, callbacks, bus)
}

#[tokio::test]
async fn duplicate_event_id_is_ignored_on_replay() {
    let (ingestor, queue, _, _) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-1");
    seed_run(&queue, &run_id).await;

    let event = CallbackEvent::MessageStop { event_id: EventId::new("evt-1") };
    let first = ingestor.ingest(&run_id, event.clone(), 10).await.unwrap();
    assert!(!first.duplicate);

    let second = ingestor.ingest(&run_id, event, 20).await.unwrap();
    assert!(second.duplicate);
}

#[tokio::test]
async fn run_finished_succeeded_marks_queue_row_and_finalizes_usage_once() {
    let (ingestor, queue, callbacks, bus) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-2");
    seed_run(&queue, &run_id).await;
    let mut sub = bus.subscribe(&run_id, 0).await.unwrap();

    let event = CallbackEvent::RunFinished {
        event_id: EventId::new("evt-fin"),
        status: FinishedRunStatus::Succeeded,
        usage: Some(RunUsage { input_tokens: 10, output_tokens: 20 }),
        error_message: None,
    };
    ingestor.ingest(&run_id, event, 30).await.unwrap();

    let row = queue.find_by_run_id(&run_id).await.unwrap().unwrap();
    assert_eq!(row.status, rp_core::run::RunStatus::Succeeded);

    let usage = callbacks.usage_for_run(&run_id).await.unwrap().unwrap();
    assert_eq!(usage.input_tokens, 10);

    let finished = sub.rx.recv().await.unwrap();
    assert!(matches!(
        finished.kind,
        RunEventKind::RunStatus { status: RunStatusDetail::Finished, detail: Some(ref d) } if d == "succeeded"
    ));
}

#[tokio::test]
async fn run_finished_failed_requeues_under_max_attempts() {
    let (ingestor, queue, _, _) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-3");
    seed_run(&queue, &run_id).await;

    let event = CallbackEvent::RunFinished {
        event_id: EventId::new("evt-fail"),
        status: FinishedRunStatus::Failed,
        usage: None,
        error_message: Some("boom".into()),
    };
    ingestor.ingest(&run_id, event, 30).await.unwrap();

    let row = queue.find_by_run_id(&run_id).await.unwrap().unwrap();
    assert_eq!(row.status, rp_core::run::RunStatus::Queued);
    assert_eq!(row.attempts, 1);
}

#[tokio::test]
async fn human_loop_requested_then_resolved_round_trips() {
    let (ingestor, queue, callbacks, _) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-4");
    seed_run(&queue, &run_id).await;

    ingestor
        .ingest(
            &run_id,
            CallbackEvent::HumanLoopRequested {
                event_id: EventId::new("evt-ask"),
                question_id: "q1".into(),
                prompt: "pick one".into(),
                metadata: json!({}),
            },
            10,
        )
        .await
        .unwrap();

    let pending = callbacks.pending_human_loop(Some(&run_id), 10).await.unwrap();
    assert_eq!(pending.len(), 1);

    ingestor
        .ingest(
            &run_id,
            CallbackEvent::HumanLoopResolved { event_id: EventId::new("evt-ans"), question_id: "q1".into(), answer: json!("a") },
            20,
        )
        .await
        .unwrap();

    let pending_after = callbacks.pending_human_loop(Some(&run_id), 10).await.unwrap();
    assert!(pending_after.is_empty());
}

#[tokio::test]
async fn reply_to_unknown_question_is_an_error() {
    let (ingestor, queue, _, _) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-5");
    seed_run(&queue, &run_id).await;

    let err = ingestor.reply_human_loop(&run_id, "missing", json!("x"), 10).await.unwrap_err();
    assert!(matches!(err, IngestError::QuestionNotFound(_)));
}

#[tokio::test]
async fn reply_already_resolved_question_reports_duplicate() {
    let (ingestor, queue, _, _) = new_ingestor(Arc::new(NeverOrchestrator));
    let run_id = RunId::from("run-6");
    seed_run(&queue, &run_id).await;

    ingestor
        .ingest(
            &run_id,
            CallbackEvent::HumanLoopRequested {
                event_id: EventId::new("evt-ask"),
                question_id: "q1".into(),
                prompt: "pick".into(),
                metadata: json!({}),
            },
            10,
        )
        .await
        .unwrap();

    let first = ingestor.reply_human_loop(&run_id, "q1", json!("a"), 20).await.unwrap();
    assert_eq!(first, ReplyOutcome::Accepted);

    let second = ingestor.reply_human_loop(&run_id, "q1", json!("b"), 30).await.unwrap();
    assert_eq!(second, ReplyOutcome::Duplicate { status: "resolved" });
}

#[tokio::test]
async fn reply_rejected_by_orchestrator_does_not_resolve_the_question() {
    let (ingestor, queue, callbacks, _) = new_ingestor(Arc::new(RejectingOrchestrator));
    let run_id = RunId::from("run-7");
    seed_run(&queue, &run_id).await;

    ingestor
        .ingest(
            &run_id,
            CallbackEvent::HumanLoopRequested {
                event_id: EventId::new("evt-ask"),
                question_id: "q1".into(),
                prompt: "pick".into(),
                metadata: json!({}),
            },
            10,
        )
        .await
        .unwrap();

    let outcome = ingestor.reply_human_loop(&run_id, "q1", json!("a"), 20).await.unwrap();
    assert_eq!(outcome, ReplyOutcome::Rejected);

    let pending = callbacks.pending_human_loop(Some(&run_id), 10).await.unwrap();
    assert_eq!(pending.len(), 1);
}
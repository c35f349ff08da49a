// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_adapters::{FakeProviderAdapter, FakeStep};
use rp_bus::InMemoryEventBus;
use rp_core::run::RunStatus;
use rp_storage::callback_store::InMemoryCallbackStore;
use rp_storage::queue_store::InMemoryQueueStore;
use serde_json::json;
use tokio::time::{timeout, Duration};

fn new_orchestrator(provider: Arc<FakeProviderAdapter>) -> (RunOrchestrator, Arc<InMemoryQueueStore>) {
    let queue = Arc::new(InMemoryQueueStore::new());
    let bus = Arc::new(InMemoryEventBus::new(100, 100));
    let callbacks = Arc::new(InMemoryCallbackStore::new());
    let orchestrator = RunOrchestrator::new(OwnerId::new("worker-1"), queue.clone(), bus, callbacks, provider, 30_000, 1_000);
    (orchestrator, queue)
}

async fn drain_until_closed(sub: &mut EventSubscription) -> Vec<RunEventKind> {
    let mut kinds = Vec::new();
    loop {
        match timeout(Duration::from_secs(1), sub.rx.recv()).await {
            Ok(Some(event)) => {
                let closed = event.kind.is_closed();
                kinds.push(event.kind);
                if closed {
                    break;
                }
            }
            _ => break,
        }
    }
    kinds
}

#[tokio::test]
async fn start_run_drives_a_scripted_run_to_success() {
    let provider = Arc::new(FakeProviderAdapter::new());
    let (orchestrator, queue) = new_orchestrator(provider.clone());

    let req = StartRunRequest {
        run_id: Some(RunId::from("run-1")),
        session_id: None,
        provider: ProviderKind::Fake,
        max_attempts: 3,
        payload: json!({ "run_id": "run-1" }),
        require_human_loop: false,
    };
    provider.script(
        "run-1",
        vec![
            FakeStep::MessageDelta("hi".into()),
            FakeStep::Finished { status: FinishedStatus::Succeeded, usage: Some((5, 7)) },
        ],
    );

    let mut started = orchestrator.start_run(req, 1_000).await.unwrap();
    let kinds = drain_until_closed(&mut started.subscription).await;

    assert!(kinds.iter().any(|k| matches!(k, RunEventKind::MessageDelta { .. })));
    assert!(kinds.last().unwrap().is_closed());
    assert!(kinds.iter().any(|k| matches!(
        k,
        RunEventKind::RunStatus { status: RunStatusDetail::Finished, detail: Some(d) } if d == "succeeded"
    )));

    let row = queue.find_by_run_id(&started.run_id).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Succeeded);
}

#[tokio::test]
async fn human_loop_required_but_unsupported_fails_without_retry() {
    let provider = Arc::new(FakeProviderAdapter::new());
    let (orchestrator, queue) = new_orchestrator(provider);

    let req = StartRunRequest {
        run_id: Some(RunId::from("run-2")),
        session_id: None,
        provider: ProviderKind::Fake,
        max_attempts: 5,
        payload: json!({ "run_id": "run-2" }),
        require_human_loop: true,
    };

    let mut started = orchestrator.start_run(req, 1_000).await.unwrap();
    let kinds = drain_until_closed(&mut started.subscription).await;

    assert!(kinds.iter().any(|k| matches!(k, RunEventKind::RunStatus { status: RunStatusDetail::Blocked, .. })));

    let row = queue.find_by_run_id(&started.run_id).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Failed);
}

#[tokio::test]
async fn stop_cancels_a_paused_run() {
    let provider = Arc::new(FakeProviderAdapter::new().with_human_loop());
    let (orchestrator, queue) = new_orchestrator(provider.clone());

    provider.script(
        "run-3",
        vec![FakeStep::HumanLoopRequested { question_id: "q1".into(), prompt: "pick".into(), metadata: json!({}) }],
    );

    let req = StartRunRequest {
        run_id: Some(RunId::from("run-3")),
        session_id: None,
        provider: ProviderKind::Fake,
        max_attempts: 3,
        payload: json!({ "run_id": "run-3" }),
        require_human_loop: false,
    };
    let mut started = orchestrator.start_run(req, 1_000).await.unwrap();

    // let the run reach the paused human-loop state
    let _ = timeout(Duration::from_millis(200), started.subscription.rx.recv()).await;

    orchestrator.stop(&started.run_id, 2_000).await.unwrap();

    let row = queue.find_by_run_id(&started.run_id).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Canceled);
}

#[tokio::test]
async fn reply_human_loop_resumes_and_finishes_the_run() {
    let provider = Arc::new(FakeProviderAdapter::new().with_human_loop());
    let (orchestrator, queue) = new_orchestrator(provider.clone());

    provider.script(
        "run-4",
        vec![
            FakeStep::HumanLoopRequested { question_id: "q1".into(), prompt: "pick".into(), metadata: json!({}) },
            FakeStep::Finished { status: FinishedStatus::Succeeded, usage: None },
        ],
    );

    let req = StartRunRequest {
        run_id: Some(RunId::from("run-4")),
        session_id: None,
        provider: ProviderKind::Fake,
        max_attempts: 3,
        payload: json!({ "run_id": "run-4" }),
        require_human_loop: false,
    };
    let mut started = orchestrator.start_run(req, 1_000).await.unwrap();

    let _ = timeout(Duration::from_millis(200), started.subscription.rx.recv()).await;

    let accepted = orchestrator.reply_human_loop(&started.run_id, "q1", json!("answer")).await.unwrap();
    assert!(accepted);

    let kinds = drain_until_closed(&mut started.subscription).await;
    assert!(kinds.last().unwrap().is_closed());

    let row = queue.find_by_run_id(&started.run_id).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Succeeded);
}
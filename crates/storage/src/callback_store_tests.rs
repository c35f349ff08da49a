// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::QuestionId;
use serde_json::json;

fn run(n: &str) -> RunId {
    RunId::from(n.to_string())
}

#[tokio::test]
async fn observe_event_dedups_per_run() {
    let store = InMemoryCallbackStore::new();
    let event = EventId::new("evt-1");
    assert_eq!(store.observe_event(&run("run-a"), &event).await.unwrap(), Dedup::First);
    assert_eq!(store.observe_event(&run("run-a"), &event).await.unwrap(), Dedup::Duplicate);
    // same event id on a different run is a distinct delivery
    assert_eq!(store.observe_event(&run("run-b"), &event).await.unwrap(), Dedup::First);
}

#[tokio::test]
async fn bind_run_is_last_write_wins() {
    let store = InMemoryCallbackStore::new();
    store.bind_run(&run("run-a"), "session-1").await.unwrap();
    store.bind_run(&run("run-a"), "session-2").await.unwrap();
    assert_eq!(store.session_for_run(&run("run-a")).await.unwrap(), Some("session-2".into()));
}

#[tokio::test]
async fn resolve_human_loop_is_terminal_and_idempotent() {
    let store = InMemoryCallbackStore::new();
    let qid = QuestionId::new();
    let req = HumanLoopRequest::new(qid.clone(), run("run-a"), None, "pick one".into(), json!({}), 0);
    store.insert_human_loop_request(req).await.unwrap();

    store
        .resolve_human_loop(&qid, HumanLoopResponse { question_id: qid.clone(), answer: json!("a"), answered_at: 5 }, 5)
        .await
        .unwrap();
    let found = store.find_human_loop_request(&qid).await.unwrap().unwrap();
    assert_eq!(found.status, HumanLoopStatus::Resolved);
    assert_eq!(found.resolved_at, Some(5));

    // expiring an already-resolved request is a no-op
    store.expire_human_loop(&qid, 10).await.unwrap();
    let found = store.find_human_loop_request(&qid).await.unwrap().unwrap();
    assert_eq!(found.status, HumanLoopStatus::Resolved);
}

#[tokio::test]
async fn find_stale_human_loop_filters_by_timeout() {
    let store = InMemoryCallbackStore::new();
    let qid = QuestionId::new();
    let req = HumanLoopRequest::new(qid.clone(), run("run-a"), None, "pick one".into(), json!({}), 0);
    store.insert_human_loop_request(req).await.unwrap();

    assert!(store.find_stale_human_loop(500, 1_000, 10).await.unwrap().is_empty());
    let stale = store.find_stale_human_loop(1_000, 1_000, 10).await.unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].question_id, qid);
}

#[tokio::test]
async fn pending_human_loop_filters_by_run_and_status() {
    let store = InMemoryCallbackStore::new();
    let q1 = QuestionId::new();
    let q2 = QuestionId::new();
    store
        .insert_human_loop_request(HumanLoopRequest::new(q1.clone(), run("run-a"), None, "p".into(), json!({}), 0))
        .await
        .unwrap();
    store
        .insert_human_loop_request(HumanLoopRequest::new(q2.clone(), run("run-b"), None, "p".into(), json!({}), 0))
        .await
        .unwrap();
    store
        .resolve_human_loop(&q1, HumanLoopResponse { question_id: q1.clone(), answer: json!(1), answered_at: 1 }, 1)
        .await
        .unwrap();

    let all_pending = store.pending_human_loop(None, 10).await.unwrap();
    assert_eq!(all_pending.len(), 1);
    assert_eq!(all_pending[0].question_id, q2);

    let scoped = store.pending_human_loop(Some(&run("run-a")), 10).await.unwrap();
    assert!(scoped.is_empty());
}

#[tokio::test]
async fn finalize_usage_writes_once() {
    let store = InMemoryCallbackStore::new();
    let usage = RunUsage { input_tokens: 10, output_tokens: 20 };
    assert!(store.finalize_usage(&run("run-a"), usage).await.unwrap());
    assert!(!store.finalize_usage(&run("run-a"), RunUsage { input_tokens: 99, output_tokens: 99 }).await.unwrap());
    assert_eq!(store.usage_for_run(&run("run-a")).await.unwrap(), Some(usage));
}
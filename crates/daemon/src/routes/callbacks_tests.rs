// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::routes::build_router;
use crate::test_support::{call, json_request, make_state, parse_json};

#[tokio::test]
async fn duplicate_event_id_is_reported_as_duplicate() {
    let state = make_state();
    let router = build_router(state);
    let body = serde_json::json!({"kind": "message.stop", "eventId": "evt-1"});

    let (status1, body1) = call(router.clone(), json_request("POST", "/runs/run-cb-1/callbacks", body.clone())).await;
    assert_eq!(status1, axum::http::StatusCode::OK);
    let json1 = parse_json(body1);
    assert_eq!(json1["action"], "message_stop_synced");
    assert_eq!(json1["duplicate"], false);

    let (status2, body2) = call(router, json_request("POST", "/runs/run-cb-1/callbacks", body)).await;
    assert_eq!(status2, axum::http::StatusCode::OK);
    let json2 = parse_json(body2);
    assert_eq!(json2["action"], "duplicate_ignored");
    assert_eq!(json2["duplicate"], true);
}

#[tokio::test]
async fn todo_update_callback_is_recorded() {
    let state = make_state();
    let router = build_router(state);
    let body = serde_json::json!({"kind": "todo.update", "eventId": "evt-todo-1", "payload": {"items": []}});

    let (status, body) = call(router, json_request("POST", "/runs/run-cb-2/callbacks", body)).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(parse_json(body)["action"], "todo_updated");
}
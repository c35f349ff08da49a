// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::event::RunEventKind;
use rp_core::ids::RunId;

#[test]
fn encode_event_writes_event_id_and_data_lines() {
    let event = RunEvent {
        run_id: RunId::from("run-1"),
        seq: 7,
        kind: RunEventKind::RunWarning { message: "slow provider".into() },
        ts: 1_000,
        payload: serde_json::json!({}),
    };
    let chunk = encode_event(&event).unwrap();
    assert_eq!(chunk.0, "event: run.warning\nid: 7\ndata: {\"kind\":\"run.warning\",\"message\":\"slow provider\"}\n\n");
}

#[test]
fn encode_event_uses_run_closed_as_the_terminal_event_name() {
    let event = RunEvent { run_id: RunId::from("run-1"), seq: 9, kind: RunEventKind::RunClosed, ts: 0, payload: serde_json::json!({}) };
    let chunk = encode_event(&event).unwrap();
    assert!(chunk.0.starts_with("event: run.closed\n"));
    assert!(chunk.0.ends_with("\n\n"));
}

#[test]
fn heartbeat_chunk_is_a_bare_comment_line() {
    let chunk = heartbeat_chunk();
    assert!(chunk.0.starts_with(':'));
    assert!(chunk.0.ends_with("\n\n"));
}
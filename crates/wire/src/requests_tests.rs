// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn run_start_request_defaults_require_human_loop_to_true() {
    let body = r#"{"provider":"fake","model":"m1","messages":[]}"#;
    let req: RunStartRequest = serde_json::from_str(body).unwrap();
    assert!(req.require_human_loop);
    assert_eq!(req.run_id, None);
}

#[test]
fn run_start_request_honors_an_explicit_false() {
    let body = r#"{"provider":"claude","model":"m1","requireHumanLoop":false,"messages":[]}"#;
    let req: RunStartRequest = serde_json::from_str(body).unwrap();
    assert!(!req.require_human_loop);
}

#[parameterized(
    message_stop = { r#"{"kind":"message.stop","eventId":"e1"}"# },
    run_finished = { r#"{"kind":"run.finished","eventId":"e1","status":"succeeded"}"# },
    human_loop_requested = { r#"{"kind":"human_loop.requested","eventId":"e1","questionId":"q1","prompt":"pick"}"# },
)]
fn callback_request_round_trips_through_its_tag(body: &str) {
    let parsed: CallbackRequest = serde_json::from_str(body).unwrap();
    let reencoded = serde_json::to_string(&parsed).unwrap();
    let reparsed: CallbackRequest = serde_json::from_str(&reencoded).unwrap();
    assert_eq!(serde_json::to_value(&parsed).unwrap(), serde_json::to_value(&reparsed).unwrap());
}

#[test]
fn human_loop_requested_defaults_metadata_to_null_when_omitted() {
    let body = r#"{"kind":"human_loop.requested","eventId":"e1","questionId":"q1","prompt":"pick"}"#;
    let parsed: CallbackRequest = serde_json::from_str(body).unwrap();
    match parsed {
        CallbackRequest::HumanLoopRequested { metadata, .. } => assert!(metadata.is_null()),
        other => panic!("unexpected variant: {other:?}"),
    }
}
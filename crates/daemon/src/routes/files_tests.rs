// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use base64::Engine;
use crate::routes::build_router;
use crate::test_support::{call, get_request, json_request, make_state_with_grants, parse_json, Grants};

fn grants() -> Grants {
    Grants { read: vec![("u-alice", "/workspace")], write: vec![("u-alice", "/workspace")] }
}

#[tokio::test]
async fn write_then_read_round_trips_through_the_gateway() {
    let state = make_state_with_grants(grants());
    let router = build_router(state);

    for dir in ["/workspace", "/workspace/public"] {
        let body = serde_json::json!({"userId": "u-alice", "path": dir});
        let (status, _) = call(router.clone(), json_request("POST", "/files/mkdir", body)).await;
        assert_eq!(status, axum::http::StatusCode::OK);
    }

    let content = base64::engine::general_purpose::STANDARD.encode("hello world");
    let write_body = serde_json::json!({"userId": "u-alice", "path": "/workspace/public/notes.md", "contentBase64": content});

    let (status, _) = call(router.clone(), json_request("PUT", "/files/file", write_body)).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let (status, body) = call(router, get_request("/files/file?userId=u-alice&path=/workspace/public/notes.md")).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let json = parse_json(body);
    let decoded: Vec<u8> = serde_json::from_value(json["content"].clone()).expect("content is a byte array");
    assert_eq!(decoded, b"hello world");
}

#[tokio::test]
async fn write_outside_granted_prefix_is_forbidden() {
    let state = make_state_with_grants(grants());
    let router = build_router(state);
    let body = serde_json::json!({"userId": "u-alice", "path": "/other/deny.txt", "contentBase64": ""});
    let (status, _) = call(router, json_request("PUT", "/files/file", body)).await;
    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn mkdir_then_tree_lists_the_new_directory() {
    let state = make_state_with_grants(grants());
    let router = build_router(state);
    let root = serde_json::json!({"userId": "u-alice", "path": "/workspace"});
    let (status, _) = call(router.clone(), json_request("POST", "/files/mkdir", root)).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let body = serde_json::json!({"userId": "u-alice", "path": "/workspace/data"});
    let (status, _) = call(router.clone(), json_request("POST", "/files/mkdir", body)).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let (status, body) = call(router, get_request("/files/tree?userId=u-alice&path=/workspace")).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let entries = parse_json(body)["entries"].as_array().cloned().unwrap_or_default();
    assert!(entries.iter().any(|e| e["path"] == "/workspace/data" || e["path"] == "workspace/data"));
}
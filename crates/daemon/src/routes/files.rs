// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/files/*` — spec.md §4.G/§6. Every route requires `userId`; RBAC
//! denials are mapped to 403 through `GatewayError::Forbidden`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rp_core::clock::{Clock, SystemClock};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(rename = "userId")]
    user_id: String,
    path: String,
}

pub async fn tree(State(state): State<Arc<AppState>>, Query(query): Query<PathQuery>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    let entries = state.gateway.list_tree(&query.user_id, &query.path, now).await?;
    Ok(Json(serde_json::json!({"entries": entries})))
}

pub async fn download(State(state): State<Arc<AppState>>, Query(query): Query<PathQuery>) -> ApiResult<impl IntoResponse> {
    let now = SystemClock.epoch_ms();
    let bytes = state.gateway.download(&query.user_id, &query.path, now).await?;
    let filename = query.path.rsplit('/').next().unwrap_or("download").to_string();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReadFileQuery {
    #[serde(rename = "userId")]
    user_id: String,
    path: String,
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
}

pub async fn read_file(State(state): State<Arc<AppState>>, Query(query): Query<ReadFileQuery>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(u64::MAX);
    let result = state.gateway.read_file(&query.user_id, &query.path, offset, limit, now).await?;
    Ok(Json(serde_json::json!({
        "content": result.content,
        "nextOffset": result.next_offset,
        "truncated": result.truncated,
    })))
}

/// `PUT /files/file` takes the new content inline as base64, sidestepping
/// multipart form parsing for a daemon with no browser form client.
#[derive(Debug, Deserialize)]
pub struct WriteFileRequest {
    #[serde(rename = "userId")]
    user_id: String,
    path: String,
    #[serde(rename = "contentBase64")]
    content_base64: String,
}

pub async fn write_file(State(state): State<Arc<AppState>>, Json(body): Json<WriteFileRequest>) -> ApiResult<Json<serde_json::Value>> {
    use base64::Engine;
    let now = SystemClock.epoch_ms();
    let content = base64::engine::general_purpose::STANDARD
        .decode(body.content_base64)
        .map_err(|e| crate::error::ApiError::BadRequest(format!("invalid base64: {e}")))?;
    state.gateway.write_file(&body.user_id, &body.path, content, now).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn delete_file(State(state): State<Arc<AppState>>, Query(query): Query<PathQuery>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    state.gateway.delete_path(&query.user_id, &query.path, now).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// Treated as an inline JSON/base64 `PUT /files/file` rather than a literal
/// multipart upload, matching `write_file`'s wire shape.
pub async fn upload(State(state): State<Arc<AppState>>, Json(body): Json<WriteFileRequest>) -> ApiResult<Json<serde_json::Value>> {
    write_file(State(state), Json(body)).await
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(rename = "userId")]
    user_id: String,
    from: String,
    to: String,
}

pub async fn rename(State(state): State<Arc<AppState>>, Json(body): Json<RenameRequest>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    state.gateway.rename(&body.user_id, &body.from, &body.to, now).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    #[serde(rename = "userId")]
    user_id: String,
    path: String,
}

pub async fn mkdir(State(state): State<Arc<AppState>>, Json(body): Json<MkdirRequest>) -> ApiResult<Json<serde_json::Value>> {
    let now = SystemClock.epoch_ms();
    state.gateway.mkdir(&body.user_id, &body.path, now).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;

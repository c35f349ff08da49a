// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE wire framing for the run event stream, spec.md §6.
//!
//! A chunk is `event: <kind>\n`, an optional `id: <seq>\n`, then
//! `data: <json>\n\n`. A heartbeat is a bare `: <comment>\n\n` line with
//! no `event`/`data`.

use rp_core::event::RunEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SseError {
    #[error("failed to serialize event payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single framed SSE chunk, ready to write to the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseChunk(pub String);

/// Encodes one [`RunEvent`] as an SSE chunk. The event's `kind.as_str()`
/// is forwarded verbatim as the `event:` name, per spec.md §6.
pub fn encode_event(event: &RunEvent) -> Result<SseChunk, SseError> {
    let data = serde_json::to_string(&event.kind)?;
    let mut out = String::new();
    out.push_str("event: ");
    out.push_str(event.kind.as_str());
    out.push('\n');
    out.push_str("id: ");
    out.push_str(&event.seq.to_string());
    out.push('\n');
    out.push_str("data: ");
    out.push_str(&data);
    out.push_str("\n\n");
    Ok(SseChunk(out))
}

/// A comment/heartbeat chunk: carries no event, keeps the connection
/// alive through idle proxies.
pub fn heartbeat_chunk() -> SseChunk {
    SseChunk(": heartbeat\n\n".to_string())
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;

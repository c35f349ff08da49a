// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP request/response DTOs and SSE event framing for the control
//! plane's external interface — spec.md §6.
//!
//! Deep request validation lives at the HTTP boundary, not here: these
//! types carry `serde` derives only, and the daemon's handlers delegate
//! straight to the core operations after deserializing a body.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod requests;
pub mod responses;
pub mod sse;

pub use requests::{
    ActivateSessionRequest, BindRunRequest, CallbackRequest, FinishedStatusWire, HumanLoopReplyRequest, ReconcileHumanLoopRequest,
    ReconcileRunsRequest, ReconcileSyncRequest, RunStartRequest, UsageWire,
};
pub use responses::{
    ActivateSessionResponse, HumanLoopReplyResponse, ReconcileHumanLoopResponse, ReconcileRunsResponse, ReconcileSyncResponse,
};
pub use sse::{encode_event, heartbeat_chunk, SseChunk, SseError};

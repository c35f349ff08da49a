// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run event bus port — spec.md §4.B.

use crate::event::RunEvent;
use crate::ids::RunId;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("run {0} has no open bus")]
    NoSuchRun(RunId),
    #[error("subscriber lagged past the buffer high-water mark and was disconnected")]
    SubscriberLagged,
}

pub type BusResult<T> = Result<T, BusError>;

/// A live tail of a run's event log, delivered over an mpsc channel.
///
/// `None` on `recv()` signals the bus closed (after delivering
/// `run.closed`) or the subscriber was dropped for lagging.
pub struct EventSubscription {
    pub rx: mpsc::Receiver<RunEvent>,
}

/// Per-run, totally-ordered, cursor-indexed event log with replay + live
/// tail, per spec.md §4.B.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Assign the next `seq` for `run_id`, append, and fan out to live
    /// subscribers. No-op (not an error) once the run has closed.
    async fn publish(&self, run_id: &RunId, event: crate::event::RunEventKind, ts: u64) -> BusResult<u64>;

    /// Replay buffered events with `seq >= from_seq`, then tail live until
    /// `run.closed` (inclusive) is delivered, then the channel closes.
    /// Callers reconnecting with a last-processed cursor pass `cursor + 1`.
    async fn subscribe(&self, run_id: &RunId, from_seq: u64) -> BusResult<EventSubscription>;

    /// Publish the terminal `run.closed` marker and flip the run's bus to
    /// `Closed`; further publishes become no-ops.
    async fn close(&self, run_id: &RunId, ts: u64) -> BusResult<()>;
}

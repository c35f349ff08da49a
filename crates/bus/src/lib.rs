// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-bus: in-memory implementation of the per-run event bus port
//! (spec.md §4.B).
//!
//! Each run's log lives behind one `parking_lot::Mutex` guarding a bounded
//! ring buffer plus the set of live subscriber channels, matching the
//! port's "single writer + N readers, per-run mutex for the seq counter"
//! concurrency note. A run moves `Open -> Closing` on `run.closed`;
//! `prune` later drops it to a tombstone once the SSE reconnect grace
//! period elapses, so a client reconnecting after that point gets
//! `BusError::NoSuchRun` instead of silently replaying nothing.

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::event::RunEventKind;
use rp_core::ports::bus::{BusError, BusResult, EventBus, EventSubscription};
use rp_core::{RunEvent, RunId};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusState {
    Open,
    Closing,
}

struct RunLog {
    events: VecDeque<RunEvent>,
    next_seq: u64,
    state: BusState,
    closed_at: Option<u64>,
    subscribers: Vec<mpsc::Sender<RunEvent>>,
}

impl RunLog {
    fn new() -> Self {
        Self { events: VecDeque::new(), next_seq: 1, state: BusState::Open, closed_at: None, subscribers: Vec::new() }
    }
}

pub struct InMemoryEventBus {
    buffer_capacity: usize,
    subscriber_high_water_mark: usize,
    runs: Mutex<HashMap<String, RunLog>>,
    tombstoned: Mutex<HashSet<String>>,
}

impl InMemoryEventBus {
    pub fn new(buffer_capacity: usize, subscriber_high_water_mark: usize) -> Self {
        Self {
            buffer_capacity: buffer_capacity.max(1),
            subscriber_high_water_mark: subscriber_high_water_mark.max(1),
            runs: Mutex::new(HashMap::new()),
            tombstoned: Mutex::new(HashSet::new()),
        }
    }

    /// Drop runs that closed more than `grace_ms` ago from the table,
    /// tombstoning them so a late reconnect gets a clear error instead of
    /// an empty replay. Returns the number pruned.
    pub fn prune(&self, now: u64, grace_ms: u64) -> usize {
        let mut runs = self.runs.lock();
        let expired: Vec<String> = runs
            .iter()
            .filter(|(_, log)| {
                log.state == BusState::Closing
                    && log.closed_at.map(|t| t.saturating_add(grace_ms) <= now).unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();
        let mut tombstoned = self.tombstoned.lock();
        for id in &expired {
            runs.remove(id);
            tombstoned.insert(id.clone());
        }
        expired.len()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, run_id: &RunId, event: RunEventKind, ts: u64) -> BusResult<u64> {
        if self.tombstoned.lock().contains(run_id.as_str()) {
            return Err(BusError::NoSuchRun(run_id.clone()));
        }
        let mut runs = self.runs.lock();
        let log = runs.entry(run_id.0.clone()).or_insert_with(RunLog::new);
        if log.state == BusState::Closing {
            return Ok(log.next_seq.saturating_sub(1));
        }

        let seq = log.next_seq;
        log.next_seq += 1;
        let is_closed = event.is_closed();
        let payload = serde_json::to_value(&event).unwrap_or(serde_json::Value::Null);
        let record = RunEvent { run_id: run_id.clone(), seq, kind: event, ts, payload };

        log.events.push_back(record.clone());
        while log.events.len() > self.buffer_capacity {
            log.events.pop_front();
        }

        log.subscribers.retain(|tx| tx.try_send(record.clone()).is_ok());

        if is_closed {
            log.state = BusState::Closing;
            log.closed_at = Some(ts);
            log.subscribers.clear();
        }

        Ok(seq)
    }

    async fn subscribe(&self, run_id: &RunId, from_seq: u64) -> BusResult<EventSubscription> {
        if self.tombstoned.lock().contains(run_id.as_str()) {
            return Err(BusError::NoSuchRun(run_id.clone()));
        }
        let mut runs = self.runs.lock();
        let log = runs.entry(run_id.0.clone()).or_insert_with(RunLog::new);

        let (tx, rx) = mpsc::channel(self.subscriber_high_water_mark);
        for event in log.events.iter().filter(|e| e.seq >= from_seq) {
            if tx.try_send(event.clone()).is_err() {
                return Err(BusError::SubscriberLagged);
            }
        }

        if log.state == BusState::Open {
            log.subscribers.push(tx);
        }
        // else: Closing — buffered events (possibly including run.closed)
        // were just replayed; dropping `tx` here lets `rx` observe end-of-stream
        // once those replayed sends are read.

        Ok(EventSubscription { rx })
    }

    async fn close(&self, run_id: &RunId, ts: u64) -> BusResult<()> {
        self.publish(run_id, RunEventKind::RunClosed, ts).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

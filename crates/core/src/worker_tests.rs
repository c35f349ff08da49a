// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn worker(now: u64) -> SessionWorker {
    SessionWorker::new(SessionId::new("sess-1"), "container-1", "s3://bucket/sess-1", now)
}

#[test]
fn new_worker_starts_running_with_no_sync_yet() {
    let w = worker(1_000);
    assert_eq!(w.state, WorkerState::Running);
    assert_eq!(w.last_sync_status, SyncStatus::None);
    assert!(w.stopped_at.is_none());
}

#[test]
fn idle_detection_respects_timeout_boundary() {
    let w = worker(0);
    assert!(!w.is_idle_since(999, 1_000));
    assert!(w.is_idle_since(1_000, 1_000));
}

#[test]
fn stopped_worker_is_never_idle() {
    let mut w = worker(0);
    w.state = WorkerState::Stopped;
    assert!(!w.is_idle_since(10_000, 1_000));
}

#[test]
fn stale_stopped_detection_requires_stopped_at() {
    let mut w = worker(0);
    w.state = WorkerState::Stopped;
    assert!(!w.is_stale_stopped(10_000, 1_000));
    w.stopped_at = Some(0);
    assert!(w.is_stale_stopped(1_000, 1_000));
}

#[test]
fn deleted_is_the_only_terminal_state() {
    assert!(!WorkerState::Running.is_terminal());
    assert!(!WorkerState::Stopped.is_terminal());
    assert!(WorkerState::Deleted.is_terminal());
}

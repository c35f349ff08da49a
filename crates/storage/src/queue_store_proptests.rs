// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for P3 (attempts never exceed `max_attempts`) and P4
//! (exactly one caller wins a given row's claim window) from spec.md §8.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::json;

use super::InMemoryQueueStore;
use rp_core::ports::queue::QueueStore;
use rp_core::{OwnerId, ProviderKind, RunId, RunStatus};

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().expect("build current-thread runtime").block_on(fut)
}

proptest! {
    /// `attempts` is bumped by one per `claim_next` and the row goes
    /// terminal exactly when it first reaches `max_attempts`, never past it.
    #[test]
    fn attempts_never_exceeds_max_attempts(max_attempts in 1u32..6, retry_rounds in 0u32..10) {
        block_on(async {
            let store = InMemoryQueueStore::new();
            let run_id = RunId::from("run-p3");
            store.enqueue(run_id.clone(), None, ProviderKind::Fake, max_attempts, json!({}), 0).await.expect("enqueue");

            let mut now = 0u64;
            for _ in 0..retry_rounds {
                let row = store.find_by_run_id(&run_id).await.expect("find").expect("row exists");
                if row.status.is_terminal() {
                    break;
                }
                store.claim_next(OwnerId::new("worker"), now, 1_000).await.expect("claim");
                now += 2_000;
                let outcome = store.mark_retry_or_failed(&run_id, now, 0, "retry".into()).await.expect("mark retry");
                prop_assert!(outcome.attempts <= outcome.max_attempts);
                if outcome.attempts >= outcome.max_attempts {
                    prop_assert_eq!(outcome.status, RunStatus::Failed);
                }
            }

            let row = store.find_by_run_id(&run_id).await.expect("find").expect("row exists");
            prop_assert!(row.attempts <= row.max_attempts);
            Ok(())
        })?;
    }

    /// However many callers race `claim_next` against one queued row at
    /// the same instant, exactly one of them receives it.
    #[test]
    fn exactly_one_claimant_wins_a_contended_row(claimant_count in 2usize..8) {
        let store = Arc::new(InMemoryQueueStore::new());
        let run_id = RunId::from("run-p4");
        block_on(store.enqueue(run_id.clone(), None, ProviderKind::Fake, 3, json!({}), 0)).expect("enqueue");

        let handles: Vec<_> = (0..claimant_count)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || block_on(store.claim_next(OwnerId::new(format!("worker-{i}")), 0, 30_000)).expect("claim_next"))
            })
            .collect();

        let winners = handles.into_iter().map(|h| h.join().expect("thread panicked")).filter(|r| r.is_some()).count();
        prop_assert_eq!(winners, 1);
    }
}
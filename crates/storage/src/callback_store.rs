// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of
//! [`rp_core::ports::callback::CallbackStore`].

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::callback::{CallbackError, CallbackResult, CallbackStore, Dedup};
use rp_core::{EventId, HumanLoopRequest, HumanLoopResponse, HumanLoopStatus, QuestionId, RunId, RunUsage};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct InMemoryCallbackStore {
    seen_events: Mutex<HashSet<(String, String)>>,
    run_sessions: Mutex<HashMap<String, String>>,
    human_loop: Mutex<HashMap<String, HumanLoopRequest>>,
    human_loop_answers: Mutex<HashMap<String, HumanLoopResponse>>,
    usage: Mutex<HashMap<String, RunUsage>>,
}

impl InMemoryCallbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CallbackStore for InMemoryCallbackStore {
    async fn observe_event(&self, run_id: &RunId, event_id: &EventId) -> CallbackResult<Dedup> {
        let mut seen = self.seen_events.lock();
        let key = (run_id.0.clone(), event_id.0.clone());
        if seen.insert(key) {
            Ok(Dedup::First)
        } else {
            Ok(Dedup::Duplicate)
        }
    }

    async fn bind_run(&self, run_id: &RunId, session_id: &str) -> CallbackResult<()> {
        self.run_sessions.lock().insert(run_id.0.clone(), session_id.to_string());
        Ok(())
    }

    async fn session_for_run(&self, run_id: &RunId) -> CallbackResult<Option<String>> {
        Ok(self.run_sessions.lock().get(run_id.as_str()).cloned())
    }

    async fn insert_human_loop_request(&self, req: HumanLoopRequest) -> CallbackResult<()> {
        self.human_loop.lock().insert(req.question_id.to_string(), req);
        Ok(())
    }

    async fn find_human_loop_request(
        &self,
        question_id: &QuestionId,
    ) -> CallbackResult<Option<HumanLoopRequest>> {
        Ok(self.human_loop.lock().get(question_id.as_str()).cloned())
    }

    async fn resolve_human_loop(
        &self,
        question_id: &QuestionId,
        response: HumanLoopResponse,
        now: u64,
    ) -> CallbackResult<()> {
        let mut requests = self.human_loop.lock();
        let req = requests
            .get_mut(question_id.as_str())
            .ok_or_else(|| CallbackError::QuestionNotFound(question_id.clone()))?;
        if req.status.is_terminal() {
            return Ok(());
        }
        req.status = HumanLoopStatus::Resolved;
        req.resolved_at = Some(now);
        drop(requests);
        self.human_loop_answers.lock().insert(question_id.to_string(), response);
        Ok(())
    }

    async fn expire_human_loop(&self, question_id: &QuestionId, now: u64) -> CallbackResult<()> {
        let mut requests = self.human_loop.lock();
        let req = requests
            .get_mut(question_id.as_str())
            .ok_or_else(|| CallbackError::QuestionNotFound(question_id.clone()))?;
        if req.status.is_terminal() {
            return Ok(());
        }
        req.status = HumanLoopStatus::Expired;
        req.resolved_at = Some(now);
        Ok(())
    }

    async fn find_stale_human_loop(
        &self,
        now: u64,
        timeout_ms: u64,
        limit: usize,
    ) -> CallbackResult<Vec<HumanLoopRequest>> {
        let requests = self.human_loop.lock();
        let mut stale: Vec<HumanLoopRequest> = requests
            .values()
            .filter(|r| r.status == HumanLoopStatus::Pending && r.requested_at <= now.saturating_sub(timeout_ms))
            .cloned()
            .collect();
        stale.sort_by_key(|r| r.requested_at);
        stale.truncate(limit);
        Ok(stale)
    }

    async fn pending_human_loop(
        &self,
        run_id: Option<&RunId>,
        limit: usize,
    ) -> CallbackResult<Vec<HumanLoopRequest>> {
        let requests = self.human_loop.lock();
        let mut pending: Vec<HumanLoopRequest> = requests
            .values()
            .filter(|r| r.status == HumanLoopStatus::Pending)
            .filter(|r| run_id.map(|id| &r.run_id == id).unwrap_or(true))
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.requested_at);
        pending.truncate(limit);
        Ok(pending)
    }

    async fn finalize_usage(&self, run_id: &RunId, usage: RunUsage) -> CallbackResult<bool> {
        let mut usages = self.usage.lock();
        if usages.contains_key(run_id.as_str()) {
            return Ok(false);
        }
        usages.insert(run_id.0.clone(), usage);
        Ok(true)
    }

    async fn usage_for_run(&self, run_id: &RunId) -> CallbackResult<Option<RunUsage>> {
        Ok(self.usage.lock().get(run_id.as_str()).cloned())
    }
}

#[cfg(test)]
#[path = "callback_store_tests.rs"]
mod tests;

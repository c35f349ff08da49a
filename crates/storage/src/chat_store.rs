// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of [`rp_core::ports::chat::ChatStore`].

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::chat::{ChatStore, ChatStoreError, ChatStoreResult};
use rp_core::{ChatId, ChatMessage, ChatRole, ChatSession, UserId};
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryChatStore {
    sessions: Mutex<HashMap<String, ChatSession>>,
    messages: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_session(&self, chat_id: ChatId, user_id: UserId, now: u64) -> ChatStoreResult<ChatSession> {
        let session = ChatSession { chat_id: chat_id.clone(), user_id, created_at: now };
        self.sessions.lock().insert(chat_id.0, session.clone());
        Ok(session)
    }

    async fn get_session(&self, chat_id: &ChatId) -> ChatStoreResult<Option<ChatSession>> {
        Ok(self.sessions.lock().get(&chat_id.0).cloned())
    }

    async fn append_message(
        &self,
        chat_id: &ChatId,
        role: ChatRole,
        content: String,
        now: u64,
    ) -> ChatStoreResult<ChatMessage> {
        if !self.sessions.lock().contains_key(&chat_id.0) {
            return Err(ChatStoreError::NotFound(chat_id.0.clone()));
        }
        let mut messages = self.messages.lock();
        let history = messages.entry(chat_id.0.clone()).or_default();
        let seq = history.last().map(|m| m.seq + 1).unwrap_or(0);
        let message = ChatMessage { chat_id: chat_id.clone(), seq, role, content, created_at: now };
        history.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, chat_id: &ChatId, after_seq: u64, limit: usize) -> ChatStoreResult<Vec<ChatMessage>> {
        let messages = self.messages.lock();
        let Some(history) = messages.get(&chat_id.0) else { return Ok(Vec::new()) };
        Ok(history.iter().filter(|m| m.seq > after_seq).take(limit).cloned().collect())
    }
}

#[cfg(test)]
#[path = "chat_store_tests.rs"]
mod tests;

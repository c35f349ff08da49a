// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat history persistence port — spec.md §3/§4.H.
//!
//! Narrow read/append surface only: search and indexing over chat history
//! stay with the external chat-history store (spec.md §1).

use crate::chat::{ChatId, ChatMessage, ChatRole, ChatSession, UserId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatStoreError {
    #[error("chat {0} not found")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type ChatStoreResult<T> = Result<T, ChatStoreError>;

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_session(&self, chat_id: ChatId, user_id: UserId, now: u64) -> ChatStoreResult<ChatSession>;

    async fn get_session(&self, chat_id: &ChatId) -> ChatStoreResult<Option<ChatSession>>;

    /// Append a message, assigning the next `seq` for `chat_id`.
    async fn append_message(&self, chat_id: &ChatId, role: ChatRole, content: String, now: u64) -> ChatStoreResult<ChatMessage>;

    /// Messages with `seq > after_seq`, in order, capped at `limit`.
    async fn list_messages(&self, chat_id: &ChatId, after_seq: u64, limit: usize) -> ChatStoreResult<Vec<ChatMessage>>;
}

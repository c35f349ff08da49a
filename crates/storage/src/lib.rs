// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-storage: in-memory reference implementations of the `rp-core` ports.
//!
//! Stands in for a relational backend: every store is one
//! `parking_lot::Mutex`-guarded map, with the locking discipline each port's
//! contract requires (see each module's doc comment). Swapping in a real
//! database means implementing the same `rp_core::ports` traits against it;
//! nothing upstream of the port boundary changes.

pub mod callback_store;
pub mod chat_store;
pub mod memory_fs;
pub mod queue_store;
pub mod rbac_store;
pub mod worker_store;

pub use callback_store::InMemoryCallbackStore;
pub use chat_store::InMemoryChatStore;
pub use memory_fs::InMemoryFileBrowser;
pub use queue_store::InMemoryQueueStore;
pub use rbac_store::{InMemoryAuditLog, InMemoryRbacPort};
pub use worker_store::InMemoryWorkerStore;

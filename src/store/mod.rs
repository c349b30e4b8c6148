// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Key-value storage for rate limit records.
//!
//! Records are keyed by an opaque string (the limiter uses a digest of the
//! client address). Neither backend coordinates across processes; a
//! multi-instance deployment needs a shared implementation of
//! [`RateLimitStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::StoreBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Per-address fixed window counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    /// Unix timestamp (seconds) of the first request in the window
    pub window_start: i64,
    /// Requests seen in the window
    pub count: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record for key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch the record stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Unconditionally store `record` under `key`.
    async fn put(&self, key: &str, record: RateLimitRecord) -> Result<(), StoreError>;

    /// Store `new` only if the current value equals `expected`
    /// (`None` meaning absent). Returns whether the swap happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<RateLimitRecord>,
        new: RateLimitRecord,
    ) -> Result<bool, StoreError>;

    /// Remove records whose window started before `cutoff`. Returns the
    /// number removed.
    async fn purge_older_than(&self, cutoff: i64) -> Result<usize, StoreError>;
}

/// Build the store selected by configuration.
pub async fn from_backend(backend: &StoreBackend) -> Result<Arc<dyn RateLimitStore>, StoreError> {
    Ok(match backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File { dir } => Arc::new(FileStore::open(dir).await?),
    })
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory record store. Not persisted across restarts.

use super::{RateLimitRecord, RateLimitStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, RateLimitRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        Ok(self.records.read().await.get(key).copied())
    }

    async fn put(&self, key: &str, record: RateLimitRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(key.to_string(), record);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<RateLimitRecord>,
        new: RateLimitRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        if records.get(key).copied() != expected {
            return Ok(false);
        }
        records.insert(key.to_string(), new);
        Ok(true)
    }

    async fn purge_older_than(&self, cutoff: i64) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.window_start >= cutoff);
        Ok(before - records.len())
    }
}

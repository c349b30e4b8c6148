// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! File-backed record store: one small JSON file per key.
//!
//! Survives restarts. Writes go through a temp file and rename, so a crash
//! never leaves a half-written record. Compare-and-swap is serialized with
//! an in-process mutex only; two processes sharing the directory can still
//! race.

use super::{RateLimitRecord, RateLimitStore, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const FILE_PREFIX: &str = "contact_rate_";
const FILE_SUFFIX: &str = ".json";

pub struct FileStore {
    dir: PathBuf,
    cas_lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) the record directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file rate limit store");
        Ok(Self {
            dir,
            cas_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{key}{FILE_SUFFIX}"))
    }

    async fn read(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, record: RateLimitRecord) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(&record).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        self.read(key).await
    }

    async fn put(&self, key: &str, record: RateLimitRecord) -> Result<(), StoreError> {
        self.write(key, record).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<RateLimitRecord>,
        new: RateLimitRecord,
    ) -> Result<bool, StoreError> {
        let _guard = self.cas_lock.lock().await;
        let current = match self.read(key).await {
            Err(StoreError::Corrupt { .. }) => None,
            other => other?,
        };
        if current != expected {
            return Ok(false);
        }
        self.write(key, new).await?;
        Ok(true)
    }

    async fn purge_older_than(&self, cutoff: i64) -> Result<usize, StoreError> {
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(key) = file_name
                .to_str()
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
            else {
                continue;
            };

            let stale = match self.read(key).await {
                Ok(Some(record)) => record.window_start < cutoff,
                Ok(None) => false,
                Err(StoreError::Corrupt { .. }) => true,
                Err(e) => {
                    warn!(key, error = %e, "Skipping unreadable rate limit record");
                    false
                }
            };

            if stale {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(removed)
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed window rate limiter for contact submissions.
//!
//! Each client address gets a counter that starts with its first request
//! and resets once the window has elapsed. Because windows are fixed, a
//! client can send up to twice the limit across a window boundary.
//!
//! By default a check reads the record and then writes it back, so two
//! simultaneous requests from one address may both see the same count.
//! Setting `atomic_updates` switches to compare-and-swap.

use crate::config::RateLimitConfig;
use crate::store::{RateLimitRecord, RateLimitStore, StoreError};
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Attempts before an atomic update gives up under contention.
const MAX_CAS_ATTEMPTS: usize = 8;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Requests recorded in the current window, this one included
        count: u32,
        /// Remaining requests in current window
        remaining: u32,
    },
    /// Request is rate limited
    Denied {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-address fixed window limiter over a [`RateLimitStore`].
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration and store.
    pub fn new(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self { config, store }
    }

    /// Check and count a request from `ip` at the current time.
    pub async fn check_and_record(&self, ip: IpAddr) -> Result<RateLimitResult, StoreError> {
        self.check_and_record_at(ip, Utc::now()).await
    }

    /// Check and count a request from `ip` as if it arrived at `now`.
    pub async fn check_and_record_at(
        &self,
        ip: IpAddr,
        now: DateTime<Utc>,
    ) -> Result<RateLimitResult, StoreError> {
        let key = address_key(ip);
        let now = now.timestamp();

        if !self.config.atomic_updates {
            let current = self.load(ip, &key).await?;
            let (next, result) = self.decide(current, now);
            if let Some(next) = next {
                self.store.put(&key, next).await?;
            }
            self.trace(ip, &result);
            return Ok(result);
        }

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.load(ip, &key).await?;
            let (next, result) = self.decide(current, now);
            let Some(next) = next else {
                self.trace(ip, &result);
                return Ok(result);
            };
            if self.store.compare_and_swap(&key, current, next).await? {
                self.trace(ip, &result);
                return Ok(result);
            }
            debug!(%ip, attempt, "Rate limit record changed concurrently, retrying");
        }

        warn!(%ip, "Rate limit update contended, denying request");
        Ok(RateLimitResult::Denied {
            retry_after: Duration::from_secs(1),
        })
    }

    /// Read the record for `key`. An unreadable record is treated as absent
    /// so that the next write replaces it.
    async fn load(&self, ip: IpAddr, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        match self.store.get(key).await {
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(%ip, error = %e, "Discarding corrupt rate limit record");
                Ok(None)
            }
            other => other,
        }
    }

    /// Compute the record to store (if any) and the verdict.
    fn decide(
        &self,
        current: Option<RateLimitRecord>,
        now: i64,
    ) -> (Option<RateLimitRecord>, RateLimitResult) {
        let window = self.config.window_secs as i64;
        let limit = self.config.max_requests;

        match current {
            Some(record) if now - record.window_start < window => {
                if record.count < limit {
                    let count = record.count + 1;
                    (
                        Some(RateLimitRecord { count, ..record }),
                        RateLimitResult::Allowed {
                            count,
                            remaining: limit.saturating_sub(count),
                        },
                    )
                } else {
                    let reset_at = record.window_start + window;
                    (
                        None,
                        RateLimitResult::Denied {
                            retry_after: Duration::from_secs((reset_at - now).max(0) as u64),
                        },
                    )
                }
            }
            _ if limit == 0 => (
                None,
                RateLimitResult::Denied {
                    retry_after: Duration::from_secs(self.config.window_secs),
                },
            ),
            _ => (
                Some(RateLimitRecord {
                    window_start: now,
                    count: 1,
                }),
                RateLimitResult::Allowed {
                    count: 1,
                    remaining: limit.saturating_sub(1),
                },
            ),
        }
    }

    fn trace(&self, ip: IpAddr, result: &RateLimitResult) {
        match result {
            RateLimitResult::Allowed { count, remaining } => {
                debug!(%ip, count, remaining, "Submission within rate limit")
            }
            RateLimitResult::Denied { retry_after } => {
                info!(%ip, retry_after_secs = retry_after.as_secs(), "Submission rate limited")
            }
        }
    }

    /// Drop records whose window has elapsed (should be called periodically).
    pub async fn cleanup(&self) -> Result<usize, StoreError> {
        let cutoff = Utc::now().timestamp() - self.config.window_secs as i64;
        let removed = self.store.purge_older_than(cutoff).await?;
        if removed > 0 {
            debug!(removed, "Purged expired rate limit records");
        }
        Ok(removed)
    }
}

/// Storage key for an address: hex BLAKE3 digest of its textual form.
pub fn address_key(ip: IpAddr) -> String {
    blake3::hash(ip.to_string().as_bytes()).to_hex().to_string()
}

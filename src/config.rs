// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact endpoint.
//!
//! Defaults mirror the behaviour of the original portfolio form handler:
//! five submissions per address per hour and a 5000 character message cap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Configuration for the contact service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Contact form handling
    #[serde(default)]
    pub contact: ContactConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Notification dispatch
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Contact form handling and validation bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Fixed recipient of every notification
    #[serde(default = "default_recipient")]
    pub recipient: String,

    /// Prefix prepended to the notification subject line
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Site owner shown in the notification footer
    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    /// Upper bound on message length in characters (default: 5000)
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Append-only submission log
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Take the client address from `X-Forwarded-For` (default: false)
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

/// Where rate limit records are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process memory, lost on restart
    Memory,
    /// One file per address under `dir`
    File { dir: PathBuf },
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per address (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Record storage backend (default: file under the temp dir)
    #[serde(default = "default_store")]
    pub store: StoreBackend,

    /// Use compare-and-swap updates instead of read-then-write (default: false)
    #[serde(default)]
    pub atomic_updates: bool,

    /// Answer denied requests with 429 instead of 200 (default: false)
    #[serde(default)]
    pub strict_status: bool,

    /// Interval between purges of expired records in seconds (default: 600)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Notification dispatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Mail relay endpoint; when unset notifications are only logged
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Bearer token sent to the relay
    #[serde(default)]
    pub api_token: Option<String>,

    /// Sender address passed to the relay
    #[serde(default)]
    pub from_address: Option<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_recipient() -> String {
    "quanghuy@example.com".to_string()
}

fn default_subject_prefix() -> String {
    "[Portfolio Contact]".to_string()
}

fn default_owner_name() -> String {
    "Nguyễn Vũ Quang Huy".to_string()
}

fn default_max_message_length() -> usize {
    5000
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/contact_log.txt")
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3600
}

fn default_store() -> StoreBackend {
    StoreBackend::File {
        dir: std::env::temp_dir().join("portfolio-contact"),
    }
}

fn default_cleanup_interval_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            contact: ContactConfig::default(),
            rate_limit: RateLimitConfig::default(),
            notifier: NotifierConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient: default_recipient(),
            subject_prefix: default_subject_prefix(),
            owner_name: default_owner_name(),
            max_message_length: default_max_message_length(),
            log_path: default_log_path(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            store: default_store(),
            atomic_updates: false,
            strict_status: false,
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the cleanup interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl Config {
    /// Build configuration from environment variables, falling back to defaults.
    ///
    /// - `BIND_ADDR`
    /// - `CONTACT_RECIPIENT`, `CONTACT_SUBJECT_PREFIX`, `CONTACT_OWNER_NAME`
    /// - `MAX_MESSAGE_LENGTH`, `CONTACT_LOG_PATH`, `TRUST_PROXY_HEADERS`
    /// - `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_SECS`, `RATE_LIMIT_STORE`
    ///   (`memory` or `file`), `RATE_LIMIT_DIR`, `RATE_LIMIT_ATOMIC`,
    ///   `RATE_LIMIT_STRICT_STATUS`
    /// - `NOTIFIER_URL`, `NOTIFIER_TOKEN`, `NOTIFIER_FROM`
    /// - `METRICS_ENABLED`, `METRICS_PATH`
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let store = match env_string("RATE_LIMIT_STORE").as_deref() {
            Some("memory") => StoreBackend::Memory,
            kind => {
                if let Some(other) = kind.filter(|k| *k != "file") {
                    warn!(
                        key = "RATE_LIMIT_STORE",
                        value = other,
                        "Unknown store backend, using file store"
                    );
                }
                match env_string("RATE_LIMIT_DIR") {
                    Some(dir) => StoreBackend::File { dir: dir.into() },
                    None => defaults.rate_limit.store.clone(),
                }
            }
        };

        Config {
            bind_addr: env_string("BIND_ADDR").unwrap_or(defaults.bind_addr),
            contact: ContactConfig {
                recipient: env_string("CONTACT_RECIPIENT").unwrap_or(defaults.contact.recipient),
                subject_prefix: env_string("CONTACT_SUBJECT_PREFIX")
                    .unwrap_or(defaults.contact.subject_prefix),
                owner_name: env_string("CONTACT_OWNER_NAME").unwrap_or(defaults.contact.owner_name),
                max_message_length: env_parse("MAX_MESSAGE_LENGTH")
                    .unwrap_or(defaults.contact.max_message_length),
                log_path: env_string("CONTACT_LOG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.contact.log_path),
                trust_proxy_headers: env_parse("TRUST_PROXY_HEADERS").unwrap_or(false),
            },
            rate_limit: RateLimitConfig {
                max_requests: env_parse("RATE_LIMIT_MAX").unwrap_or(defaults.rate_limit.max_requests),
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or(defaults.rate_limit.window_secs),
                store,
                atomic_updates: env_parse("RATE_LIMIT_ATOMIC").unwrap_or(false),
                strict_status: env_parse("RATE_LIMIT_STRICT_STATUS").unwrap_or(false),
                ..defaults.rate_limit
            },
            notifier: NotifierConfig {
                webhook_url: env_string("NOTIFIER_URL"),
                api_token: env_string("NOTIFIER_TOKEN"),
                from_address: env_string("NOTIFIER_FROM"),
            },
            metrics: MetricsConfig {
                enabled: env_parse("METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                path: env_string("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, warning when it is set but malformed.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring malformed environment variable");
            None
        }
    }
}

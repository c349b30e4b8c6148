// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact Endpoint
//!
//! This crate receives the portfolio site's contact form and turns it into
//! a notification for the site owner:
//!
//! - Per-address fixed window rate limiting (5 per hour default)
//! - Sanitization of every field (tags stripped, HTML-escaped)
//! - Field validation with all errors reported at once
//! - Honeypot spam trap
//! - Notification dispatch through a pluggable notifier
//! - Append-only submission log

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod notifier;
pub mod sanitize;
pub mod store;
pub mod submission;
pub mod submission_log;
pub mod template;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use notifier::{Notification, Notifier};
pub use validator::{ContactValidator, ValidationErrors};

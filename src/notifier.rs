// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification dispatch.
//!
//! The endpoint hands a composed [`Notification`] to a [`Notifier`] and
//! waits for the outcome; the response reflects confirmed dispatch. The
//! actual mail transport lives behind the notifier.

use crate::config::NotifierConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML document
    pub html_body: String,
    /// `Name <address>` of the person who filled in the form
    pub reply_to: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Relay rejected notification with status {0}")]
    Rejected(reqwest::StatusCode),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Build the notifier selected by configuration.
pub fn from_config(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.api_token.clone(),
            config.from_address.clone(),
        )),
        None => Arc::new(LogNotifier),
    }
}

/// Posts notifications as JSON to an HTTP mail relay.
pub struct WebhookNotifier {
    url: String,
    token: Option<String>,
    from: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl WebhookNotifier {
    pub fn new(url: String, token: Option<String>, from: Option<String>) -> Self {
        Self {
            url,
            token,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            from: self.from.as_deref(),
            notification,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status));
        }

        debug!(%status, to = %notification.to, "Relay accepted notification");
        Ok(())
    }
}

/// Writes notifications to the service log instead of sending them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            reply_to = %notification.reply_to,
            body_bytes = notification.html_body.len(),
            "Notification logged (no relay configured)"
        );
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML notification composed from a validated submission.
//!
//! The body is a tera template with autoescaping on. Escaping goes through
//! [`escape_html`], which leaves character references alone, so fields that
//! were already sanitized render unchanged and anything else is escaped.

use crate::config::ContactConfig;
use crate::notifier::Notification;
use crate::sanitize::{escape_html, sanitize};
use crate::submission::SubmissionInput;
use chrono::{DateTime, Datelike, Utc};
use tera::{Context, Tera};

const BODY_TEMPLATE: &str = "notification.html";

/// Request metadata embedded in the notification.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub received_at: DateTime<Utc>,
    pub client_addr: String,
    pub user_agent: Option<String>,
}

/// Compiled notification template.
pub struct NotificationTemplate {
    tera: Tera,
}

impl NotificationTemplate {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(escape_html);
        tera.add_raw_template(BODY_TEMPLATE, BODY)?;
        Ok(Self { tera })
    }

    /// Compose the notification for `input`.
    pub fn compose(
        &self,
        config: &ContactConfig,
        input: &SubmissionInput,
        meta: &RequestMeta,
    ) -> Result<Notification, tera::Error> {
        Ok(Notification {
            to: config.recipient.clone(),
            subject: header_safe(&format!("{} {}", config.subject_prefix, input.subject)),
            html_body: self.render_body(config, input, meta)?,
            reply_to: header_safe(&format!("{} <{}>", input.name, input.email)),
        })
    }

    fn render_body(
        &self,
        config: &ContactConfig,
        input: &SubmissionInput,
        meta: &RequestMeta,
    ) -> Result<String, tera::Error> {
        let user_agent = meta
            .user_agent
            .as_deref()
            .map(sanitize)
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let mut context = Context::new();
        context.insert("name", &input.name);
        context.insert("email", &input.email);
        context.insert("phone", input.phone.as_deref().unwrap_or(""));
        context.insert("subject", &input.subject);
        context.insert("message", &input.message);
        context.insert("received", &meta.received_at.format("%d/%m/%Y %H:%M:%S").to_string());
        context.insert("client_addr", &meta.client_addr);
        context.insert("user_agent", &user_agent);
        context.insert("year", &meta.received_at.year());
        context.insert("owner", &config.owner_name);

        self.tera.render(BODY_TEMPLATE, &context)
    }
}

/// Subject and reply-to end up as mail headers; line breaks must not survive.
fn header_safe(value: &str) -> String {
    value
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

const BODY: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { background: linear-gradient(135deg, #6366f1, #8b5cf6); color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }
        .content { background: #f8fafc; padding: 30px; border: 1px solid #e2e8f0; }
        .field { margin-bottom: 20px; }
        .label { font-weight: bold; color: #6366f1; margin-bottom: 5px; display: block; }
        .value { background: white; padding: 15px; border-radius: 8px; border: 1px solid #e2e8f0; }
        .footer { background: #1e293b; color: #94a3b8; padding: 20px; text-align: center; font-size: 12px; border-radius: 0 0 10px 10px; }
        .meta { font-size: 11px; color: #94a3b8; margin-top: 20px; padding-top: 20px; border-top: 1px solid #e2e8f0; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1 style="margin: 0;">New message from your portfolio</h1>
        </div>
        <div class="content">
            <div class="field">
                <span class="label">Name:</span>
                <div class="value">{{ name }}</div>
            </div>
            <div class="field">
                <span class="label">Email:</span>
                <div class="value"><a href="mailto:{{ email }}">{{ email }}</a></div>
            </div>
            <div class="field">
                <span class="label">Phone:</span>
                <div class="value">{{ phone }}</div>
            </div>
            <div class="field">
                <span class="label">Subject:</span>
                <div class="value">{{ subject }}</div>
            </div>
            <div class="field">
                <span class="label">Message:</span>
                <div class="value">{{ message }}</div>
            </div>
            <div class="meta">
                <p><strong>Received:</strong> {{ received }}</p>
                <p><strong>IP:</strong> {{ client_addr }}</p>
                <p><strong>User Agent:</strong> {{ user_agent }}</p>
            </div>
        </div>
        <div class="footer">
            <p>Sent automatically by the contact form on your portfolio</p>
            <p>&copy; {{ year }} {{ owner }}</p>
        </div>
    </div>
</body>
</html>
"#;

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact service.
//!
//! `POST /contact` runs the whole submission pipeline: rate check, parse
//! and sanitize, validate, dispatch, log. Every outcome is rendered as
//! `{success, message, errors?}` JSON.

use crate::config::Config;
use crate::error::{json_response, ContactError, ContactResponse, StartupError};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::{Metrics, Outcome};
use crate::notifier::Notifier;
use crate::store::RateLimitStore;
use crate::submission::RawSubmission;
use crate::submission_log::{SubmissionLog, SubmissionLogEntry};
use crate::template::{NotificationTemplate, RequestMeta};
use crate::validator::ContactValidator;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub limiter: RateLimiter,
    pub validator: ContactValidator,
    pub notifier: Arc<dyn Notifier>,
    pub template: NotificationTemplate,
    pub log: SubmissionLog,
    pub metrics: Metrics,
}

impl AppState {
    /// Wire the components described by `config` around the given store and notifier.
    pub fn new(
        config: Config,
        store: Arc<dyn RateLimitStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StartupError> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone(), store),
            validator: ContactValidator::new(config.contact.max_message_length),
            log: SubmissionLog::new(config.contact.log_path.clone()),
            metrics: Metrics::new()?,
            template: NotificationTemplate::new()?,
            notifier,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            "/contact",
            post(submit).fallback(method_not_allowed).layer(cors),
        );

    if state.config.metrics.enabled {
        let path = &state.config.metrics.path;
        let path = if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        };
        router = router.route(&path, get(metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "portfolio-contact",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Any method other than POST on `/contact`.
pub async fn method_not_allowed(State(state): State<Arc<AppState>>, method: Method) -> ContactError {
    debug!(%method, "Rejected contact request method");
    state.metrics.record(Outcome::MethodNotAllowed);
    ContactError::MethodNotAllowed
}

/// Handle a contact form submission.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = process(&state, peer, &headers, &body).await;
    let (metric, response) = match outcome {
        Ok(()) => (
            Outcome::Delivered,
            json_response(StatusCode::OK, ContactResponse::delivered()),
        ),
        Err(err) => {
            let metric = match &err {
                ContactError::MethodNotAllowed => Outcome::MethodNotAllowed,
                ContactError::ValidationFailed(_) => Outcome::Invalid,
                ContactError::RateLimited { .. } => Outcome::RateLimited,
                ContactError::DispatchFailed(_) => Outcome::DispatchFailed,
            };
            (metric, err.into_response())
        }
    };
    state.metrics.record(metric);
    response
}

async fn process(
    state: &AppState,
    peer: SocketAddr,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), ContactError> {
    let ip = client_addr(headers, peer, state.config.contact.trust_proxy_headers);

    match state.limiter.check_and_record(ip).await {
        Ok(RateLimitResult::Allowed { .. }) => {}
        Ok(RateLimitResult::Denied { .. }) => {
            let status = if state.config.rate_limit.strict_status {
                StatusCode::TOO_MANY_REQUESTS
            } else {
                StatusCode::OK
            };
            return Err(ContactError::RateLimited { status });
        }
        Err(e) => {
            warn!(%ip, error = %e, "Rate limit store unavailable, allowing request");
        }
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let input = RawSubmission::from_body(content_type, body).sanitize();

    let errors = state.validator.validate(&input);
    if !errors.is_empty() {
        info!(%ip, fields = ?errors.fields().collect::<Vec<_>>(), "Validation failed");
        return Err(ContactError::ValidationFailed(errors));
    }

    let meta = RequestMeta {
        received_at: Utc::now(),
        client_addr: ip.to_string(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let notification = state
        .template
        .compose(&state.config.contact, &input, &meta)
        .map_err(|e| {
            error!(%ip, error = %e, "Failed to render notification");
            ContactError::DispatchFailed(e.to_string())
        })?;

    if let Err(e) = state.notifier.send(&notification).await {
        error!(%ip, error = %e, "Notification dispatch failed");
        return Err(ContactError::DispatchFailed(e.to_string()));
    }
    info!(%ip, subject = %input.subject, "Contact submission delivered");

    let entry = SubmissionLogEntry {
        timestamp: meta.received_at,
        name: input.name,
        email: input.email,
        subject: input.subject,
        client_addr: meta.client_addr,
    };
    if let Err(e) = state.log.append(&entry).await {
        warn!(path = %state.log.path().display(), error = %e, "Failed to append submission log");
        state.metrics.record_log_failure();
    }

    Ok(())
}

/// Client address: the TCP peer, or the first `X-Forwarded-For` hop when
/// proxy headers are trusted.
fn client_addr(headers: &HeaderMap, peer: SocketAddr, trust_proxy_headers: bool) -> IpAddr {
    if trust_proxy_headers {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|hop| hop.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    peer.ip()
}

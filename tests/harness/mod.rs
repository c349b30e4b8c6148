// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the contact router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot` with the client
//! address injected as `ConnectInfo`, so every test can pick its own IP.

#![allow(dead_code)]

pub mod generators;
pub mod notifiers;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use notifiers::RecordingNotifier;
use portfolio_contact::{
    config::{Config, StoreBackend},
    handlers::{self, AppState},
    store,
};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router wired to a recording notifier, with logs under a temp dir.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub notifier: Arc<RecordingNotifier>,
    pub dir: Arc<TempDir>,
}

/// Response pieces tests assert on.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Default configuration with an in-memory store.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build with configuration tweaks applied after the test defaults.
    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = Arc::new(tempfile::tempdir().expect("tempdir"));
        Self::in_dir(dir, tweak).await
    }

    /// Build sharing `dir` with another app (e.g. to reuse a file store).
    pub async fn in_dir(dir: Arc<TempDir>, tweak: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::default();
        config.contact.log_path = dir.path().join("logs/contact_log.txt");
        config.rate_limit.store = StoreBackend::Memory;
        tweak(&mut config);

        let store = store::from_backend(&config.rate_limit.store)
            .await
            .expect("store");
        let notifier = Arc::new(RecordingNotifier::default());
        let state = Arc::new(
            AppState::new(config, store, notifier.clone()).expect("app state"),
        );

        Self {
            router: handlers::router(state.clone()),
            state,
            notifier,
            dir,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.state.config.contact.log_path.clone()
    }

    /// Lines written to the submission log so far.
    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub async fn send(&self, ip: IpAddr, request: Request<Body>) -> TestResponse {
        let mut request = request;
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::new(ip, 40000)));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, ip: IpAddr, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "harness/1.0")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(ip, request).await
    }

    pub async fn post_form(&self, ip: IpAddr, body: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(ip, request).await
    }

    pub async fn get(&self, ip: IpAddr, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.send(ip, request).await
    }
}

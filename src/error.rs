// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Endpoint error types and their JSON rendering.

use crate::validator::ValidationErrors;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

pub const MSG_DELIVERED: &str = "Your message has been sent successfully!";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Invalid request method";
pub const MSG_VALIDATION_FAILED: &str = "Validation failed";
pub const MSG_RATE_LIMITED: &str = "You have sent too many messages. Please try again later.";
pub const MSG_DISPATCH_FAILED: &str =
    "An error occurred while sending your message. Please try again later.";

/// Every failure the contact endpoint can report.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Request method not allowed")]
    MethodNotAllowed,

    #[error("Submission failed validation")]
    ValidationFailed(ValidationErrors),

    #[error("Client exceeded submission rate")]
    RateLimited { status: StatusCode },

    #[error("Notification dispatch failed: {0}")]
    DispatchFailed(String),
}

/// Failures while wiring up the application state.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Notification template error: {0}")]
    Template(#[from] tera::Error),
}

/// Body of every `/contact` response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ContactResponse {
    pub fn delivered() -> Self {
        Self {
            success: true,
            message: MSG_DELIVERED.to_string(),
            errors: None,
        }
    }

    fn failure(message: &str, errors: Option<ValidationErrors>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            errors,
        }
    }
}

/// JSON response with the explicit UTF-8 content type.
pub fn json_response(status: StatusCode, body: ContactResponse) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    response
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { status } => *status,
            Self::DispatchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::MethodNotAllowed => ContactResponse::failure(MSG_METHOD_NOT_ALLOWED, None),
            Self::ValidationFailed(errors) => {
                ContactResponse::failure(MSG_VALIDATION_FAILED, Some(errors))
            }
            Self::RateLimited { .. } => ContactResponse::failure(MSG_RATE_LIMITED, None),
            // Transport detail stays in the service log
            Self::DispatchFailed(_) => ContactResponse::failure(MSG_DISPATCH_FAILED, None),
        };
        json_response(status, body)
    }
}

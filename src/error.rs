// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact form API and their HTTP rendering.

use crate::email_client::EmailError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded, try again in {} seconds", retry_after_secs(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("Failed to send email: {0}")]
    Dispatch(#[from] EmailError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rounds up so a client never retries a moment too early.
fn retry_after_secs(retry_after: &Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// One offending field of a rejected submission.
#[derive(Debug, Serialize)]
pub struct FieldDetail {
    pub field: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Dispatch(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Dispatch(_) => "DISPATCH_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
        }

        let fields = match &self {
            Self::Validation(err) => Some(
                err.errors()
                    .iter()
                    .map(|e| FieldDetail {
                        field: e.field(),
                        message: e.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        let retry_after = match &self {
            Self::RateLimited { retry_after } => Some(retry_after_secs(retry_after)),
            _ => None,
        };

        let body = Json(ErrorResponse {
            detail: self.to_string(),
            code: self.code(),
            fields,
            retry_after_secs: retry_after,
        });

        match retry_after {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

/// Render a handler panic as a generic 500 instead of dropping the connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %reason, "Handler panicked");

    AppError::Internal("unexpected server error".to_string()).into_response()
}

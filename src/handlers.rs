// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact form service.
//!
//! A `/contact` request passes the rate limiter first, then the validator,
//! and only then reaches the email provider.

use crate::config::Config;
use crate::email_client::EmailClient;
use crate::error::AppError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::{Metrics, Outcome};
use crate::notification::Notification;
use crate::validator::{self, ContactRequest, ValidationError};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub email_client: EmailClient,
    pub metrics: Metrics,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Echo of the accepted submission.
#[derive(Debug, Serialize)]
pub struct ContactData {
    pub name: String,
    pub email: String,
    pub subject: String,
}

/// Successful `/contact` response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: ContactData,
}

/// Service description.
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let limit = &state.config.rate_limit;
    Json(json!({
        "message": "Contact Form API is running",
        "endpoints": {
            "POST /contact": format!(
                "Submit a contact form (Rate limit: {} request(s) per {} seconds per IP)",
                limit.max_requests, limit.window_secs
            ),
            "GET /health": "Health check",
        }
    }))
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-form-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state
        .metrics
        .set_tracked_addresses(state.limiter.tracked_addresses().await);
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Submit a contact form.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let ip = client_ip(&headers, peer, state.config.trust_forwarded_headers);
    debug!(%ip, %peer, "Processing contact submission");

    if let RateLimitResult::Limited { retry_after } = state.limiter.check(ip).await {
        info!(%ip, retry_after_secs = retry_after.as_secs(), "Submission rate limited");
        state.metrics.record(Outcome::RateLimited);
        return Err(AppError::RateLimited { retry_after });
    }

    let submission = body
        .map_err(|rejection| ValidationError::malformed(rejection.body_text()))
        .and_then(|Json(request)| validator::validate(request))
        .map_err(|err| {
            info!(%ip, error = %err, "Submission rejected");
            state.metrics.record(Outcome::Invalid);
            err
        })?;

    let notification = Notification::compose(&submission, &state.config.email);
    match state.email_client.send_email(&notification).await {
        Ok(receipt) => {
            info!(
                %ip,
                message_id = receipt.message_id.as_deref().unwrap_or("-"),
                "Notification sent"
            );
            state.metrics.record(Outcome::Sent);
        }
        Err(err) => {
            warn!(%ip, error = %err, "Notification dispatch failed");
            state.metrics.record(Outcome::DispatchFailed);
            return Err(err.into());
        }
    }

    Ok(Json(ContactResponse {
        status: "success",
        message: "Your message has been sent successfully!",
        data: ContactData {
            name: submission.name().to_string(),
            email: submission.email().to_string(),
            subject: submission.subject().to_string(),
        },
    }))
}

/// Resolve the rate limit key for a request.
///
/// Forwarding headers are only honoured when the service sits behind a
/// trusted proxy; otherwise any client could pick its own key.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok());
        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip;
        }
    }
    peer.ip()
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form API
//!
//! Accepts contact form submissions over HTTP and forwards them to a
//! configured inbox through the Brevo transactional email API:
//!
//! - Per-IP fixed-window rate limiting (1 submission per hour default)
//! - Field validation (length bounds, email address grammar)
//! - HTML and plain-text notification with reply-to set to the submitter
//! - Prometheus metrics for submission outcomes

pub mod config;
pub mod email_client;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod notification;
pub mod startup;
pub mod validator;

pub use config::Config;
pub use error::AppError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use startup::Application;
pub use validator::{Submission, ValidationError};

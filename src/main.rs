// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form API Service
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first if present):
//!
//! - `BREVO_API_KEY`: Brevo API key (required)
//! - `SENDER_EMAIL`: Verified sender address (required)
//! - `RECIPIENT_EMAIL`: Inbox receiving submissions (required)
//! - `SENDER_NAME`: Sender display name (default: Contact Form)
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8000)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per window per IP (default: 1)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 3600)
//! - `TRUST_FORWARDED_HEADERS`: Key on X-Forwarded-For (default: false)
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: any)
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_form_api::{config::Config, startup::Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        recipient = %config.email.recipient_email,
        trust_forwarded_headers = config.trust_forwarded_headers,
        "Starting contact form API"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    info!("Server stopped");
    Ok(())
}

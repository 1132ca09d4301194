// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact form service.
//!
//! Everything is read from the process environment once at startup and kept
//! in an immutable [`Config`] that is handed to the components that need it.

use crate::validator::is_valid_email;
use secrecy::Secret;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Startup-time configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the contact form service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8000)
    pub bind_addr: String,

    /// Use X-Forwarded-For / X-Real-IP as the client address
    pub trust_forwarded_headers: bool,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Email provider configuration
    pub email: EmailConfig,

    /// Allowed CORS origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Per-address submission limits.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Admitted submissions per address per window (default: 1)
    pub max_requests: u32,

    /// Window length in seconds (default: 3600)
    pub window_secs: u64,

    /// How often expired records are purged, in seconds (default: 300)
    pub cleanup_interval_secs: u64,
}

/// Brevo transactional email settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Secret<String>,
    pub base_url: Url,
    pub sender_email: String,
    pub sender_name: String,
    pub recipient_email: String,
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    pub path: String,
}

/// Paths owned by the service's own routes.
const RESERVED_PATHS: &[&str] = &["/", "/health", "/contact"];

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_requests() -> u32 {
    1
}

fn default_window_secs() -> u64 {
    3600
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

fn default_sender_name() -> String {
    "Contact Form".to_string()
}

fn default_base_url() -> &'static str {
    "https://api.brevo.com"
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the cleanup interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_or(&get, "RATE_LIMIT_MAX_REQUESTS", default_max_requests())?,
            window_secs: parse_or(&get, "RATE_LIMIT_WINDOW_SECS", default_window_secs())?,
            cleanup_interval_secs: parse_or(
                &get,
                "RATE_LIMIT_CLEANUP_SECS",
                default_cleanup_interval_secs(),
            )?,
        };
        if rate_limit.max_requests == 0 {
            return Err(invalid("RATE_LIMIT_MAX_REQUESTS", "0", "must be at least 1"));
        }
        if rate_limit.window_secs == 0 {
            return Err(invalid("RATE_LIMIT_WINDOW_SECS", "0", "must be at least 1"));
        }
        if rate_limit.cleanup_interval_secs == 0 {
            return Err(invalid("RATE_LIMIT_CLEANUP_SECS", "0", "must be at least 1"));
        }

        let base_url_raw = get("BREVO_API_URL").unwrap_or_else(|| default_base_url().to_string());
        let base_url = Url::parse(&base_url_raw)
            .map_err(|e| invalid("BREVO_API_URL", &base_url_raw, &e.to_string()))?;

        let email = EmailConfig {
            api_key: Secret::new(required(&get, "BREVO_API_KEY")?),
            base_url,
            sender_email: required_email(&get, "SENDER_EMAIL")?,
            sender_name: get("SENDER_NAME").unwrap_or_else(default_sender_name),
            recipient_email: required_email(&get, "RECIPIENT_EMAIL")?,
            timeout_ms: parse_or(&get, "EMAIL_TIMEOUT_MS", default_timeout_ms())?,
        };

        let cors_allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) if raw != "*" => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        let metrics_path = get("METRICS_PATH").unwrap_or_else(default_metrics_path);
        if !metrics_path.starts_with('/') {
            return Err(invalid("METRICS_PATH", &metrics_path, "must start with '/'"));
        }
        if RESERVED_PATHS.contains(&metrics_path.as_str()) {
            return Err(invalid("METRICS_PATH", &metrics_path, "already served by another endpoint"));
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(default_bind_addr),
            trust_forwarded_headers: parse_or(&get, "TRUST_FORWARDED_HEADERS", false)?,
            rate_limit,
            email,
            cors_allowed_origins,
            metrics: MetricsConfig {
                enabled: parse_or(&get, "METRICS_ENABLED", true)?,
                path: metrics_path,
            },
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn required<G>(get: &G, key: &'static str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or(ConfigError::Missing(key))
}

fn required_email<G>(get: &G, key: &'static str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = required(get, key)?;
    if is_valid_email(&value) {
        Ok(value)
    } else {
        Err(invalid(key, &value, "not a valid email address"))
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(default),
    }
}

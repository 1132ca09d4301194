// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client IP address.
//!
//! Each address may make `max_requests` admitted submissions per window.
//! The window opens at the first admitted request and lasts
//! `window_secs`; rejected requests neither count nor extend it.
//!
//! All records live in a single table behind an async mutex, so the
//! check-and-increment for one address is atomic with respect to other
//! requests carrying the same address.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining admissions in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-address window state.
#[derive(Debug)]
struct WindowRecord {
    /// Admitted requests in the current window
    count: u32,
    /// When the current window opened
    window_start: Instant,
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Mutex<HashMap<IpAddr, WindowRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether `ip` may submit now.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now()).await
    }

    /// Check whether `ip` may submit at `now`, recording the admission if so.
    pub async fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let max = self.config.max_requests;

        let mut records = self.records.lock().await;
        let record = records.entry(ip).or_insert(WindowRecord {
            count: 0,
            window_start: now,
        });

        let elapsed = now.saturating_duration_since(record.window_start);
        if record.count == 0 || elapsed >= window {
            record.count = 0;
            record.window_start = now;
        }

        let remaining_window = window.saturating_sub(now.saturating_duration_since(record.window_start));

        if record.count < max {
            record.count += 1;
            debug!(%ip, count = record.count, "Request admitted");
            RateLimitResult::Allowed {
                remaining: max - record.count,
                reset_in: remaining_window,
            }
        } else {
            debug!(%ip, retry_after = ?remaining_window, "IP rate limit exceeded");
            RateLimitResult::Limited {
                retry_after: remaining_window,
            }
        }
    }

    /// Drop records whose window has elapsed (should be called periodically).
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    pub async fn cleanup_at(&self, now: Instant) {
        let window = self.config.window_duration();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| now.saturating_duration_since(record.window_start) < window);
        debug!(removed = before - records.len(), remaining = records.len(), "Rate limit table cleaned");
    }

    /// Number of addresses currently tracked.
    pub async fn tracked_addresses(&self) -> usize {
        self.records.lock().await.len()
    }
}

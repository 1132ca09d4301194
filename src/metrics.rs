// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for submission outcomes.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// How a `/contact` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Invalid,
    RateLimited,
    DispatchFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Invalid => "invalid",
            Self::RateLimited => "rate_limited",
            Self::DispatchFailed => "dispatch_failed",
        }
    }
}

/// Metrics registry owned by the application state.
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_addresses: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        let tracked_addresses = IntGauge::new(
            "rate_limit_tracked_addresses",
            "Client addresses currently held in the rate limit table",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(tracked_addresses.clone()))?;

        Ok(Self {
            registry,
            submissions,
            tracked_addresses,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn set_tracked_addresses(&self, count: usize) {
        self.tracked_addresses.set(count as i64);
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for submission and URL-check outcomes.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters exposed on the metrics endpoint. Cloning shares the counters.
#[derive(Clone)]
pub struct IntakeMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    url_checks: IntCounterVec,
}

impl IntakeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("intake".to_string()), None)?;

        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Contact submissions by outcome"),
            &["outcome"],
        )?;
        let url_checks = IntCounterVec::new(
            Opts::new("url_checks_total", "URL safety checks by verdict"),
            &["verdict"],
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(url_checks.clone()))?;

        Ok(Self {
            registry,
            submissions,
            url_checks,
        })
    }

    /// Count a submission outcome ("submitted" or a `SubmitError` code).
    pub fn record_submission(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn record_url_check(&self, safe: bool) {
        let verdict = if safe { "safe" } else { "unsafe" };
        self.url_checks.with_label_values(&[verdict]).inc();
    }

    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render all counters in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for contact submissions.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Invalid,
    RateLimited,
    DispatchFailed,
    MethodNotAllowed,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Invalid => "invalid",
            Self::RateLimited => "rate_limited",
            Self::DispatchFailed => "dispatch_failed",
            Self::MethodNotAllowed => "method_not_allowed",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    log_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("contact_submissions_total", "Contact submissions by outcome"),
            &["outcome"],
        )?;
        let log_failures = IntCounter::new(
            "contact_log_failures_total",
            "Submission log appends that failed",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(log_failures.clone()))?;

        Ok(Self {
            registry,
            submissions,
            log_failures,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions.with_label_values(&[outcome.label()]).inc();
    }

    pub fn record_log_failure(&self) {
        self.log_failures.inc();
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions.with_label_values(&[outcome.label()]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record(Outcome::Delivered);
        metrics.record(Outcome::Delivered);
        metrics.record(Outcome::RateLimited);

        assert_eq!(metrics.count(Outcome::Delivered), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.count(Outcome::Invalid), 0);
    }

    #[test]
    fn test_render_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.record(Outcome::Invalid);
        metrics.record_log_failure();

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"contact_submissions_total{outcome="invalid"} 1"#));
        assert!(text.contains("contact_log_failures_total 1"));
    }
}

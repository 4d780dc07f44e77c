// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission pipeline.
//!
//! One call per submit: rate limit, then validate every field, then
//! sanitize and deliver. Each stage only runs when the previous one passed,
//! so a caller sees exactly one error class per attempt.

use crate::error::{SubmitError, TransportError};
use crate::form::{ContactForm, ContactRequest};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::IntakeMetrics;
use crate::transport::Transport;
use crate::validator::FieldValidator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Proof of an accepted, delivered submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    /// What was delivered, after sanitization
    pub request: ContactRequest,
    pub submitted_at: DateTime<Utc>,
    /// Attempts left for this client in the current window
    pub remaining_attempts: u32,
}

/// Runs the intake pipeline against a delivery transport.
pub struct SubmissionOrchestrator<T> {
    limiter: RateLimiter,
    validator: FieldValidator,
    transport: T,
    transport_timeout: Duration,
    metrics: Option<IntakeMetrics>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<T: Transport> SubmissionOrchestrator<T> {
    pub fn new(limiter: RateLimiter, validator: FieldValidator, transport: T) -> Self {
        Self {
            limiter,
            validator,
            transport,
            transport_timeout: DEFAULT_TRANSPORT_TIMEOUT,
            metrics: None,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_transport_timeout(mut self, timeout: Duration) -> Self {
        self.transport_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: IntakeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Number of clients with a submission currently being delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Clear a client's rate limit history, e.g. after a manual cooldown.
    /// Not part of the normal submit flow.
    pub async fn reset_client(&self, client_key: &str) {
        info!(client = %client_key, "Rate limit reset by operator");
        self.limiter.reset(client_key).await;
    }

    /// Run one submission attempt for `client_key`.
    ///
    /// A second call for the same key while one is still delivering is
    /// answered with [`SubmitError::Busy`] without touching the limiter.
    pub async fn submit(
        &self,
        client_key: &str,
        form: &ContactForm,
    ) -> Result<SubmitReceipt, SubmitError> {
        let result = match InFlightGuard::acquire(&self.in_flight, client_key) {
            Some(_guard) => self.run(client_key, form).await,
            None => {
                debug!(client = %client_key, "Submission already in flight, ignoring");
                Err(SubmitError::Busy)
            }
        };

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "submitted",
                Err(err) => err.code(),
            };
            metrics.record_submission(outcome);
        }

        result
    }

    async fn run(&self, client_key: &str, form: &ContactForm) -> Result<SubmitReceipt, SubmitError> {
        let remaining_attempts = match self.limiter.check(client_key).await {
            RateLimitResult::Allowed { remaining, .. } => remaining,
            RateLimitResult::Limited { retry_after } => {
                warn!(
                    client = %client_key,
                    retry_after_secs = retry_after.as_secs(),
                    "Submission rate limited"
                );
                return Err(SubmitError::RateLimited { retry_after });
            }
        };

        let errors = self.validator.validate(form);
        if !errors.is_empty() {
            info!(client = %client_key, invalid_fields = errors.len(), "Submission rejected by validation");
            return Err(SubmitError::Invalid(errors));
        }

        let request = form.sanitized();
        debug!(client = %client_key, ?request, "Delivering sanitized submission");

        match tokio::time::timeout(self.transport_timeout, self.transport.deliver(&request)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(client = %client_key, error = %err, "Submission delivery failed");
                return Err(SubmitError::Transport(err));
            }
            Err(_) => {
                warn!(client = %client_key, timeout = ?self.transport_timeout, "Submission delivery timed out");
                return Err(SubmitError::Transport(TransportError::Timeout(
                    self.transport_timeout,
                )));
            }
        }

        info!(client = %client_key, remaining_attempts, "Submission delivered");
        Ok(SubmitReceipt {
            request,
            submitted_at: Utc::now(),
            remaining_attempts,
        })
    }
}

/// Marks a client key as delivering until dropped.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<String>>>, key: &str) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        inserted.then(|| Self {
            set: Arc::clone(set),
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::form::Field;
    use crate::transport::LogTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Counts deliveries; fails when told to.
    #[derive(Default)]
    struct CountingTransport {
        delivered: AtomicUsize,
        fail: bool,
    }

    impl Transport for CountingTransport {
        async fn deliver(&self, _request: &ContactRequest) -> Result<(), TransportError> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TransportError::Status(503))
            } else {
                Ok(())
            }
        }
    }

    /// Blocks each delivery until released.
    struct GatedTransport {
        gate: Arc<Notify>,
    }

    impl Transport for GatedTransport {
        async fn deliver(&self, _request: &ContactRequest) -> Result<(), TransportError> {
            self.gate.notified().await;
            Ok(())
        }
    }

    struct StalledTransport;

    impl Transport for StalledTransport {
        async fn deliver(&self, _request: &ContactRequest) -> Result<(), TransportError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn orchestrator<T: Transport>(transport: T) -> SubmissionOrchestrator<T> {
        SubmissionOrchestrator::new(
            RateLimiter::new(RateLimitConfig::default()),
            FieldValidator::default(),
            transport,
        )
    }

    fn valid_form() -> ContactForm {
        ContactForm::new("Jo", "jo@x.com", "", "0123456789")
    }

    #[tokio::test]
    async fn test_valid_submission_is_delivered_sanitized() {
        let orch = orchestrator(CountingTransport::default());
        let form = ContactForm::new(" <Ana> ", "ana@example.com", "(19) 98830-0645", "Quero um orçamento onclick=x");

        let receipt = orch.submit("client-1", &form).await.unwrap();
        assert_eq!(receipt.request.name, "Ana");
        assert_eq!(receipt.request.message, "Quero um orçamento x");
        assert_eq!(receipt.remaining_attempts, 4);
        assert_eq!(orch.transport.delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_all_fields_and_skips_delivery() {
        let orch = orchestrator(CountingTransport::default());
        let form = ContactForm::new("J", "", "12", "");

        match orch.submit("client-1", &form).await {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.get(Field::Phone).is_some());
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        assert_eq!(orch.transport.delivered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_precedes_validation() {
        let orch = orchestrator(CountingTransport::default());
        let bad_form = ContactForm::default();

        // Invalid attempts still consume the budget
        for _ in 0..5 {
            assert!(matches!(
                orch.submit("client-1", &bad_form).await,
                Err(SubmitError::Invalid(_))
            ));
        }
        assert!(matches!(
            orch.submit("client-1", &bad_form).await,
            Err(SubmitError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_converted() {
        let orch = orchestrator(CountingTransport {
            fail: true,
            ..Default::default()
        });

        match orch.submit("client-1", &valid_form()).await {
            Err(SubmitError::Transport(TransportError::Status(503))) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(orch.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_transport_times_out() {
        let orch = orchestrator(StalledTransport).with_transport_timeout(Duration::from_secs(5));

        match orch.submit("client-1", &valid_form()).await {
            Err(SubmitError::Transport(TransportError::Timeout(d))) => {
                assert_eq!(d, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let gate = Arc::new(Notify::new());
        let orch = Arc::new(orchestrator(GatedTransport { gate: gate.clone() }));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit("client-1", &valid_form()).await })
        };
        while orch.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            orch.submit("client-1", &valid_form()).await,
            Err(SubmitError::Busy)
        ));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(orch.in_flight(), 0);

        // Busy attempt was not counted against the limiter: 5 - 1 admitted
        let form = valid_form();
        let receipt = orch.submit("client-1", &form);
        gate.notify_one();
        assert_eq!(receipt.await.unwrap().remaining_attempts, 3);
    }

    #[tokio::test]
    async fn test_metrics_record_outcomes() {
        let metrics = IntakeMetrics::new().unwrap();
        let orch = orchestrator(LogTransport).with_metrics(metrics.clone());

        orch.submit("client-1", &valid_form()).await.unwrap();
        let _ = orch.submit("client-1", &ContactForm::default()).await;

        assert_eq!(metrics.submissions("submitted"), 1);
        assert_eq!(metrics.submissions("INVALID"), 1);
    }

    #[tokio::test]
    async fn test_reset_client() {
        let orch = SubmissionOrchestrator::new(
            RateLimiter::new(RateLimitConfig {
                max_attempts: 1,
                ..Default::default()
            }),
            FieldValidator::default(),
            LogTransport,
        );

        orch.submit("client-1", &valid_form()).await.unwrap();
        assert!(orch.submit("client-1", &valid_form()).await.is_err());
        orch.reset_client("client-1").await;
        assert!(orch.submit("client-1", &valid_form()).await.is_ok());
    }
}

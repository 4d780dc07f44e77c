// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form session state machine.
//!
//! Tracks what a visitor sees around one contact form:
//!
//! ```text
//! Idle -> Submitting -> { Submitted | Error | Invalid | RateLimited }
//! ```
//!
//! Any terminal state returns to `Idle` on the next edit or submit. Only one
//! submission runs at a time; a submit while `Submitting` is ignored.

use crate::config::SubmissionConfig;
use crate::error::SubmitError;
use crate::form::{ContactForm, Field, ValidationErrors};
use crate::orchestrator::{SubmissionOrchestrator, SubmitReceipt};
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Submitted,
    Error,
    Invalid,
    RateLimited,
}

/// Message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

const SUCCESS_MESSAGE: &str = "Mensagem enviada com sucesso! Entraremos em contato em breve.";

/// Outcome of [`FormSession::submit_shared`].
#[derive(Debug)]
pub enum SharedSubmit {
    /// Session was already submitting; nothing happened
    Ignored,
    /// Pipeline ran and the session was updated
    Applied(Result<SubmitReceipt, SubmitError>),
    /// Pipeline ran but the session was dropped meanwhile
    Discarded(Result<SubmitReceipt, SubmitError>),
}

/// One visitor's contact form.
#[derive(Debug, Clone)]
pub struct FormSession {
    form: ContactForm,
    errors: ValidationErrors,
    state: SubmissionState,
    banner: Option<Banner>,
    succeeded_at: Option<Instant>,
    success_display: Duration,
}

impl FormSession {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            form: ContactForm::default(),
            errors: ValidationErrors::new(),
            state: SubmissionState::Idle,
            banner: None,
            succeeded_at: None,
            success_display: config.success_display(),
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Current state. A success older than the display duration reads as
    /// `Idle`.
    pub fn state(&self) -> SubmissionState {
        if self.success_expired() {
            SubmissionState::Idle
        } else {
            self.state
        }
    }

    pub fn banner(&self) -> Option<&Banner> {
        if self.success_expired() {
            None
        } else {
            self.banner.as_ref()
        }
    }

    fn success_expired(&self) -> bool {
        self.state == SubmissionState::Submitted
            && self
                .succeeded_at
                .is_some_and(|at| at.elapsed() >= self.success_display)
    }

    /// Update one field. Clears that field's error and any banner; terminal
    /// states fall back to `Idle`.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        self.errors.remove(field);
        if self.state != SubmissionState::Submitting {
            self.state = SubmissionState::Idle;
            self.banner = None;
            self.succeeded_at = None;
        }
    }

    /// Enter `Submitting` and snapshot the form, or `None` if a submission
    /// is already running.
    pub fn begin(&mut self) -> Option<ContactForm> {
        if self.state == SubmissionState::Submitting {
            return None;
        }
        self.state = SubmissionState::Submitting;
        self.banner = None;
        self.succeeded_at = None;
        Some(self.form.clone())
    }

    /// Apply the pipeline result. Success clears the form; every failure
    /// keeps the input so the visitor can retry without retyping.
    pub fn finish(&mut self, result: &Result<SubmitReceipt, SubmitError>) {
        match result {
            Ok(_) => {
                self.form = ContactForm::default();
                self.errors = ValidationErrors::new();
                self.state = SubmissionState::Submitted;
                self.banner = Some(Banner::Success(SUCCESS_MESSAGE.to_string()));
                self.succeeded_at = Some(Instant::now());
            }
            Err(err @ SubmitError::RateLimited { .. }) => {
                self.state = SubmissionState::RateLimited;
                self.banner = Some(Banner::Error(err.to_string()));
            }
            Err(SubmitError::Invalid(errors)) => {
                self.errors = errors.clone();
                self.state = SubmissionState::Invalid;
                self.banner = None;
            }
            Err(err @ SubmitError::Transport(_)) => {
                self.state = SubmissionState::Error;
                self.banner = Some(Banner::Error(err.to_string()));
            }
            Err(SubmitError::Busy) => {
                self.state = SubmissionState::Idle;
            }
        }
    }

    /// Submit while holding the session exclusively.
    pub async fn submit<T: Transport>(
        &mut self,
        orchestrator: &SubmissionOrchestrator<T>,
        client_key: &str,
    ) -> Option<Result<SubmitReceipt, SubmitError>> {
        let form = self.begin()?;
        let result = orchestrator.submit(client_key, &form).await;
        self.finish(&result);
        Some(result)
    }

    /// Submit a session shared with the UI layer.
    ///
    /// The session is only weakly held while delivery is pending. If every
    /// other handle is dropped in the meantime (the form was torn down) the
    /// result is not applied to anything.
    pub async fn submit_shared<T: Transport>(
        session: Arc<Mutex<FormSession>>,
        orchestrator: &SubmissionOrchestrator<T>,
        client_key: &str,
    ) -> SharedSubmit {
        let Some(form) = session.lock().await.begin() else {
            return SharedSubmit::Ignored;
        };

        let weak = Arc::downgrade(&session);
        drop(session);

        let result = orchestrator.submit(client_key, &form).await;

        match weak.upgrade() {
            Some(session) => {
                session.lock().await.finish(&result);
                SharedSubmit::Applied(result)
            }
            None => {
                debug!(client = %client_key, "Form session gone, discarding submission result");
                SharedSubmit::Discarded(result)
            }
        }
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! NITRON FLOW contact intake
//!
//! This crate decides whether a contact-form submission may proceed and
//! what has to be stripped from it first:
//!
//! - Field validation (name, email, optional Brazilian phone, message)
//! - Input sanitization of free-text fields
//! - URL safety checks for embed and navigation targets
//! - Per-client sliding-window rate limiting (5 attempts / minute default)
//! - Submission orchestration with a pluggable delivery transport

pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod headers;
pub mod limiter;
pub mod metrics;
pub mod orchestrator;
pub mod sanitizer;
pub mod session;
pub mod transport;
pub mod url_guard;
pub mod validator;

pub use config::Config;
pub use error::{FieldError, SubmitError, TransportError};
pub use form::{ContactForm, ContactRequest, Field, ValidationErrors};
pub use limiter::{RateLimitResult, RateLimiter};
pub use orchestrator::{SubmissionOrchestrator, SubmitReceipt};
pub use session::{FormSession, SubmissionState};
pub use url_guard::{UrlGuard, UrlVerdict};
pub use validator::FieldValidator;

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.
//!
//! The site posts its contact form here and asks whether portfolio demo
//! URLs may be embedded.

use crate::config::Config;
use crate::error::SubmitError;
use crate::form::{ContactForm, ValidationErrors};
use crate::headers::{security_headers, SecurityHeaders};
use crate::limiter::RateLimiter;
use crate::metrics::IntakeMetrics;
use crate::orchestrator::SubmissionOrchestrator;
use crate::transport::{ConfiguredTransport, Transport};
use crate::url_guard::{UrlGuard, UrlVerdict, IFRAME_SANDBOX};
use crate::validator::FieldValidator;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Header carrying the caller's session or client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Shared application state.
pub struct AppState<T = ConfiguredTransport> {
    pub orchestrator: SubmissionOrchestrator<T>,
    pub url_guard: UrlGuard,
    pub metrics: IntakeMetrics,
    pub config: Config,
}

impl<T: Transport> AppState<T> {
    /// Wire the pipeline from configuration around the given transport.
    pub fn new(config: Config, transport: T) -> Result<Self, prometheus::Error> {
        let metrics = IntakeMetrics::new()?;
        let orchestrator = SubmissionOrchestrator::new(
            RateLimiter::new(config.rate_limit.clone()),
            FieldValidator::new(config.fields.clone()),
            transport,
        )
        .with_transport_timeout(config.submission.transport_timeout())
        .with_metrics(metrics.clone());

        Ok(Self {
            orchestrator,
            url_guard: UrlGuard::new(config.url_guard.clone()),
            metrics,
            config,
        })
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

/// Accepted submission body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub submitted_at: DateTime<Utc>,
    pub remaining_attempts: u32,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// URL check request.
#[derive(Debug, Deserialize)]
pub struct UrlCheckRequest {
    pub url: String,
    /// Require an absolute URL and apply private-host blocking
    #[serde(default)]
    pub strict: bool,
}

/// URL check response.
#[derive(Debug, Serialize)]
pub struct UrlCheckResponse {
    pub safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    /// Sandbox attribute to use when embedding a safe URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<&'static str>,
}

/// Build the service router.
pub fn router<T: Transport + 'static>(state: Arc<AppState<T>>) -> Router {
    let headers = Arc::new(SecurityHeaders::new(&state.config.security));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            "/contact",
            post(submit_contact::<T>).layer(DefaultBodyLimit::max(
                state.config.submission.max_body_bytes,
            )),
        )
        .route("/url-check", post(check_url::<T>));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics_handler::<T>));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(headers, security_headers)),
    )
    .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "nitron-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the intake pipeline for a posted contact form.
pub async fn submit_contact<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Response {
    let Some(key) = client_key(&headers, state.config.submission.allow_host_fallback) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Missing {CLIENT_ID_HEADER} header"),
                code: "MISSING_CLIENT_ID",
                retry_after_secs: None,
                errors: None,
            }),
        )
            .into_response();
    };

    match state.orchestrator.submit(&key, &form).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(SubmitResponse {
                status: "submitted",
                message: "Mensagem enviada com sucesso!",
                submitted_at: receipt.submitted_at,
                remaining_attempts: receipt.remaining_attempts,
            }),
        )
            .into_response(),
        Err(err) => submit_error_response(err),
    }
}

fn submit_error_response(err: SubmitError) -> Response {
    let error = err.to_string();
    let code = err.code();

    match err {
        SubmitError::RateLimited { retry_after } => {
            let retry_secs = retry_after_secs(retry_after);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_secs.to_string())],
                Json(ErrorResponse {
                    error,
                    code,
                    retry_after_secs: Some(retry_secs),
                    errors: None,
                }),
            )
                .into_response()
        }
        SubmitError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error,
                code,
                retry_after_secs: None,
                errors: Some(errors),
            }),
        )
            .into_response(),
        SubmitError::Transport(source) => {
            error!(error = %source, "Contact delivery failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error,
                    code,
                    retry_after_secs: None,
                    errors: None,
                }),
            )
                .into_response()
        }
        SubmitError::Busy => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error,
                code,
                retry_after_secs: None,
                errors: None,
            }),
        )
            .into_response(),
    }
}

/// Whole seconds, rounded up, never below one.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Resolve the rate limiting key. The Host fallback keys every visitor of
/// a deployment together and is only used when explicitly enabled.
fn client_key(headers: &HeaderMap, allow_host_fallback: bool) -> Option<String> {
    let from_header = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(id) = from_header {
        return Some(id.to_string());
    }

    if !allow_host_fallback {
        debug!("Request without client id rejected");
        return None;
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown");
    warn!(host = %host, "No client id, falling back to shared host key");
    Some(format!("host:{host}"))
}

/// Check whether a URL may be embedded or opened.
pub async fn check_url<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Json(req): Json<UrlCheckRequest>,
) -> Json<UrlCheckResponse> {
    let verdict = if req.strict {
        state.url_guard.check_strict(&req.url)
    } else {
        state.url_guard.check(&req.url)
    };
    state.metrics.record_url_check(verdict.is_safe());

    Json(match verdict {
        UrlVerdict::Safe(url) => UrlCheckResponse {
            safe: true,
            reason: None,
            resolved: Some(url.to_string()),
            sandbox: Some(IFRAME_SANDBOX),
        },
        UrlVerdict::Unsafe(reason) => UrlCheckResponse {
            safe: false,
            reason: Some(reason.to_string()),
            resolved: None,
            sandbox: None,
        },
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

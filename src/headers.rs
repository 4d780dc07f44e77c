// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Security headers attached to every response.

use crate::config::SecurityHeadersConfig;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline' 'unsafe-eval' https://cdnjs.cloudflare.com; \
style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
font-src 'self' https://cdnjs.cloudflare.com https://fonts.gstatic.com data:; \
img-src 'self' data: https: blob:; \
connect-src 'self' https:; \
frame-src 'self' https:; \
object-src 'none'; \
base-uri 'self'; \
form-action 'self'; \
frame-ancestors 'self'";

const HSTS: &str = "max-age=63072000; includeSubDomains; preload";

/// Header set derived from configuration.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn new(config: &SecurityHeadersConfig) -> Self {
        if !config.enabled {
            return Self { headers: Vec::new() };
        }

        let mut headers = vec![
            static_header("x-content-type-options", "nosniff"),
            static_header("x-frame-options", "SAMEORIGIN"),
            static_header("x-xss-protection", "1; mode=block"),
            static_header("referrer-policy", "strict-origin-when-cross-origin"),
            static_header(
                "permissions-policy",
                "camera=(), microphone=(), geolocation=(), interest-cohort=()",
            ),
            static_header("content-security-policy", CONTENT_SECURITY_POLICY),
        ];
        if config.hsts {
            headers.push(static_header("strict-transport-security", HSTS));
        }

        Self { headers }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    fn apply(&self, response: &mut Response) {
        let map = response.headers_mut();
        for (name, value) in &self.headers {
            map.insert(name.clone(), value.clone());
        }
    }
}

fn static_header(name: &'static str, value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

/// Middleware that stamps the configured headers on the response.
pub async fn security_headers(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(&mut response);
    response
}

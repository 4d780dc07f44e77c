// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Defaults match the behaviour of the public site: 5 submit attempts per
//! minute, names of 2-100 characters, messages of 10-2000 characters and
//! 10-11 digit Brazilian phone numbers.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Field length and digit bounds
    #[serde(default)]
    pub fields: FieldLimits,

    /// Embed/navigation URL checks
    #[serde(default)]
    pub url_guard: UrlGuardConfig,

    /// Submission flow settings
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Delivery of accepted submissions
    #[serde(default)]
    pub transport: TransportConfig,

    /// Response security headers
    #[serde(default)]
    pub security: SecurityHeadersConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Admitted attempts per key inside one window (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

/// Bounds applied by the field validators. Lengths count characters of the
/// trimmed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLimits {
    #[serde(default = "default_name_min")]
    pub name_min: usize,
    #[serde(default = "default_name_max")]
    pub name_max: usize,
    #[serde(default = "default_message_min")]
    pub message_min: usize,
    #[serde(default = "default_message_max")]
    pub message_max: usize,
    #[serde(default = "default_email_max")]
    pub email_max: usize,
    #[serde(default = "default_phone_min_digits")]
    pub phone_min_digits: usize,
    #[serde(default = "default_phone_max_digits")]
    pub phone_max_digits: usize,
    /// Raw length cap on the phone field, formatting included
    #[serde(default = "default_phone_max_chars")]
    pub phone_max_chars: usize,
}

/// URL guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlGuardConfig {
    /// Origin that relative URLs are resolved against
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Reject loopback and private-range hosts in strict checks (default: false)
    #[serde(default)]
    pub block_private_hosts: bool,
}

/// Submission flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// How long the success acknowledgment stays visible (default: 5000)
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,

    /// Key the rate limiter by the Host header when no client id is sent.
    /// Every visitor of one deployment then shares a key.
    #[serde(default)]
    pub allow_host_fallback: bool,

    /// Upper bound on a single delivery attempt (default: 10000)
    #[serde(default = "default_transport_timeout_ms")]
    pub transport_timeout_ms: u64,

    /// Largest accepted request body on the contact route (default: 32768)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Delivery configuration. Without a webhook URL accepted submissions are
/// only logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Security headers attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityHeadersConfig {
    /// Attach the header set at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Send Strict-Transport-Security; only for HTTPS deployments (default: false)
    #[serde(default)]
    pub hsts: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_name_min() -> usize {
    2
}

fn default_name_max() -> usize {
    100
}

fn default_message_min() -> usize {
    10
}

fn default_message_max() -> usize {
    2000
}

fn default_email_max() -> usize {
    254
}

fn default_phone_max_chars() -> usize {
    20
}

fn default_phone_min_digits() -> usize {
    10
}

fn default_phone_max_digits() -> usize {
    11
}

fn default_origin() -> String {
    "http://localhost".to_string()
}

fn default_success_display_ms() -> u64 {
    5000
}

fn default_transport_timeout_ms() -> u64 {
    10_000
}

fn default_max_body_bytes() -> usize {
    32 * 1024
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            fields: FieldLimits::default(),
            url_guard: UrlGuardConfig::default(),
            submission: SubmissionConfig::default(),
            transport: TransportConfig::default(),
            security: SecurityHeadersConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_ms: default_window_ms(),
        }
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name_min: default_name_min(),
            name_max: default_name_max(),
            message_min: default_message_min(),
            message_max: default_message_max(),
            email_max: default_email_max(),
            phone_min_digits: default_phone_min_digits(),
            phone_max_digits: default_phone_max_digits(),
            phone_max_chars: default_phone_max_chars(),
        }
    }
}

impl Default for UrlGuardConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            block_private_hosts: false,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            success_display_ms: default_success_display_ms(),
            allow_host_fallback: false,
            transport_timeout_ms: default_transport_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hsts: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl SubmissionConfig {
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }
}

impl Config {
    /// Load configuration from `intake.toml` (optional) and `INTAKE_*`
    /// environment variables, e.g. `INTAKE_RATE_LIMIT__MAX_ATTEMPTS=10`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::File::with_name("intake").required(false))
            .add_source(
                config::Environment::with_prefix("INTAKE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_ms must be greater than 0".to_string(),
            ));
        }
        if self.submission.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "submission.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        let f = &self.fields;
        let bounds = [
            ("name", f.name_min, f.name_max),
            ("message", f.message_min, f.message_max),
            ("phone digits", f.phone_min_digits, f.phone_max_digits),
        ];
        for (field, min, max) in bounds {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "{field} minimum ({min}) exceeds maximum ({max})"
                )));
            }
        }

        if Url::parse(&self.url_guard.origin).is_err() {
            return Err(ConfigError::Invalid(format!(
                "url_guard.origin is not a valid URL: {}",
                self.url_guard.origin
            )));
        }

        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Delivery of accepted submissions.
//!
//! The pipeline only decides; where an accepted request goes is up to the
//! [`Transport`] it is built with.

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::form::ContactRequest;
use std::future::Future;
use tracing::{debug, info};

/// Hands a sanitized request to whatever stores or forwards it.
pub trait Transport: Send + Sync {
    fn deliver(
        &self,
        request: &ContactRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Logs accepted requests and reports success. Used when no webhook is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        info!(
            name = %request.name,
            email = %request.email,
            has_phone = !request.phone.is_empty(),
            message_chars = request.message.chars().count(),
            "Contact request accepted"
        );
        Ok(())
    }
}

/// POSTs the request as JSON to a webhook.
pub struct WebhookTransport {
    url: String,
    client: reqwest::Client,
}

impl WebhookTransport {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

impl Transport for WebhookTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %self.url, status = status.as_u16(), "Webhook delivery succeeded");
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}

/// Transport selected from configuration.
pub enum ConfiguredTransport {
    Log(LogTransport),
    Webhook(WebhookTransport),
}

impl ConfiguredTransport {
    pub fn from_config(config: &TransportConfig) -> Self {
        match &config.webhook_url {
            Some(url) if !url.trim().is_empty() => {
                Self::Webhook(WebhookTransport::new(url.trim().to_string()))
            }
            _ => Self::Log(LogTransport),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Webhook(_) => "webhook",
        }
    }
}

impl Transport for ConfiguredTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        match self {
            Self::Log(t) => t.deliver(request).await,
            Self::Webhook(t) => t.deliver(request).await,
        }
    }
}

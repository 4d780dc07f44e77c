// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact intake pipeline.
//!
//! A field error's `Display` is the field-independent wording;
//! [`FieldError::message`] gives the copy shown next to the offending input
//! on the site.

use crate::form::{Field, ValidationErrors};
use std::time::Duration;
use thiserror::Error;

/// Why a single field was rejected. At most one per field.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Campo obrigatório")]
    Required,

    #[error("Deve ter pelo menos {min} caracteres")]
    TooShort { min: usize },

    #[error("Muito longo (máximo {max} caracteres)")]
    TooLong { max: usize },

    #[error("Email inválido")]
    InvalidEmail,

    #[error("Telefone inválido (formato brasileiro)")]
    InvalidPhone,
}

impl FieldError {
    /// User-facing copy for this error on `field`.
    pub fn message(&self, field: Field) -> String {
        let label = field.label();
        let feminine = field == Field::Message;
        match self {
            Self::Required if feminine => format!("{label} é obrigatória"),
            Self::Required => format!("{label} é obrigatório"),
            Self::TooShort { min } => format!("{label} deve ter pelo menos {min} caracteres"),
            Self::TooLong { max } if feminine => {
                format!("{label} muito longa (máximo {max} caracteres)")
            }
            Self::TooLong { max } => format!("{label} muito longo (máximo {max} caracteres)"),
            Self::InvalidEmail | Self::InvalidPhone => self.to_string(),
        }
    }
}

/// Failure delivering an accepted submission.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("delivery request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery endpoint answered with status {0}")]
    Status(u16),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("delivery channel closed")]
    Closed,
}

/// Terminal outcome of a rejected submission.
///
/// Only one class is surfaced per attempt, in the order the pipeline runs:
/// rate limiting, then validation, then delivery.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Muitas tentativas. Aguarde um minuto antes de tentar novamente.")]
    RateLimited { retry_after: Duration },

    #[error("Verifique os campos destacados.")]
    Invalid(ValidationErrors),

    #[error("Erro ao enviar mensagem. Tente novamente mais tarde.")]
    Transport(#[source] TransportError),

    #[error("Envio em andamento.")]
    Busy,
}

impl SubmitError {
    /// Stable machine-readable code for API responses and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Invalid(_) => "INVALID",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Busy => "BUSY",
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

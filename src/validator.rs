// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form field validator.
//!
//! Implements the per-field shape checks:
//! - Name: required, 2-100 characters
//! - Email: required, at most 254 characters, coarse `local@domain.tld` shape
//! - Phone: optional, at most 20 characters, 10-11 digits once formatting
//!   is stripped
//! - Message: required, 10-2000 characters
//!
//! Lengths are counted in characters of the trimmed value. Rules run in the
//! order required, too short, too long; the first failure is reported.

use crate::config::FieldLimits;
use crate::error::FieldError;
use crate::form::{ContactForm, Field, ValidationErrors};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    // Deliberately coarse; this is not RFC 5322.
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref SAFE_CHARS: Regex =
        Regex::new(r#"^[a-zA-Z0-9\s.,!?@#$%&*()_+\-=\[\]{};':"\\|<>/]*$"#).unwrap();
}

const BR_PHONE_MIN_DIGITS: usize = 10;
const BR_PHONE_MAX_DIGITS: usize = 11;

/// Contact form validator.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    limits: FieldLimits,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(FieldLimits::default())
    }
}

impl FieldValidator {
    /// Create a new validator with the given bounds.
    pub fn new(limits: FieldLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }

    pub fn validate_name(&self, name: &str) -> Result<(), FieldError> {
        check_required_length(name, self.limits.name_min, self.limits.name_max)
    }

    pub fn validate_email(&self, email: &str) -> Result<(), FieldError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Required);
        }
        if trimmed.chars().count() > self.limits.email_max {
            return Err(FieldError::TooLong {
                max: self.limits.email_max,
            });
        }
        if !is_valid_email(email) {
            return Err(FieldError::InvalidEmail);
        }
        Ok(())
    }

    /// Empty input means "not provided" and passes.
    pub fn validate_phone(&self, phone: &str) -> Result<(), FieldError> {
        let trimmed = phone.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        if trimmed.chars().count() > self.limits.phone_max_chars {
            return Err(FieldError::TooLong {
                max: self.limits.phone_max_chars,
            });
        }
        let digits = count_digits(phone);
        if digits < self.limits.phone_min_digits || digits > self.limits.phone_max_digits {
            return Err(FieldError::InvalidPhone);
        }
        Ok(())
    }

    pub fn validate_message(&self, message: &str) -> Result<(), FieldError> {
        check_required_length(message, self.limits.message_min, self.limits.message_max)
    }

    /// Validate a single field by name.
    pub fn validate_field(&self, field: Field, value: &str) -> Result<(), FieldError> {
        match field {
            Field::Name => self.validate_name(value),
            Field::Email => self.validate_email(value),
            Field::Phone => self.validate_phone(value),
            Field::Message => self.validate_message(value),
        }
    }

    /// Validate a complete form. Every field is checked; nothing
    /// short-circuits, so all errors come back together.
    pub fn validate(&self, form: &ContactForm) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in Field::ALL {
            if let Err(err) = self.validate_field(field, form.get(field)) {
                debug!(field = %field, error = %err, "Field invalid");
                errors.insert(field, err);
            }
        }
        errors
    }
}

fn check_required_length(value: &str, min: usize, max: usize) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required);
    }
    let len = trimmed.chars().count();
    if len < min {
        return Err(FieldError::TooShort { min });
    }
    if len > max {
        return Err(FieldError::TooLong { max });
    }
    Ok(())
}

fn count_digits(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Coarse email shape check on the trimmed value.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() {
        return false;
    }
    EMAIL_SHAPE.is_match(email.trim())
}

/// Brazilian phone number: 10 digits (landline with area code) or 11
/// (mobile with area code) after stripping everything that is not a digit.
/// Empty input is invalid here; optionality is the field validator's call.
pub fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return false;
    }
    let digits = count_digits(phone);
    (BR_PHONE_MIN_DIGITS..=BR_PHONE_MAX_DIGITS).contains(&digits)
}

/// Character-count bounds check. Empty input passes only when `min` is 0.
pub fn is_valid_length(value: &str, min: usize, max: usize) -> bool {
    if value.is_empty() {
        return min == 0;
    }
    let len = value.chars().count();
    len >= min && len <= max
}

/// ASCII letters, digits, whitespace and common punctuation only.
pub fn contains_only_safe_chars(value: &str) -> bool {
    SAFE_CHARS.is_match(value)
}

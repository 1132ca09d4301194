// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form submission validator.
//!
//! Checks every field of an incoming submission and reports all violations
//! at once:
//! - name: 1 to 100 characters
//! - email: syntactically valid address (`local@domain.tld`, no display text)
//! - subject: 1 to 200 characters
//! - message: 1 to 5000 characters

use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const NAME_MAX_CHARS: usize = 100;
pub const SUBJECT_MAX_CHARS: usize = 200;
pub const MESSAGE_MAX_CHARS: usize = 5000;

/// A single field-level violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field}: field required")]
    Missing { field: &'static str },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },

    #[error("{field}: must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field}: not a valid email address")]
    InvalidEmail { field: &'static str },

    #[error("body: {reason}")]
    MalformedBody { reason: String },
}

impl FieldError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidEmail { field } => field,
            Self::MalformedBody { .. } => "body",
        }
    }
}

/// Rejection of a submission, listing every offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid submission: {}", summarize(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// The request body could not be decoded at all.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::MalformedBody {
                reason: reason.into(),
            }],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in field order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(FieldError::field).collect()
    }
}

/// Raw contact form body as received over the wire.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl Submission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Check an email address against the address grammar.
///
/// Requires a dotted domain and rejects `Name <addr>` display forms, so the
/// value can be used verbatim as a reply-to address.
pub fn is_valid_email(address: &str) -> bool {
    let options = Options::default()
        .with_required_tld()
        .without_display_text();
    EmailAddress::parse_with_options(address, options).is_ok()
}

fn check_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(value) = value else {
        errors.push(FieldError::Missing { field });
        return None;
    };

    let actual = value.chars().count();
    if actual == 0 {
        errors.push(FieldError::Empty { field });
        None
    } else if actual > max {
        errors.push(FieldError::TooLong { field, max, actual });
        None
    } else {
        Some(value)
    }
}

fn check_email(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::Missing { field: "email" });
            None
        }
        Some(v) if v.is_empty() => {
            errors.push(FieldError::Empty { field: "email" });
            None
        }
        Some(v) if !is_valid_email(&v) => {
            errors.push(FieldError::InvalidEmail { field: "email" });
            None
        }
        Some(v) => Some(v),
    }
}

/// Validate a raw contact request.
pub fn validate(request: ContactRequest) -> Result<Submission, ValidationError> {
    let mut errors = Vec::new();

    let name = check_text("name", request.name, NAME_MAX_CHARS, &mut errors);
    let email = check_email(request.email, &mut errors);
    let subject = check_text("subject", request.subject, SUBJECT_MAX_CHARS, &mut errors);
    let message = check_text("message", request.message, MESSAGE_MAX_CHARS, &mut errors);

    match (name, email, subject, message) {
        (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
            Ok(Submission {
                name,
                email,
                subject,
                message,
            })
        }
        _ => {
            let err = ValidationError { errors };
            debug!(fields = ?err.fields(), "Submission invalid");
            Err(err)
        }
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validator.
//!
//! Checks every field of a sanitized submission and collects all failures
//! rather than stopping at the first one:
//! - name: required, 2-100 characters
//! - email: required, `local@domain.tld`
//! - phone: optional, 10-20 of digits, whitespace, `+ - ( )`
//! - subject: required, 5-200 characters
//! - message: required, 10 up to the configured maximum
//! - honeypot: must be empty

use crate::submission::SubmissionInput;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Generic key used when the honeypot trips. Deliberately unspecific.
pub const FORM_ERROR_KEY: &str = "form";

const NAME_LEN: (usize, usize) = (2, 100);
const SUBJECT_LEN: (usize, usize) = (5, 200);
const MESSAGE_MIN_LEN: usize = 10;
const EMAIL_MAX_LEN: usize = 254;

/// Field name to human-readable message. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

/// Contact form validator.
pub struct ContactValidator {
    max_message_length: usize,
    email: Regex,
    phone: Regex,
}

impl ContactValidator {
    /// Create a validator accepting messages up to `max_message_length` characters.
    pub fn new(max_message_length: usize) -> Self {
        Self {
            max_message_length,
            email: Regex::new(
                r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,63}$",
            )
            .expect("email pattern is valid"),
            phone: Regex::new(r"^[0-9\s+()\-]{10,20}$").expect("phone pattern is valid"),
        }
    }

    /// Validate a sanitized submission.
    pub fn validate(&self, input: &SubmissionInput) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        check_length(&mut errors, "name", "Name", &input.name, NAME_LEN);

        if input.email.is_empty() {
            errors.insert("email", "Please enter your email address");
        } else if !self.is_valid_email(&input.email) {
            errors.insert("email", "Email address is not valid");
        }

        if let Some(phone) = &input.phone {
            if !self.phone.is_match(phone) {
                errors.insert("phone", "Phone number is not valid");
            }
        }

        check_length(&mut errors, "subject", "Subject", &input.subject, SUBJECT_LEN);
        check_length(
            &mut errors,
            "message",
            "Message",
            &input.message,
            (MESSAGE_MIN_LEN, self.max_message_length),
        );

        if input.honeypot {
            debug!("Honeypot field populated");
            errors.insert(FORM_ERROR_KEY, "Your submission could not be processed");
        }

        if !errors.is_empty() {
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Submission invalid");
        }
        errors
    }

    /// Whether `email` has the shape `local@domain.tld`.
    pub fn is_valid_email(&self, email: &str) -> bool {
        email.len() <= EMAIL_MAX_LEN && self.email.is_match(email)
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &str,
    (min, max): (usize, usize),
) {
    let len = value.chars().count();
    if len == 0 {
        errors.insert(field, format!("Please enter a {}", label.to_lowercase()));
    } else if len < min {
        errors.insert(field, format!("{label} must be at least {min} characters"));
    } else if len > max {
        errors.insert(field, format!("{label} must not exceed {max} characters"));
    }
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form payloads.
//!
//! The form may arrive as JSON or as `application/x-www-form-urlencoded`.
//! Both decode into [`RawSubmission`], which is then sanitized into a
//! [`SubmissionInput`].

use crate::sanitize::sanitize;
use serde::Deserialize;
use tracing::debug;

/// Form fields as sent by the client, before sanitization.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    /// Honeypot; hidden from humans and expected to stay empty.
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,
}

/// Sanitized contact form. No field contains raw markup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    /// Whether the honeypot arrived with any content at all, before sanitization
    pub honeypot: bool,
}

impl RawSubmission {
    /// Decode a request body.
    ///
    /// JSON is used when the content type mentions `application/json`,
    /// otherwise the body is read as a URL-encoded form. A body that fails
    /// to decode yields an empty submission, which validation then rejects.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json {
            match serde_json::from_slice(body) {
                Ok(raw) => raw,
                Err(err) => {
                    debug!(error = %err, "Undecodable JSON body");
                    Self::default()
                }
            }
        } else {
            Self::from_form(body)
        }
    }

    fn from_form(body: &[u8]) -> Self {
        let mut raw = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match &*key {
                "name" => &mut raw.name,
                "email" => &mut raw.email,
                "phone" => &mut raw.phone,
                "subject" => &mut raw.subject,
                "message" => &mut raw.message,
                "website" => &mut raw.website,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        raw
    }

    /// Sanitize every field; absent fields become empty strings.
    pub fn sanitize(&self) -> SubmissionInput {
        let clean = |field: &Option<String>| field.as_deref().map(sanitize).unwrap_or_default();
        let phone = clean(&self.phone);

        SubmissionInput {
            name: clean(&self.name),
            email: clean(&self.email),
            phone: (!phone.is_empty()).then_some(phone),
            subject: clean(&self.subject),
            message: clean(&self.message),
            honeypot: self.website.as_deref().is_some_and(|v| !v.is_empty()),
        }
    }
}

/// Accept strings and scalars; anything else counts as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body() {
        let body = br#"{"name":" Huy ","email":"huy@test.com","subject":"Hello there","message":"This is a test message."}"#;
        let input = RawSubmission::from_body(Some("application/json; charset=utf-8"), body).sanitize();

        assert_eq!(input.name, "Huy");
        assert_eq!(input.email, "huy@test.com");
        assert_eq!(input.phone, None);
        assert_eq!(input.subject, "Hello there");
        assert_eq!(input.message, "This is a test message.");
        assert!(!input.honeypot);
    }

    #[test]
    fn test_form_body() {
        let body = b"name=Huy&email=huy%40test.com&phone=%2B84+912+345+678&subject=Hello+there&message=Hi+%3Cb%3Ethere%3C%2Fb%3E&website=";
        let input = RawSubmission::from_body(Some("application/x-www-form-urlencoded"), body).sanitize();

        assert_eq!(input.email, "huy@test.com");
        assert_eq!(input.phone.as_deref(), Some("+84 912 345 678"));
        assert_eq!(input.message, "Hi there");
        assert!(!input.honeypot);
    }

    #[test]
    fn test_missing_content_type_reads_form() {
        let input = RawSubmission::from_body(None, b"name=Huy").sanitize();
        assert_eq!(input.name, "Huy");
        assert!(input.email.is_empty());
    }

    #[test]
    fn test_invalid_json_is_empty_submission() {
        let input = RawSubmission::from_body(Some("application/json"), b"{not json").sanitize();
        assert_eq!(input, SubmissionInput::default());
    }

    #[test]
    fn test_non_string_json_values() {
        let body = br#"{"name":["x"],"phone":84912345678,"website":null}"#;
        let input = RawSubmission::from_body(Some("application/json"), body).sanitize();
        assert!(input.name.is_empty());
        assert_eq!(input.phone.as_deref(), Some("84912345678"));
        assert!(!input.honeypot);
    }

    #[test]
    fn test_honeypot_is_read_before_sanitizing() {
        for website in ["   ", "<a href=x></a>", "<!-- -->", "\n"] {
            let body = serde_json::json!({ "website": website }).to_string();
            let input = RawSubmission::from_body(Some("application/json"), body.as_bytes()).sanitize();
            assert!(input.honeypot, "{website:?} should trip the honeypot");
        }

        let input = RawSubmission::from_body(None, b"website=+++").sanitize();
        assert!(input.honeypot);

        let input = RawSubmission::from_body(None, b"website=").sanitize();
        assert!(!input.honeypot);
    }

    #[test]
    fn test_blank_phone_is_absent() {
        let input = RawSubmission::from_body(None, b"phone=+++").sanitize();
        assert_eq!(input.phone, None);
    }
}
